//! Equipment service

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentStock, StockStatus, UpdateEquipment},
        reference::EquipmentType,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.repository.equipment_list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        self.repository.equipment_get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        self.repository.reference_get::<EquipmentType>(data.equipment_type_id).await?;
        self.repository.equipment_create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        if let Some(type_id) = data.equipment_type_id {
            self.repository.reference_get::<EquipmentType>(type_id).await?;
        }
        self.repository.equipment_update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.equipment_delete(id).await
    }

    /// Stock items of one equipment definition
    pub async fn stocks_for(&self, equipment_id: i32) -> AppResult<Vec<EquipmentStock>> {
        self.repository.equipment_get_by_id(equipment_id).await?;
        self.repository.equipment_stocks_for(equipment_id).await
    }

    pub async fn stocks_list(&self, status: Option<StockStatus>) -> AppResult<Vec<EquipmentStock>> {
        self.repository.equipment_stocks_list(status).await
    }

    /// Add one physical item at full durability
    pub async fn stock_create(&self, equipment_id: i32) -> AppResult<EquipmentStock> {
        let equipment = self.repository.equipment_get_by_id(equipment_id).await?;
        let stock = self.repository.equipment_stock_create(&equipment).await?;
        tracing::info!(equipment_id, stock_id = stock.id, "Equipment stock added");
        Ok(stock)
    }

    pub async fn stock_delete(&self, id: i32) -> AppResult<()> {
        let stock = self.repository.equipment_stock_get(id).await?;
        if stock.status == StockStatus::Borrowed {
            return Err(AppError::BadRequest(format!(
                "Equipment stock {} is borrowed by a running quest",
                id
            )));
        }
        self.repository.equipment_stock_delete(id).await
    }

    /// Restore durability to the maximum
    pub async fn stock_repair(&self, id: i32) -> AppResult<EquipmentStock> {
        let stock = self.repository.equipment_stock_get(id).await?;
        if stock.status == StockStatus::Borrowed {
            return Err(AppError::BadRequest(format!(
                "Equipment stock {} cannot be repaired while borrowed",
                id
            )));
        }
        let repaired = self.repository.equipment_stock_repair(id).await?;
        tracing::info!(stock_id = id, durability = repaired.durability, "Equipment stock repaired");
        Ok(repaired)
    }
}

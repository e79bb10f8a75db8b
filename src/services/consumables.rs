//! Consumable stock service

use crate::{
    error::AppResult,
    models::{
        consumable::{Consumable, CreateConsumable, UpdateConsumable},
        reference::ConsumableType,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ConsumablesService {
    repository: Repository,
}

impl ConsumablesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Consumable>> {
        self.repository.consumables_list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Consumable> {
        self.repository.consumables_get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateConsumable) -> AppResult<Consumable> {
        self.repository.reference_get::<ConsumableType>(data.consumable_type_id).await?;
        self.repository.consumables_create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateConsumable) -> AppResult<Consumable> {
        if let Some(type_id) = data.consumable_type_id {
            self.repository.reference_get::<ConsumableType>(type_id).await?;
        }
        self.repository.consumables_update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.consumables_delete(id).await
    }

    pub async fn restock(&self, id: i32, quantity: i32) -> AppResult<Consumable> {
        let consumable = self.repository.consumables_restock(id, quantity).await?;
        tracing::info!(consumable_id = id, added = quantity, total = consumable.quantity, "Consumable restocked");
        Ok(consumable)
    }
}

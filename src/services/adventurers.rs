//! Adventurer roster service

use crate::{
    error::AppResult,
    models::{
        adventurer::{Adventurer, AdventurerDetails, AdventurerQuery, CreateAdventurer, UpdateAdventurer},
        reference::{ConsumableType, EquipmentType, Speciality},
    },
    repository::Repository,
};

use super::reference::ReferenceService;

#[derive(Clone)]
pub struct AdventurersService {
    repository: Repository,
}

impl AdventurersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn find_all(&self, query: &AdventurerQuery) -> AppResult<Vec<Adventurer>> {
        self.repository.adventurers_search(query).await
    }

    /// Adventurer with speciality and allowed gear types
    pub async fn find_one(&self, id: i32) -> AppResult<AdventurerDetails> {
        let adventurer = self.repository.adventurers_get_by_id(id).await?;
        let speciality = self.repository.reference_get::<Speciality>(adventurer.speciality_id).await?;
        let equipment_types = self.repository.adventurers_equipment_types(id).await?;
        let consumable_types = self.repository.adventurers_consumable_types(id).await?;

        Ok(AdventurerDetails {
            adventurer,
            speciality,
            equipment_types,
            consumable_types,
        })
    }

    pub async fn create(&self, data: &CreateAdventurer) -> AppResult<AdventurerDetails> {
        self.check_references(
            Some(data.speciality_id),
            Some(data.equipment_type_ids.as_slice()),
            Some(data.consumable_type_ids.as_slice()),
        )
        .await?;

        let adventurer = self.repository.adventurers_create(data).await?;
        tracing::info!(adventurer_id = adventurer.id, "Adventurer created");
        self.find_one(adventurer.id).await
    }

    pub async fn update(&self, id: i32, data: &UpdateAdventurer) -> AppResult<AdventurerDetails> {
        self.repository.adventurers_get_by_id(id).await?;
        self.check_references(
            data.speciality_id,
            data.equipment_type_ids.as_deref(),
            data.consumable_type_ids.as_deref(),
        )
        .await?;

        self.repository.adventurers_update(id, data).await?;
        self.find_one(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.adventurers_delete(id).await?;
        tracing::info!(adventurer_id = id, "Adventurer deleted");
        Ok(())
    }

    async fn check_references(
        &self,
        speciality_id: Option<i32>,
        equipment_type_ids: Option<&[i32]>,
        consumable_type_ids: Option<&[i32]>,
    ) -> AppResult<()> {
        if let Some(id) = speciality_id {
            self.repository.reference_get::<Speciality>(id).await?;
        }
        if let Some(ids) = equipment_type_ids {
            ReferenceService::<EquipmentType>::new(self.repository.clone())
                .ensure_all_exist(ids)
                .await?;
        }
        if let Some(ids) = consumable_type_ids {
            ReferenceService::<ConsumableType>::new(self.repository.clone())
                .ensure_all_exist(ids)
                .await?;
        }
        Ok(())
    }
}

//! Business logic services

pub mod adventurers;
pub mod auth;
pub mod availability;
pub mod consumables;
pub mod equipment;
pub mod finances;
pub mod quests;
pub mod reference;
pub mod storage;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, StorageConfig},
    models::reference::{ConsumableType, EquipmentType, RoleKind, Speciality, Status},
    repository::Repository,
};

use reference::ReferenceService;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub quests: quests::QuestsService,
    pub adventurers: adventurers::AdventurersService,
    pub availability: availability::AvailabilityService,
    pub equipment: equipment::EquipmentService,
    pub consumables: consumables::ConsumablesService,
    pub finances: finances::FinancesService,
    pub upload: storage::UploadService,
    pub specialities: ReferenceService<Speciality>,
    pub equipment_types: ReferenceService<EquipmentType>,
    pub consumable_types: ReferenceService<ConsumableType>,
    pub statuses: ReferenceService<Status>,
    pub roles: ReferenceService<RoleKind>,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, storage_config: StorageConfig) -> Self {
        let blob_storage = Arc::new(storage::HttpBlobStorage::new(storage_config));
        Self::with_storage(repository, auth_config, blob_storage)
    }

    /// Same as [`Services::new`] with a caller-provided blob store
    pub fn with_storage(
        repository: Repository,
        auth_config: AuthConfig,
        blob_storage: Arc<dyn storage::BlobStorage>,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            quests: quests::QuestsService::new(repository.clone()),
            adventurers: adventurers::AdventurersService::new(repository.clone()),
            availability: availability::AvailabilityService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone()),
            consumables: consumables::ConsumablesService::new(repository.clone()),
            finances: finances::FinancesService::new(repository.clone()),
            upload: storage::UploadService::new(blob_storage),
            specialities: ReferenceService::new(repository.clone()),
            equipment_types: ReferenceService::new(repository.clone()),
            consumable_types: ReferenceService::new(repository.clone()),
            statuses: ReferenceService::new(repository.clone()),
            roles: ReferenceService::new(repository.clone()),
            repository,
        }
    }
}

//! Reference data service, one instance per reference table

use std::marker::PhantomData;

use crate::{
    error::{AppError, AppResult},
    models::reference::{NameInput, NamedRecord, ReferenceKind},
    repository::Repository,
};

pub struct ReferenceService<K: ReferenceKind> {
    repository: Repository,
    _kind: PhantomData<K>,
}

impl<K: ReferenceKind> Clone for ReferenceService<K> {
    fn clone(&self) -> Self {
        Self::new(self.repository.clone())
    }
}

impl<K: ReferenceKind> ReferenceService<K> {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            _kind: PhantomData,
        }
    }

    pub async fn find_all(&self) -> AppResult<Vec<NamedRecord>> {
        self.repository.reference_list::<K>().await
    }

    pub async fn find_one(&self, id: i32) -> AppResult<NamedRecord> {
        self.repository.reference_get::<K>(id).await
    }

    pub async fn create(&self, data: &NameInput) -> AppResult<NamedRecord> {
        let name = data.name.trim();
        if self.repository.reference_name_exists::<K>(name, None).await? {
            return Err(AppError::Conflict(format!("{} '{}' already exists", K::LABEL, name)));
        }
        let record = self.repository.reference_create::<K>(name).await?;
        tracing::info!(table = K::TABLE, id = record.id, "Reference row created");
        Ok(record)
    }

    pub async fn update(&self, id: i32, data: &NameInput) -> AppResult<NamedRecord> {
        self.repository.reference_get::<K>(id).await?;
        let name = data.name.trim();
        if self.repository.reference_name_exists::<K>(name, Some(id)).await? {
            return Err(AppError::Conflict(format!("{} '{}' already exists", K::LABEL, name)));
        }
        self.repository.reference_update::<K>(id, name).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.reference_delete::<K>(id).await?;
        tracing::info!(table = K::TABLE, id, "Reference row deleted");
        Ok(())
    }

    /// Fails with NotFound naming the first unknown id
    pub async fn ensure_all_exist(&self, ids: &[i32]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = self.repository.reference_existing_ids::<K>(ids).await?;
        match ids.iter().find(|id| !found.contains(id)) {
            Some(missing) => Err(AppError::NotFound(format!("{} {} not found", K::LABEL, missing))),
            None => Ok(()),
        }
    }
}

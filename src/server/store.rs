use std::sync::Arc;

use thiserror::Error;

use super::db::types::{CreateEntityParams, EntityRecord, EntitySort, UpdateEntityParams};
use super::db::Database;
use super::resource::{new_identifier, EntityContent, ResourceKind};
use crate::time::current_timestamp;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("entity not found")]
    NotFound,

    #[error("database: {0:#}")]
    Database(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for the entities of one kind.
pub struct EntityStore {
    kind: &'static ResourceKind,
    db: Arc<Database>,
}

impl EntityStore {
    pub fn new(kind: &'static ResourceKind, db: Arc<Database>) -> Self {
        Self { kind, db }
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.kind
    }

    /// Validates and stores a new entity. The returned record has its owner
    /// populated.
    pub fn create(
        &self,
        body: &serde_json::Map<String, serde_json::Value>,
        owner: Option<&str>,
    ) -> StoreResult<EntityRecord> {
        let content = self
            .kind
            .validate_new(body)
            .map_err(StoreError::Validation)?;

        let id = new_identifier();
        let record = self.db.with_transaction(|tx| {
            tx.create_entity(CreateEntityParams {
                id: id.clone(),
                kind: self.kind.path.to_string(),
                name: content.name,
                owner: owner.map(String::from),
                payload: content.payload,
                create_time: current_timestamp(),
            })?;
            tx.get_entity(self.kind.path, &id)
        })?;

        record.ok_or(StoreError::NotFound)
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<EntityRecord> {
        let record = self
            .db
            .with_transaction(|tx| tx.get_entity(self.kind.path, id))?;
        record.ok_or(StoreError::NotFound)
    }

    pub fn find_all(&self, sort: EntitySort) -> StoreResult<Vec<EntityRecord>> {
        let records = self
            .db
            .with_transaction(|tx| tx.list_entities(self.kind.path, sort))?;
        Ok(records)
    }

    pub fn find_by_name(&self, name: &str) -> StoreResult<Vec<EntityRecord>> {
        let records = self
            .db
            .with_transaction(|tx| tx.list_entities_by_name(self.kind.path, name))?;
        Ok(records)
    }

    /// Entities whose `field` references any of `ids`, newest first.
    pub fn find_by_reference(&self, field: &str, ids: &[String]) -> StoreResult<Vec<EntityRecord>> {
        let records = self
            .db
            .with_transaction(|tx| tx.list_entities_by_reference(self.kind.path, field, ids))?;
        Ok(records)
    }

    /// Applies the declared fields of `patch` to `entity`. Identifier, owner
    /// and creation time are never changed.
    pub fn update(
        &self,
        entity: &EntityRecord,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> StoreResult<EntityRecord> {
        let current = EntityContent {
            name: entity.name.clone(),
            payload: entity.payload.clone(),
        };
        let content = self
            .kind
            .apply_patch(&current, patch)
            .map_err(StoreError::Validation)?;

        let record = self.db.with_transaction(|tx| {
            tx.update_entity(UpdateEntityParams {
                id: entity.id.clone(),
                kind: self.kind.path.to_string(),
                name: content.name,
                payload: content.payload,
            })?;
            tx.get_entity(self.kind.path, &entity.id)
        })?;

        record.ok_or(StoreError::NotFound)
    }

    /// Removes `entity` and hands back its last known representation.
    pub fn delete(&self, entity: EntityRecord) -> StoreResult<EntityRecord> {
        self.db
            .with_transaction(|tx| tx.delete_entity(self.kind.path, &entity.id))?;
        Ok(entity)
    }
}

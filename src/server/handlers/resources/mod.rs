pub mod dispatch;
pub mod hotels;
pub mod resolver;

use std::sync::Arc;

use log::{error, info};
use serde_json::{Map, Value};

use crate::server::authn::AuthnUserInfo;
use crate::server::authz::Operation;
use crate::server::db::types::{EntityRecord, EntitySort};
use crate::server::db::Database;
use crate::server::error::ApiError;
use crate::server::resource::ResourceKind;
use crate::server::response::Response;
use crate::server::store::{EntityStore, StoreError};
use crate::types::entity::EntityView;

/// The five operations of one resource kind. Callers have already resolved
/// the target entity and authorized the request.
pub struct ResourceHandler {
    store: EntityStore,
}

impl ResourceHandler {
    pub fn new(kind: &'static ResourceKind, db: Arc<Database>) -> Self {
        Self {
            store: EntityStore::new(kind, db),
        }
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.store.kind()
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// The owner is always the caller, whatever the body says.
    pub fn create(
        &self,
        body: &Map<String, Value>,
        user: &AuthnUserInfo,
    ) -> Result<Response, ApiError> {
        let entity = self
            .store
            .create(body, user.caller_id())
            .map_err(|e| self.store_error(Operation::Create, e))?;
        info!(
            "{} '{}' created by {}",
            self.kind().name,
            entity.id,
            user.caller_id().unwrap_or("anonymous")
        );
        Ok(Response::json(entity.into_view(None)))
    }

    pub fn read(&self, entity: EntityRecord, user: &AuthnUserInfo) -> Response {
        let is_owner = match (user.caller_id(), entity.owner_id()) {
            (Some(caller), Some(owner)) => caller == owner,
            _ => false,
        };
        Response::json(entity.into_view(Some(is_owner)))
    }

    pub fn update(
        &self,
        entity: &EntityRecord,
        patch: &Map<String, Value>,
    ) -> Result<Response, ApiError> {
        let entity = self
            .store
            .update(entity, patch)
            .map_err(|e| self.store_error(Operation::Update, e))?;
        Ok(Response::json(entity.into_view(None)))
    }

    pub fn delete(&self, entity: EntityRecord) -> Result<Response, ApiError> {
        let entity = self
            .store
            .delete(entity)
            .map_err(|e| self.store_error(Operation::Delete, e))?;
        info!("{} '{}' deleted", self.kind().name, entity.id);
        Ok(Response::json(entity.into_view(None)))
    }

    pub fn list(&self, sort: EntitySort) -> Result<Response, ApiError> {
        let entities = self
            .store
            .find_all(sort)
            .map_err(|e| self.store_error(Operation::List, e))?;
        let views: Vec<EntityView> = entities.into_iter().map(|e| e.into_view(None)).collect();
        Ok(Response::json(views))
    }

    fn store_error(&self, operation: Operation, err: StoreError) -> ApiError {
        store_error(self.kind(), operation, err)
    }
}

/// Store failures reaching a handler are client errors. Database faults are
/// logged and reported without detail.
pub fn store_error(kind: &ResourceKind, operation: Operation, err: StoreError) -> ApiError {
    match err {
        StoreError::Validation(msg) => ApiError::Validation(msg),
        StoreError::NotFound => ApiError::NotFound(kind.not_found_message()),
        StoreError::Database(e) => {
            error!("Database error during {operation} of {}: {e:#}", kind.name);
            ApiError::BadRequest(String::from("Database error"))
        }
    }
}

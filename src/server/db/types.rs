use anyhow::Result;
use serde_json::{Map, Value};

use crate::time::format_rfc3339;
use crate::types::entity::{EntityView, OwnerView};
use crate::types::user::UserView;

pub trait Connection<'a, T>
where
    T: Transaction + 'a,
{
    fn transaction(&'a mut self) -> Result<T>;
}

pub trait Transaction {
    fn create_user(&self, user: &UserRecord) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<UserRecord>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>>;
    fn has_username(&self, username: &str) -> Result<bool>;
    fn delete_user(&self, id: &str) -> Result<()>;
    fn count_users(&self) -> Result<u64>;

    fn create_entity(&self, params: CreateEntityParams) -> Result<()>;
    fn get_entity(&self, kind: &str, id: &str) -> Result<Option<EntityRecord>>;
    fn list_entities(&self, kind: &str, sort: EntitySort) -> Result<Vec<EntityRecord>>;
    fn list_entities_by_name(&self, kind: &str, name: &str) -> Result<Vec<EntityRecord>>;
    fn list_entities_by_reference(
        &self,
        kind: &str,
        field: &str,
        ids: &[String],
    ) -> Result<Vec<EntityRecord>>;
    fn update_entity(&self, params: UpdateEntityParams) -> Result<()>;
    fn delete_entity(&self, kind: &str, id: &str) -> Result<()>;

    fn commit(self) -> Result<()>
    where
        Self: Sized;
    fn rollback(self) -> Result<()>
    where
        Self: Sized;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub salt: String,
    pub roles: Vec<String>,
    pub create_time: u64,
}

impl UserRecord {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            roles: self.roles.clone(),
        }
    }
}

/// A stored entity of any kind, with its owner populated one level deep.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: String,
    pub kind: String,
    pub name: String,

    /// `None` when the entity has no owner, or when the owner reference is
    /// dangling because the user was deleted.
    pub owner: Option<OwnerRecord>,

    pub payload: Map<String, Value>,
    pub create_time: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnerRecord {
    pub id: String,
    pub display_name: String,
}

impl EntityRecord {
    pub fn owner_id(&self) -> Option<&str> {
        self.owner.as_ref().map(|owner| owner.id.as_str())
    }

    pub fn into_view(self, is_current_user_owner: Option<bool>) -> EntityView {
        EntityView {
            id: self.id,
            name: self.name,
            created: format_rfc3339(self.create_time),
            user: self.owner.map(|owner| OwnerView {
                id: owner.id,
                display_name: owner.display_name,
            }),
            payload: self.payload,
            is_current_user_owner,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateEntityParams {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub owner: Option<String>,
    pub payload: Map<String, Value>,
    pub create_time: u64,
}

#[derive(Debug, Clone)]
pub struct UpdateEntityParams {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub payload: Map<String, Value>,
}

/// Ordering of entity listings. Ties are broken by insertion order so that
/// entities created within the same millisecond keep a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntitySort {
    #[default]
    CreatedDesc,
    CreatedAsc,
    Name,
}

impl EntitySort {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "-created" => Some(Self::CreatedDesc),
            "created" => Some(Self::CreatedAsc),
            "name" => Some(Self::Name),
            _ => None,
        }
    }
}

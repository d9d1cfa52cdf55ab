mod entity;
mod user;

pub mod config;
pub mod factory;

use std::path::Path;

use anyhow::Result;
use rusqlite::types::Value as DbValue;
use rusqlite::Connection as RawConnection;
use rusqlite::Transaction as RawTransaction;

use super::sql::Value;
use super::types::{
    Connection, CreateEntityParams, EntityRecord, EntitySort, Transaction, UpdateEntityParams,
    UserRecord,
};

/// SQLite-based database implementation. Supports both file-based and
/// in-memory databases.
pub struct SqliteConnection {
    conn: RawConnection,
}

pub struct SqliteTransaction<'a> {
    tx: RawTransaction<'a>,
}

impl SqliteConnection {
    /// Opens a SQLite database file, creating it if it doesn't exist, and
    /// initializes all tables.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = RawConnection::open(path)?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Creates a new in-memory database. Content is lost when the program
    /// exits.
    pub fn memory() -> Result<Self> {
        let conn = RawConnection::open_in_memory()?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    fn init_tables(conn: &RawConnection) -> Result<()> {
        user::create_table(conn)?;
        entity::create_table(conn)?;
        Ok(())
    }
}

impl<'a> Connection<'a, SqliteTransaction<'a>> for SqliteConnection {
    fn transaction(&'a mut self) -> Result<SqliteTransaction<'a>> {
        let tx = self.conn.transaction()?;
        Ok(SqliteTransaction { tx })
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn create_user(&self, user: &UserRecord) -> Result<()> {
        user::create(&self.tx, user)
    }

    fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        user::get(&self.tx, "id = ?", id)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        user::get(&self.tx, "username = ?", username)
    }

    fn has_username(&self, username: &str) -> Result<bool> {
        user::has_username(&self.tx, username)
    }

    fn delete_user(&self, id: &str) -> Result<()> {
        user::delete(&self.tx, id)
    }

    fn count_users(&self) -> Result<u64> {
        user::count(&self.tx)
    }

    fn create_entity(&self, params: CreateEntityParams) -> Result<()> {
        entity::create(&self.tx, params)
    }

    fn get_entity(&self, kind: &str, id: &str) -> Result<Option<EntityRecord>> {
        entity::get(&self.tx, kind, id)
    }

    fn list_entities(&self, kind: &str, sort: EntitySort) -> Result<Vec<EntityRecord>> {
        entity::list(&self.tx, kind, sort)
    }

    fn list_entities_by_name(&self, kind: &str, name: &str) -> Result<Vec<EntityRecord>> {
        entity::list_by_name(&self.tx, kind, name)
    }

    fn list_entities_by_reference(
        &self,
        kind: &str,
        field: &str,
        ids: &[String],
    ) -> Result<Vec<EntityRecord>> {
        entity::list_by_reference(&self.tx, kind, field, ids)
    }

    fn update_entity(&self, params: UpdateEntityParams) -> Result<()> {
        entity::update(&self.tx, params)
    }

    fn delete_entity(&self, kind: &str, id: &str) -> Result<()> {
        entity::delete(&self.tx, kind, id)
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

fn convert_values(values: Vec<Value>) -> Vec<DbValue> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Text(text) => DbValue::Text(text),
        })
        .collect()
}

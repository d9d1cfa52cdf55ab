mod sql;
mod sqlite;

#[cfg(test)]
mod tests;

pub mod config;
pub mod factory;
pub mod types;

use std::cell::RefCell;
use std::sync::Mutex;

use anyhow::{bail, Result};
use sqlite::{SqliteConnection, SqliteTransaction};
use types::{
    Connection, CreateEntityParams, EntityRecord, EntitySort, Transaction, UpdateEntityParams,
    UserRecord,
};

pub struct Database {
    conn: Mutex<RefCell<UnionConnection>>,
}

impl Database {
    pub fn new(conn: UnionConnection) -> Self {
        Self {
            conn: Mutex::new(RefCell::new(conn)),
        }
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let conn = SqliteConnection::memory().unwrap();
        Self::new(UnionConnection::Sqlite(conn))
    }

    /// Runs `f` inside a transaction. The transaction is committed when `f`
    /// returns `Ok` and rolled back otherwise.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Transaction) -> Result<T>,
    {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => bail!("failed to lock connection: {:#}", e),
        };
        let mut conn = conn.borrow_mut();
        let tx = conn.transaction()?;

        let result = f(&tx);

        if result.is_ok() {
            tx.commit()
        } else {
            tx.rollback()
        }?;

        result
    }
}

pub enum UnionConnection {
    Sqlite(SqliteConnection),
}

pub enum UnionTransaction<'a> {
    Sqlite(SqliteTransaction<'a>),
}

impl<'a> Connection<'a, UnionTransaction<'a>> for UnionConnection {
    fn transaction(&'a mut self) -> Result<UnionTransaction<'a>> {
        match self {
            UnionConnection::Sqlite(conn) => conn.transaction().map(UnionTransaction::Sqlite),
        }
    }
}

impl Transaction for UnionTransaction<'_> {
    fn create_user(&self, user: &UserRecord) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_user(user),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_user(id),
        }
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_user_by_username(username),
        }
    }

    fn has_username(&self, username: &str) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.has_username(username),
        }
    }

    fn delete_user(&self, id: &str) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_user(id),
        }
    }

    fn count_users(&self) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_users(),
        }
    }

    fn create_entity(&self, params: CreateEntityParams) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_entity(params),
        }
    }

    fn get_entity(&self, kind: &str, id: &str) -> Result<Option<EntityRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_entity(kind, id),
        }
    }

    fn list_entities(&self, kind: &str, sort: EntitySort) -> Result<Vec<EntityRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_entities(kind, sort),
        }
    }

    fn list_entities_by_name(&self, kind: &str, name: &str) -> Result<Vec<EntityRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_entities_by_name(kind, name),
        }
    }

    fn list_entities_by_reference(
        &self,
        kind: &str,
        field: &str,
        ids: &[String],
    ) -> Result<Vec<EntityRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_entities_by_reference(kind, field, ids),
        }
    }

    fn update_entity(&self, params: UpdateEntityParams) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.update_entity(params),
        }
    }

    fn delete_entity(&self, kind: &str, id: &str) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_entity(kind, id),
        }
    }

    fn commit(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.commit(),
        }
    }

    fn rollback(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.rollback(),
        }
    }
}

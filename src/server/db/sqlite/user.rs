use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};

use crate::server::db::sql::{Select, Value};
use crate::server::db::types::UserRecord;

use super::convert_values;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id TEXT PRIMARY KEY NOT NULL,
    username TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    password TEXT NOT NULL,
    salt TEXT NOT NULL,
    roles TEXT NOT NULL,
    create_time INTEGER NOT NULL
);
"#;

const USER_FIELDS: [&str; 7] = [
    "id",
    "username",
    "display_name",
    "password",
    "salt",
    "roles",
    "create_time",
];

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, user: &UserRecord) -> Result<()> {
    let sql = r#"
    INSERT INTO user (id, username, display_name, password, salt, roles, create_time)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    "#;
    debug!(
        "Database create_user: {sql}, id={}, username={}",
        user.id, user.username
    );
    let roles = serde_json::to_string(&user.roles).context("encode user roles")?;
    tx.execute(
        sql,
        params![
            user.id,
            user.username,
            user.display_name,
            user.password,
            user.salt,
            roles,
            user.create_time,
        ],
    )?;

    Ok(())
}

/// Gets one user matching `condition`, which must contain exactly one
/// placeholder bound to `value`.
pub fn get(tx: &Transaction, condition: &'static str, value: &str) -> Result<Option<UserRecord>> {
    let mut select = Select::new(USER_FIELDS.to_vec(), "user");
    select.add_where(condition, Value::Text(value.to_string()));

    let (sql, values) = select.build();
    let values = convert_values(values);

    debug!("Database get_user: {sql}, {values:?}");
    let mut stmt = tx.prepare(&sql)?;
    let row = stmt
        .query_row(params_from_iter(values), |row| {
            let roles: String = row.get(5)?;
            Ok((
                UserRecord {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    display_name: row.get(2)?,
                    password: row.get(3)?,
                    salt: row.get(4)?,
                    roles: Vec::new(),
                    create_time: row.get(6)?,
                },
                roles,
            ))
        })
        .optional()?;

    match row {
        Some((mut user, roles)) => {
            user.roles = serde_json::from_str(&roles)
                .with_context(|| format!("decode roles of user '{}'", user.id))?;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

pub fn has_username(tx: &Transaction, username: &str) -> Result<bool> {
    let mut select = Select::count("user");
    select.add_where("username = ?", Value::Text(username.to_string()));

    let (sql, values) = select.build();
    let values = convert_values(values);

    debug!("Database has_username: {sql}, {values:?}");
    let count: i64 = tx.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
    Ok(count > 0)
}

pub fn delete(tx: &Transaction, id: &str) -> Result<()> {
    let sql = "DELETE FROM user WHERE id = ?";
    debug!("Database delete_user: {sql}, {id}");
    tx.execute(sql, params![id])?;
    Ok(())
}

pub fn count(tx: &Transaction) -> Result<u64> {
    let (sql, _) = Select::count("user").build();
    debug!("Database count_users: {sql}");
    let count: i64 = tx.query_row(&sql, [], |row| row.get(0))?;
    Ok(count as u64)
}

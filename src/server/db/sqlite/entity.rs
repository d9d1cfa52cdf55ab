use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, params_from_iter, Connection, Transaction};
use serde_json::{Map, Value as JsonValue};

use crate::server::db::sql::{Select, Update, Value};
use crate::server::db::types::{
    CreateEntityParams, EntityRecord, EntitySort, OwnerRecord, UpdateEntityParams,
};

use super::convert_values;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS entity (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    owner TEXT,
    payload TEXT NOT NULL,
    create_time INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entity_kind_name ON entity (kind, name);
"#;

/// Owners are joined one level deep. A dangling owner id produces NULL
/// columns for the user side.
const ENTITY_TABLE: &str = "entity e LEFT JOIN user u ON u.id = e.owner";

const ENTITY_FIELDS: [&str; 7] = [
    "e.id",
    "e.kind",
    "e.name",
    "u.id",
    "u.display_name",
    "e.payload",
    "e.create_time",
];

struct EntityRow {
    id: String,
    kind: String,
    name: String,
    owner_id: Option<String>,
    owner_display_name: Option<String>,
    payload: String,
    create_time: u64,
}

impl EntityRow {
    fn into_record(self) -> Result<EntityRecord> {
        let payload: Map<String, JsonValue> = serde_json::from_str(&self.payload)
            .with_context(|| format!("decode payload of entity '{}'", self.id))?;

        let owner = match (self.owner_id, self.owner_display_name) {
            (Some(id), Some(display_name)) => Some(OwnerRecord { id, display_name }),
            _ => None,
        };

        Ok(EntityRecord {
            id: self.id,
            kind: self.kind,
            name: self.name,
            owner,
            payload,
            create_time: self.create_time,
        })
    }
}

pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, params: CreateEntityParams) -> Result<()> {
    let sql = r#"
    INSERT INTO entity (id, kind, name, owner, payload, create_time)
    VALUES (?, ?, ?, ?, ?, ?)
    "#;
    debug!("Database create_entity: {sql}, {params:?}");
    let payload = serde_json::to_string(&params.payload).context("encode entity payload")?;
    tx.execute(
        sql,
        params![
            params.id,
            params.kind,
            params.name,
            params.owner,
            payload,
            params.create_time,
        ],
    )?;

    Ok(())
}

pub fn get(tx: &Transaction, kind: &str, id: &str) -> Result<Option<EntityRecord>> {
    let mut select = new_select(kind);
    select.add_where("e.id = ?", Value::Text(id.to_string()));

    let mut records = query(tx, select)?;
    Ok(records.pop())
}

pub fn list(tx: &Transaction, kind: &str, sort: EntitySort) -> Result<Vec<EntityRecord>> {
    let mut select = new_select(kind);
    add_sort(&mut select, sort);
    query(tx, select)
}

pub fn list_by_name(tx: &Transaction, kind: &str, name: &str) -> Result<Vec<EntityRecord>> {
    let mut select = new_select(kind);
    select.add_where("e.name = ?", Value::Text(name.to_string()));
    add_sort(&mut select, EntitySort::CreatedDesc);
    query(tx, select)
}

/// Lists the entities whose `field` references any of `ids`, merged into a
/// single newest-first listing.
pub fn list_by_reference(
    tx: &Transaction,
    kind: &str,
    field: &str,
    ids: &[String],
) -> Result<Vec<EntityRecord>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let mut values = vec![Value::Text(format!("$.{field}"))];
    values.extend(ids.iter().map(|id| Value::Text(id.clone())));

    let mut select = new_select(kind);
    select.add_where_values(
        format!("json_extract(e.payload, ?) IN ({placeholders})"),
        values,
    );
    add_sort(&mut select, EntitySort::CreatedDesc);
    query(tx, select)
}

pub fn update(tx: &Transaction, params: UpdateEntityParams) -> Result<()> {
    let payload = serde_json::to_string(&params.payload).context("encode entity payload")?;

    let mut update = Update::new("entity");
    update.add_field("name", Value::Text(params.name));
    update.add_field("payload", Value::Text(payload));
    update.add_where("kind = ?", Value::Text(params.kind));
    update.add_where("id = ?", Value::Text(params.id));

    let (sql, values) = update.build();
    let values = convert_values(values);

    debug!("Database update_entity: {sql}, {values:?}");
    tx.execute(&sql, params_from_iter(values.iter()))?;

    Ok(())
}

pub fn delete(tx: &Transaction, kind: &str, id: &str) -> Result<()> {
    let sql = "DELETE FROM entity WHERE kind = ? AND id = ?";
    debug!("Database delete_entity: {sql}, {kind}, {id}");
    tx.execute(sql, params![kind, id])?;
    Ok(())
}

fn new_select(kind: &str) -> Select {
    let mut select = Select::new(ENTITY_FIELDS.to_vec(), ENTITY_TABLE);
    select.add_where("e.kind = ?", Value::Text(kind.to_string()));
    select
}

fn add_sort(select: &mut Select, sort: EntitySort) {
    match sort {
        EntitySort::CreatedDesc => {
            select.add_order_by("e.create_time DESC");
            select.add_order_by("e.seq DESC");
        }
        EntitySort::CreatedAsc => {
            select.add_order_by("e.create_time ASC");
            select.add_order_by("e.seq ASC");
        }
        EntitySort::Name => {
            select.add_order_by("e.name ASC");
            select.add_order_by("e.seq DESC");
        }
    }
}

fn query(tx: &Transaction, select: Select) -> Result<Vec<EntityRecord>> {
    let (sql, values) = select.build();
    let values = convert_values(values);

    debug!("Database query_entities: {sql}, {values:?}");
    let mut stmt = tx.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values), |row| {
            Ok(EntityRow {
                id: row.get(0)?,
                kind: row.get(1)?,
                name: row.get(2)?,
                owner_id: row.get(3)?,
                owner_display_name: row.get(4)?,
                payload: row.get(5)?,
                create_time: row.get(6)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter().map(EntityRow::into_record).collect()
}

use std::fmt::Display;

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text}"),
        }
    }
}

pub struct Select {
    fields: Vec<&'static str>,
    table: &'static str,

    wheres: Vec<String>,

    order_by: Vec<&'static str>,

    values: Vec<Value>,

    count: bool,
}

impl Select {
    pub fn new(fields: Vec<&'static str>, table: &'static str) -> Self {
        Self {
            fields,
            table,
            wheres: Vec::new(),
            order_by: Vec::new(),
            values: Vec::new(),
            count: false,
        }
    }

    pub fn count(table: &'static str) -> Self {
        Self {
            fields: vec!["COUNT(1)"],
            table,
            wheres: Vec::new(),
            order_by: Vec::new(),
            values: Vec::new(),
            count: true,
        }
    }

    pub fn add_order_by(&mut self, s: &'static str) {
        if self.count {
            return;
        }
        self.order_by.push(s);
    }

    pub fn add_where(&mut self, s: impl ToString, value: Value) {
        self.wheres.push(s.to_string());
        self.values.push(value);
    }

    /// Adds a condition whose placeholders are bound to `values` in order.
    pub fn add_where_values(&mut self, s: impl ToString, values: Vec<Value>) {
        self.wheres.push(s.to_string());
        self.values.extend(values);
    }

    pub fn build(self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {} FROM {}", self.fields.join(", "), self.table);

        if !self.wheres.is_empty() {
            let where_clause = self.wheres.join(" AND ");
            sql.push_str(&format!(" WHERE {}", where_clause));
        }

        if !self.order_by.is_empty() {
            let order_by = self.order_by.join(", ");
            sql.push_str(&format!(" ORDER BY {}", order_by));
        }

        (sql, self.values)
    }
}

pub struct Update {
    table: &'static str,

    fields: Vec<&'static str>,
    wheres: Vec<String>,
    values: Vec<Value>,
}

impl Update {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            fields: Vec::new(),
            wheres: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn add_field(&mut self, field: &'static str, value: Value) {
        self.fields.push(field);
        self.values.push(value);
    }

    pub fn add_where(&mut self, s: impl ToString, value: Value) {
        self.wheres.push(s.to_string());
        self.values.push(value);
    }

    pub fn build(self) -> (String, Vec<Value>) {
        if self.fields.is_empty() {
            return (String::new(), Vec::new());
        }
        let mut sql = format!("UPDATE {} SET ", self.table);
        let set = self
            .fields
            .iter()
            .map(|f| format!("{} = ?", f))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&set);

        if !self.wheres.is_empty() {
            let where_clause = self.wheres.join(" AND ");
            sql.push_str(&format!(" WHERE {}", where_clause));
        }

        (sql, self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select() {
        let mut select = Select::new(vec!["id", "name"], "entity");
        select.add_where("kind = ?", Value::Text(String::from("cities")));
        select.add_where("name = ?", Value::Text(String::from("Paris")));
        select.add_order_by("create_time DESC");
        select.add_order_by("seq DESC");

        let (sql, values) = select.build();
        assert_eq!(
            sql,
            "SELECT id, name FROM entity WHERE kind = ? AND name = ? ORDER BY create_time DESC, seq DESC"
        );
        assert_eq!(
            values,
            vec![
                Value::Text(String::from("cities")),
                Value::Text(String::from("Paris"))
            ]
        );

        let mut select = Select::count("user");
        select.add_where("username = ?", Value::Text(String::from("alice")));
        select.add_order_by("create_time DESC");
        let (sql, values) = select.build();
        assert_eq!(sql, "SELECT COUNT(1) FROM user WHERE username = ?");
        assert_eq!(values.len(), 1);

        let mut select = Select::new(vec!["id"], "entity");
        select.add_where_values(
            "json_extract(payload, ?) IN (?, ?)",
            vec![
                Value::Text(String::from("$.city")),
                Value::Text(String::from("c1")),
                Value::Text(String::from("c2")),
            ],
        );
        let (sql, values) = select.build();
        assert_eq!(
            sql,
            "SELECT id FROM entity WHERE json_extract(payload, ?) IN (?, ?)"
        );
        assert_eq!(values[0], Value::Text(String::from("$.city")));
        assert_eq!(values[2], Value::Text(String::from("c2")));
    }

    #[test]
    fn test_update() {
        let mut update = Update::new("entity");
        let (sql, values) = update.build();
        assert!(sql.is_empty());
        assert!(values.is_empty());

        update = Update::new("entity");
        update.add_field("name", Value::Text(String::from("Rome")));
        update.add_field("payload", Value::Text(String::from("{}")));
        update.add_where("id = ?", Value::Text(String::from("e1")));
        let (sql, values) = update.build();
        assert_eq!(sql, "UPDATE entity SET name = ?, payload = ? WHERE id = ?");
        assert_eq!(values.len(), 3);
        assert_eq!(values[2], Value::Text(String::from("e1")));
    }
}

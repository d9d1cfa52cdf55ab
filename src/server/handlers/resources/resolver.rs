use log::error;

use crate::server::db::types::EntityRecord;
use crate::server::error::ApiError;
use crate::server::resource::is_valid_identifier;
use crate::server::store::{EntityStore, StoreError};

/// Turns the identifier of an item route into the stored entity, before
/// authorization runs.
pub struct IdentifierResolver<'a> {
    store: &'a EntityStore,
}

impl<'a> IdentifierResolver<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    pub fn resolve(&self, raw: &str) -> Result<EntityRecord, ApiError> {
        let kind = self.store.kind();
        if !is_valid_identifier(raw) {
            return Err(ApiError::InvalidIdentifier(kind));
        }

        match self.store.find_by_id(raw) {
            Ok(entity) => Ok(entity),
            Err(StoreError::NotFound) => Err(ApiError::NotFound(kind.not_found_message())),
            Err(StoreError::Validation(msg)) => Err(ApiError::Validation(msg)),
            Err(StoreError::Database(e)) => {
                error!("Resolve {} '{raw}' failed: {e:#}", kind.name);
                Err(ApiError::Database)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Map, Value};

    use crate::server::db::Database;
    use crate::server::resource::{new_identifier, CITY, HOTEL};

    use super::*;

    #[test]
    fn test_resolve() {
        let db = Arc::new(Database::new_test());
        let cities = EntityStore::new(&CITY, db.clone());
        let hotels = EntityStore::new(&HOTEL, db);

        let mut body = Map::new();
        body.insert(String::from("name"), Value::from("Paris"));
        let paris = cities.create(&body, None).unwrap();

        let resolver = IdentifierResolver::new(&cities);
        assert_eq!(resolver.resolve(&paris.id).unwrap(), paris);

        for raw in ["invalid-id", "", "123", &paris.id.to_uppercase()] {
            let err = resolver.resolve(raw).unwrap_err();
            assert_eq!(err.to_string(), "City is invalid");
        }

        let err = resolver.resolve(&new_identifier()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No City with that identifier has been found"
        );

        let err = IdentifierResolver::new(&hotels)
            .resolve(&paris.id)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No Hotel with that identifier has been found"
        );
        assert_eq!(err.status().as_u16(), 404);
    }
}

use std::sync::Arc;

use crate::server::authz::Operation;
use crate::server::db::Database;
use crate::server::error::ApiError;
use crate::server::resource::{CITY, HOTEL};
use crate::server::response::Response;
use crate::server::store::EntityStore;
use crate::types::entity::{HotelsByCityRequest, HotelsByCityResponse};

use super::store_error;

/// Lists the hotels of the cities with a given name.
pub struct HotelsByCityHandler {
    cities: EntityStore,
    hotels: EntityStore,
}

impl HotelsByCityHandler {
    pub const PATH: &str = "listOfHotels";

    pub fn new(db: Arc<Database>) -> Self {
        Self {
            cities: EntityStore::new(&CITY, db.clone()),
            hotels: EntityStore::new(&HOTEL, db),
        }
    }

    /// Every city whose name matches exactly contributes its hotels. The
    /// result is ordered newest first.
    pub fn handle(&self, req: HotelsByCityRequest) -> Result<Response, ApiError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation(CITY.required_name_message()));
        }

        let cities = self
            .cities
            .find_by_name(name)
            .map_err(|e| store_error(&CITY, Operation::List, e))?;
        if cities.is_empty() {
            return Err(ApiError::NotFound(String::from(
                "No City with that name has been found",
            )));
        }

        let ids: Vec<String> = cities.into_iter().map(|city| city.id).collect();
        let hotels = self
            .hotels
            .find_by_reference("city", &ids)
            .map_err(|e| store_error(&HOTEL, Operation::List, e))?;

        let hotels: Vec<_> = hotels.into_iter().map(|h| h.into_view(None)).collect();
        Ok(Response::json(HotelsByCityResponse {
            totalnumber: hotels.len(),
            hotels,
        }))
    }
}

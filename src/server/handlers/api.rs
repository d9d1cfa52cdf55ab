use std::sync::Arc;

use actix_web::http::Method;
use actix_web::web::Query;
use actix_web::HttpRequest;
use log::{debug, error, warn};
use serde_json::{Map, Value};

use crate::server::authn::chain::ChainAuthenticator;
use crate::server::authn::token::jwt::JwtTokenValidator;
use crate::server::authn::{Authenticator, AuthnResponse, AuthnUserInfo};
use crate::server::authz::chain::ChainAuthorizer;
use crate::server::authz::{Authorizer, AuthzRequest, AuthzResponse, Operation};
use crate::server::db::types::{EntityRecord, EntitySort};
use crate::server::db::Database;
use crate::server::error::ApiError;
use crate::server::resource::{CITY, HOTEL};
use crate::server::response::Response;
use crate::types::entity::ListQuery;

use super::resources::dispatch::Dispatcher;
use super::resources::hotels::HotelsByCityHandler;
use super::resources::resolver::IdentifierResolver;
use super::resources::ResourceHandler;
use super::{parse_json_body, Handler};

/// Entry point of `/api/<kind>[/<id>]`: authenticate, resolve the item,
/// authorize, then run the operation.
pub struct ApiHandler {
    authn: ChainAuthenticator<JwtTokenValidator>,
    authz: ChainAuthorizer,

    dispatcher: Dispatcher,
    hotels_by_city: HotelsByCityHandler,
}

impl ApiHandler {
    pub fn new(
        authn: ChainAuthenticator<JwtTokenValidator>,
        authz: ChainAuthorizer,
        db: Arc<Database>,
    ) -> Self {
        Self {
            authn,
            authz,
            dispatcher: Dispatcher::new(db.clone()),
            hotels_by_city: HotelsByCityHandler::new(db),
        }
    }

    fn split_api_path(path: &str) -> Option<(&str, Option<&str>)> {
        let path = path.trim_matches('/');
        let parts: Vec<&str> = path.split('/').collect();

        match parts.as_slice() {
            [""] => None,
            [resource] => Some((*resource, None)),
            [resource, id] if !id.is_empty() => Some((*resource, Some(*id))),
            _ => None,
        }
    }

    fn no_route(req: &HttpRequest) -> ApiError {
        ApiError::NoRoute(format!("{} {}", req.method(), req.uri().path()))
    }

    fn operation(method: &Method, has_id: bool) -> Result<Operation, ApiError> {
        let op = match (method.as_str(), has_id) {
            ("GET", false) => Operation::List,
            ("POST", false) => Operation::Create,
            ("GET", true) => Operation::Read,
            ("PUT", true) => Operation::Update,
            ("DELETE", true) => Operation::Delete,
            _ => return Err(ApiError::MethodNotAllowed),
        };
        Ok(op)
    }

    fn authenticate(&self, req: &HttpRequest) -> Result<AuthnUserInfo, ApiError> {
        let resp = match self.authn.authenticate_request(req, None) {
            Ok(resp) => resp,
            Err(e) => {
                error!("Authentication failed: {e:#}");
                return Err(ApiError::Database);
            }
        };
        match resp {
            AuthnResponse::Ok(user) => Ok(user),
            AuthnResponse::Unauthenticated(msg) => Err(ApiError::Unauthenticated(msg.to_string())),
            AuthnResponse::Continue => Err(ApiError::Unauthenticated(String::from(
                "Authentication required",
            ))),
        }
    }

    fn authorize(
        &self,
        route: &str,
        operation: Operation,
        user: &AuthnUserInfo,
        entity: Option<&EntityRecord>,
    ) -> Result<(), ApiError> {
        let req = AuthzRequest {
            route,
            operation,
            user,
            owner: entity.and_then(|e| e.owner_id()),
        };
        match self.authz.authorize_request(&req) {
            Ok(AuthzResponse::Ok) => Ok(()),
            Ok(_) => {
                warn!(
                    "Deny {operation} on {route} for {} with roles {:?}",
                    user.caller_id().unwrap_or("anonymous"),
                    user.roles
                );
                Err(ApiError::Unauthorized)
            }
            Err(e) => {
                error!("Authorization of {operation} on {route} failed: {e:#}");
                Err(ApiError::AuthorizationSystem)
            }
        }
    }

    fn parse_sort(req: &HttpRequest) -> Result<EntitySort, ApiError> {
        let query = match Query::<ListQuery>::from_query(req.query_string()) {
            Ok(query) => query.into_inner(),
            Err(_) => return Err(ApiError::BadRequest(String::from("Invalid query"))),
        };
        match query.sort {
            Some(sort) => EntitySort::parse(&sort)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid sort key '{sort}'"))),
            None => Ok(EntitySort::default()),
        }
    }

    fn handle_hotels_by_city(
        &self,
        req: &HttpRequest,
        user: &AuthnUserInfo,
        body: Option<Vec<u8>>,
    ) -> Result<Response, ApiError> {
        if req.method() != Method::POST {
            return Err(ApiError::MethodNotAllowed);
        }
        self.authorize(&HOTEL.collection_route(), Operation::List, user, None)?;
        let query = parse_json_body(body)?;
        self.hotels_by_city.handle(query)
    }

    fn handle_resource(
        &self,
        handler: &ResourceHandler,
        req: &HttpRequest,
        user: &AuthnUserInfo,
        id: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<Response, ApiError> {
        let kind = handler.kind();
        let operation = Self::operation(req.method(), id.is_some())?;

        let (route, entity) = match id {
            Some(id) => {
                let entity = IdentifierResolver::new(handler.store()).resolve(id)?;
                (kind.item_route(), Some(entity))
            }
            None => (kind.collection_route(), None),
        };
        debug!(
            "{operation} on {route} by {}",
            user.caller_id().unwrap_or("anonymous")
        );

        self.authorize(&route, operation, user, entity.as_ref())?;

        match (operation, entity) {
            (Operation::List, None) => handler.list(Self::parse_sort(req)?),
            (Operation::Create, None) => {
                let body: Map<String, Value> = parse_json_body(body)?;
                handler.create(&body, user)
            }
            (Operation::Read, Some(entity)) => Ok(handler.read(entity, user)),
            (Operation::Update, Some(entity)) => {
                let patch: Map<String, Value> = parse_json_body(body)?;
                handler.update(&entity, &patch)
            }
            (Operation::Delete, Some(entity)) => handler.delete(entity),
            _ => Err(ApiError::MethodNotAllowed),
        }
    }

    fn handle_api(
        &self,
        path: &str,
        req: &HttpRequest,
        body: Option<Vec<u8>>,
    ) -> Result<Response, ApiError> {
        let user = self.authenticate(req)?;

        let (resource, id) = Self::split_api_path(path).ok_or_else(|| Self::no_route(req))?;
        let handler = self
            .dispatcher
            .get(resource)
            .ok_or_else(|| Self::no_route(req))?;

        if handler.kind().path == CITY.path && id == Some(HotelsByCityHandler::PATH) {
            return self.handle_hotels_by_city(req, &user, body);
        }

        self.handle_resource(handler, req, &user, id, body)
    }
}

impl Handler for ApiHandler {
    fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response {
        self.handle_api(path, &req, body).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_api_path() {
        let cases = [
            ("cities", Some(("cities", None))),
            ("cities/", Some(("cities", None))),
            ("/hotels/abc", Some(("hotels", Some("abc")))),
            ("hotels/abc/", Some(("hotels", Some("abc")))),
            ("", None),
            ("cities/a/b", None),
            ("cities//", Some(("cities", None))),
        ];
        for (path, expect) in cases {
            assert_eq!(ApiHandler::split_api_path(path), expect, "{path}");
        }
    }

    #[test]
    fn test_operation() {
        let cases = [
            (Method::GET, false, Some(Operation::List)),
            (Method::POST, false, Some(Operation::Create)),
            (Method::GET, true, Some(Operation::Read)),
            (Method::PUT, true, Some(Operation::Update)),
            (Method::DELETE, true, Some(Operation::Delete)),
            (Method::PUT, false, None),
            (Method::DELETE, false, None),
            (Method::POST, true, None),
            (Method::PATCH, true, None),
        ];
        for (method, has_id, expect) in cases {
            let result = ApiHandler::operation(&method, has_id).ok();
            assert_eq!(result, expect, "{method} {has_id}");
        }
    }
}

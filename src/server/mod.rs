mod authn;
mod authz;
mod db;
mod error;
mod handlers;
mod resource;
mod response;
mod store;


pub mod config;
pub mod factory;
pub mod restful;

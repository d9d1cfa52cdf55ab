pub mod entity;
pub mod healthz;
pub mod response;
pub mod token;
pub mod user;

pub mod auth;
pub mod authz;
pub mod factory;
pub mod resolver;

/*
 * Responsibility
 * - Public interface of the middleware layer
 * - http: transport concerns; identity: per-request identity + authorization context
 */
pub mod http;
pub mod identity;

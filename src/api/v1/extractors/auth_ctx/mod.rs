/*!
 * Authorization context extractor
 *
 * Responsibility:
 * - Hand the request's AuthorizationContext to handlers
 * - The identity middleware must have inserted it into the request extensions
 */

mod core;

pub use core::AuthContext;

/*
 * Responsibility
 * - v1 URL layout
 * - /health is public; everything else runs behind the identity middleware
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, identity::current_identity};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/identity", get(current_identity));
    let protected = middleware::identity::apply(protected, state);

    Router::new().route("/health", get(health)).merge(protected)
}

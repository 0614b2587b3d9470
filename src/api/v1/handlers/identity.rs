/*
 * Responsibility
 * - GET /identity: who the identity middleware decided the caller is
 */
use axum::Json;

use crate::api::v1::dto::identity::IdentityResponse;
use crate::api::v1::extractors::AuthContext;

pub async fn current_identity(AuthContext(ctx): AuthContext) -> Json<IdentityResponse> {
    Json(IdentityResponse::from(&ctx))
}

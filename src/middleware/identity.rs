//! Establish the caller identity once per request and attach the
//! request-scoped `IdentityStorage` and the `AuthorizationContext` to the
//! request extensions.
//!
//! Handlers read them through `AuthContext` or `Extension<Arc<IdentityStorage>>`;
//! nothing downstream looks at the token or headers again.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::middleware::http::REQUEST_ID_HEADER;
use crate::services::auth::identity::IdentityStorage;
use crate::services::auth::request::{InboundRequest, resolve_client_ip};
use crate::services::authz::context::{AuthorizationContext, RequestRef};
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, identity_middleware))
}

async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Absent when served without connect info (tests, some proxies).
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = resolve_client_ip(req.headers(), peer);

    // Nested routers see a stripped path; keep the one the client sent.
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.clone())
        .unwrap_or_else(|| req.uri().clone());

    let inbound = InboundRequest::new(req.method().clone(), uri.clone(), req.headers().clone())
        .with_client_ip(client_ip);

    let storage = Arc::new(IdentityStorage::new());
    let identity = state
        .facade
        .initialize(&inbound, &state.settings, &storage)
        .await?;

    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let ctx = AuthorizationContext::new(
        state.decider.clone(),
        identity,
        state.settings.admin_role.clone(),
        client_ip,
        RequestRef {
            method: req.method().clone(),
            uri,
            request_id,
        },
    );

    req.extensions_mut().insert(storage);
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_state;
    use crate::config::Config;
    use crate::repos::memory_store::MemoryStore;
    use crate::test_support::{RS256_PUBLIC_PEM, sign_rs256};
    use axum::{Extension, body::to_bytes, http::StatusCode, routing::get};
    use serde_json::json;
    use std::collections::HashMap;
    use tower::ServiceExt;

    async fn stored_username(Extension(storage): Extension<Arc<IdentityStorage>>) -> String {
        storage
            .current()
            .map(|identity| identity.username().to_string())
            .unwrap_or_default()
    }

    fn app() -> Router {
        let env = HashMap::from([("JWT_KEY".to_string(), RS256_PUBLIC_PEM.to_string())]);
        let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
        let state = build_state(&config, Arc::new(MemoryStore::new())).unwrap();

        apply(Router::new().route("/whoami", get(stored_username)), state.clone()).with_state(state)
    }

    #[tokio::test]
    async fn test_storage_is_reachable_from_handlers() {
        let token = sign_rs256(&json!({"username": "alice"}));
        let request = Request::get("/whoami")
            .header("X-Authorization", format!("Bearer {}", token.as_str()))
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"alice");
    }

    #[tokio::test]
    async fn test_failed_authentication_stops_the_request() {
        let request = Request::get("/whoami").body(Body::empty()).unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

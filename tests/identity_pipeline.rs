use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

use graphgate::app::{build_router, build_state};
use graphgate::config::Config;
use graphgate::repos::store::into_row;
use graphgate::repos::{DataStore, MemoryStore};
use graphgate::services::auth::{IdentityStorage, InboundRequest};
use graphgate::services::authz::{AuthorizationContext, RequestRef};
use graphgate::services::resolver::{Args, FieldConfig, SchemaField, Source, TableSource};
use graphgate::state::AppState;

const PRIVATE_PEM: &str = include_str!("fixtures/rs256_private.pem");
const PUBLIC_PEM: &str = include_str!("fixtures/rs256_public.pem");

fn sign(claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap();
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &key).unwrap()
}

fn tamper(token: &str) -> String {
    let (signed, signature) = token.rsplit_once('.').unwrap();
    let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
    bytes[0] ^= 0x01;
    format!("{signed}.{}", URL_SAFE_NO_PAD.encode(bytes))
}

fn config(extra: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = HashMap::from([("JWT_KEY".to_string(), PUBLIC_PEM.to_string())]);
    env.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    Config::from_lookup(|key| env.get(key).cloned()).unwrap()
}

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new()
            .with_rows(
                "user_data",
                [into_row(json!({"id": 42, "username": "alice", "display_name": "Alice"})).unwrap()],
            )
            .with_rows(
                "document",
                [
                    into_row(json!({"doc_id": 1, "owner_id": 42, "title": "mine"})).unwrap(),
                    into_row(json!({"doc_id": 2, "owner_id": 7, "title": "theirs"})).unwrap(),
                ],
            ),
    )
}

fn state(store: &Arc<MemoryStore>, extra: &[(&str, &str)]) -> AppState {
    build_state(&config(extra), store.clone()).unwrap()
}

fn inbound(token: &str) -> InboundRequest {
    let request = Request::post("/graphql")
        .header("X-Authorization", format!("Bearer {token}"))
        .body(())
        .unwrap();
    let (parts, _) = request.into_parts();
    InboundRequest::new(parts.method, parts.uri, parts.headers)
}

#[tokio::test]
async fn get_by_field_returns_the_callers_row() {
    let store = seeded_store();
    let state = state(&store, &[]);

    let token = sign(&json!({"username": "alice", "roles": ["ROLE_USER"]}));
    let identity = state
        .facade
        .initialize(&inbound(&token), &state.settings, &IdentityStorage::new())
        .await
        .unwrap();
    assert_eq!(identity.username(), "alice");
    assert_eq!(store.insert_count(), 0);

    let ctx = AuthorizationContext::new(
        state.decider.clone(),
        identity,
        state.settings.admin_role.clone(),
        None,
        RequestRef::default(),
    );

    let user = store
        .find_one_by("user_data", "username", &json!("alice"))
        .await
        .unwrap()
        .unwrap();
    let field = SchemaField::new(
        "User",
        "document",
        FieldConfig::new()
            .alias("id")
            .get_by(Arc::new(TableSource::new(store.clone(), "document")), "owner_id"),
    );

    let value = state
        .resolver
        .resolve(&Source::Row(user), &Args::new(), &ctx, &field)
        .await
        .unwrap();

    assert_eq!(value, json!({"docId": 1, "ownerId": 42, "title": "mine"}));
}

#[tokio::test]
async fn invalid_signature_never_touches_the_store() {
    let store = seeded_store();
    let state = state(&store, &[]);

    let token = tamper(&sign(&json!({"username": "alice", "roles": ["ROLE_USER"]})));
    let storage = IdentityStorage::new();
    let err = state
        .facade
        .initialize(&inbound(&token), &state.settings, &storage)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Token invalid");
    assert!(storage.current().is_none());
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn unknown_user_is_provisioned_once() {
    let store = seeded_store();
    let state = state(&store, &[]);
    let token = sign(&json!({"username": "bob"}));

    for _ in 0..2 {
        let identity = state
            .facade
            .initialize(&inbound(&token), &state.settings, &IdentityStorage::new())
            .await
            .unwrap();
        assert_eq!(identity.username(), "bob");
    }

    assert_eq!(store.insert_count(), 1);
    assert_eq!(store.rows("user_data").len(), 2);
}

async fn get(app: axum::Router, uri: &str, token: Option<&str>) -> (StatusCode, Option<String>, Value) {
    let mut request = Request::get(uri);
    if let Some(token) = token {
        request = request.header("X-Authorization", format!("Bearer {token}"));
    }

    let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, request_id, body)
}

#[tokio::test]
async fn http_health_is_public() {
    let store = seeded_store();
    let (status, request_id, body) = get(build_router(state(&store, &[])), "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(request_id.is_some());
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn http_identity_with_valid_token() {
    let store = seeded_store();
    let token = sign(&json!({"username": "alice", "roles": "ROLE_USER"}));

    let (status, request_id, body) =
        get(build_router(state(&store, &[])), "/api/v1/identity", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], json!("alice"));
    assert_eq!(body["roles"], json!(["ROLE_USER"]));
    assert_eq!(body["anonymous"], json!(false));
    assert_eq!(body["admin"], json!(false));
    assert_eq!(body["requestId"].as_str(), request_id.as_deref());
    assert!(body.get("rawCredential").is_none());
}

#[tokio::test]
async fn http_identity_rejects_bad_or_missing_tokens() {
    let store = seeded_store();
    let token = tamper(&sign(&json!({"username": "alice"})));

    let (status, _, body) = get(build_router(state(&store, &[])), "/api/v1/identity", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"error": {"code": "UNAUTHORIZED", "message": "Token invalid"}})
    );

    let (status, _, body) = get(build_router(state(&store, &[])), "/api/v1/identity", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], json!("Token required"));

    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn http_identity_accepts_query_token() {
    let store = seeded_store();
    let token = sign(&json!({"username": "alice"}));

    let (status, _, body) = get(
        build_router(state(&store, &[])),
        &format!("/api/v1/identity?jwt={token}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], json!("alice"));
}

#[tokio::test]
async fn http_identity_when_jwt_is_disabled() {
    let store = seeded_store();

    let (status, _, body) = get(
        build_router(state(&store, &[("JWT_ENABLED", "false")])),
        "/api/v1/identity",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], json!("anonymous"));
    assert_eq!(body["roles"], json!([]));
    assert_eq!(body["admin"], json!(false));

    let (_, _, body) = get(
        build_router(state(&store, &[("JWT_ENABLED", "false"), ("ANONYMOUS_ADMIN", "true")])),
        "/api/v1/identity",
        None,
    )
    .await;
    assert_eq!(body["admin"], json!(true));
}

#[tokio::test]
async fn http_anonymous_admin_is_ignored_while_jwt_is_enabled() {
    let store = seeded_store();

    let (status, _, body) = get(
        build_router(state(&store, &[("ANONYMOUS_ADMIN", "true")])),
        "/api/v1/identity",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], json!("Token required"));
}

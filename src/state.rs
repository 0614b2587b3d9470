/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Cheap to clone (Arc inside)
 */
use std::sync::Arc;

use crate::services::auth::facade::{AuthSettings, IdentityFacade};
use crate::services::authz::decider::AuthorizationDecider;
use crate::services::resolver::field_resolver::FieldResolver;

#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<IdentityFacade>,
    pub decider: Arc<AuthorizationDecider>,
    pub resolver: Arc<FieldResolver>,
    pub settings: Arc<AuthSettings>,
}

impl AppState {
    pub fn new(
        facade: IdentityFacade,
        decider: AuthorizationDecider,
        resolver: FieldResolver,
        settings: AuthSettings,
    ) -> Self {
        Self {
            facade: Arc::new(facade),
            decider: Arc::new(decider),
            resolver: Arc::new(resolver),
            settings: Arc::new(settings),
        }
    }
}

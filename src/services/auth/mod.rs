pub mod claims;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod facade;
pub mod identity;
pub mod keys;
pub mod provider;
pub mod request;
pub mod user_provider;
pub mod verifier;

pub use claims::{ClaimSettings, Claims, RawToken};
pub use error::{AuthError, AuthenticationFailed};
pub use extractor::TokenExtractor;
pub use facade::{AuthSettings, IdentityFacade};
pub use identity::{ANONYMOUS_USER, Identity, IdentityStorage};
pub use keys::{CertificateResolver, KeyError, KeyMaterial, StaticKeyResolver, TenantKeyResolver};
pub use provider::JwtAuthProvider;
pub use request::InboundRequest;
pub use user_provider::{DataMapper, DefaultDataMapper, User, UserResolver};
pub use verifier::SignatureVerifier;

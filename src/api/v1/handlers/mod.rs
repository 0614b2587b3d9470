pub mod health;
pub mod identity;

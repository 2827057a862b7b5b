// Authentication material and the provider strategies that produce it

pub mod material;
pub mod provider;

pub use material::{AuthMaterial, SessionToken};
pub use provider::{AnonymousAuthProvider, AuthProvider, TokenAuthProvider, UserAuthProvider};

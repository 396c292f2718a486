pub mod bootstrap;
pub mod google;
pub mod jwt;
pub mod password;
pub mod refresh;
mod types;

pub use types::{
    AdminRole, Claims, IdentityProvider, ManagerRole, RequiredRole, Role, TokenBundle,
};

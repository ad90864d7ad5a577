pub mod authorization;

pub use authorization::{AuthorizationFilter, HEALTH_PATH};

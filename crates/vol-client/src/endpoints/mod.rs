//! Resource endpoints, one module per backend collection.

mod appointments;
mod auth;
mod habits;
mod photos;
mod studies;
mod volunteers;

pub use auth::{LoginRequest, LoginResponse};
pub use photos::PhotoUpload;

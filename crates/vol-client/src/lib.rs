//! REST client for the volunteer administration backend.
//!
//! [`ApiClient`] wraps an async `reqwest` client configured from
//! [`config::Settings`] and a bearer token. Endpoints are grouped per
//! resource:
//!
//! - volunteers (`/api/volontaires`), including the archive flag
//! - studies (`/api/etudes`)
//! - appointments (`/api/rdvs`), including direct status changes
//! - cosmetic habits (`/api/volontaires-hc`), where a missing record is `None`
//! - photos (`/api/photos`), multipart upload and raw download
//! - login (`/api/auth/login`)
//!
//! HTTP 401 becomes [`ApiError::Unauthorized`] so callers can send the user
//! back to `login`. No request is retried.
//!
//! `ApiClient` implements [`vol_core::AppointmentSink`], which is how bulk
//! appointment plans are submitted.

#![warn(clippy::all)]

mod client;
pub mod config;
mod endpoints;
pub mod error;
mod views;

pub use client::{ApiClient, status_error};
pub use config::Settings;
pub use endpoints::{LoginRequest, LoginResponse, PhotoUpload};
pub use error::{ApiError, Result};
pub use views::{AppointmentContext, ReferenceData};

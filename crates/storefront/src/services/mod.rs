//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Login, registration and Google OAuth against the backend

pub mod auth;

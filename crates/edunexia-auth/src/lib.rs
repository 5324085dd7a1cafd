//! # EdunexIA Auth
//!
//! Authentication types and authorization checks for the EdunexIA API.
//!
//! - [`claims`]: JWT access token claims
//! - [`jwt`]: Token creation and verification
//! - [`session`]: The per-request [`Session`], its [`PermissionSet`] and the
//!   [`PermissionGuard`] capability check
//!
//! The permission set is resolved once at login, embedded in the access token,
//! and rebuilt into a [`Session`] on every request. Handlers receive the
//! session explicitly; nothing here is global state.
//!
//! # Example
//!
//! ```ignore
//! use edunexia_auth::{Session, create_access_token, verify_token};
//!
//! let token = create_access_token(user_id, "ana@edunexia.com.br", Some(role_id), names, &config)?;
//! let session = Session::from_claims(verify_token(&token, &config)?)?;
//!
//! if session.has_permission("roles", "update") {
//!     // show the edit control
//! }
//! ```

pub mod claims;
pub mod jwt;
pub mod session;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use session::{PermissionGuard, PermissionSet, Session};

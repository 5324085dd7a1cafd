//! Middleware and extractors for request processing.
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. `AuthUser` extractor validates the JWT and rebuilds the `Session`
//! 3. Permission extractors check the session's grants and reject with 403
//! 4. Handler executes if all checks pass
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{AuthUser, RequireRolesDelete};
//!
//! // Any valid token
//! async fn me(auth_user: AuthUser) -> impl IntoResponse {
//!     Json(SessionResponse::from(auth_user.session()))
//! }
//!
//! // Requires delete:roles (or manage:roles)
//! async fn delete_role(RequireRolesDelete(auth_user): RequireRolesDelete) -> impl IntoResponse {
//!     // ...
//! }
//! ```

pub mod auth;

//! # EdunexIA Core
//!
//! Foundational types shared by every EdunexIA crate:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`permissions`]: The seeded permission catalog and well-known permission names
//! - [`password`]: bcrypt password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use edunexia_core::errors::AppError;
//! use edunexia_core::permissions::{self, catalog};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Role not found"));
//!
//! for entry in catalog().iter().filter(|e| e.resource == permissions::resources::ROLES) {
//!     println!("{}", entry.name());
//! }
//! ```

pub mod errors;
pub mod password;
pub mod permissions;
pub mod serde;

pub use errors::AppError;
pub use password::{hash_password, verify_password};

//! Login and session introspection.

pub mod controller;
pub mod router;
pub mod service;

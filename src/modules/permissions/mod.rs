//! Read-only access to the seeded permission catalog.

pub mod controller;
pub mod router;
pub mod service;

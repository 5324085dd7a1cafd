//! Role management and role↔permission links.

pub mod controller;
pub mod router;
pub mod service;

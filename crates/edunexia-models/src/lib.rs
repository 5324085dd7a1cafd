//! # EdunexIA Models
//!
//! Domain entities and request/response DTOs for the access control API.
//!
//! - [`ids`]: Strongly-typed UUID newtypes
//! - [`badges`]: Closed display mappings for role scope and kind
//! - [`permissions`]: Permission catalog entries and grouping helpers
//! - [`roles`]: Roles, role views, and role DTOs
//! - [`users`]: Users and the well-known system role IDs
//! - [`auth`]: Login and session DTOs
//!
//! # Example
//!
//! ```ignore
//! use edunexia_models::roles::{Role, RoleScope, RoleView};
//!
//! let view = RoleView::for_session(role, &session.permissions);
//! assert_eq!(RoleScope::Institution.badge().label, "Instituição");
//! ```

pub mod auth;
pub mod badges;
pub mod ids;
pub mod permissions;
pub mod roles;
pub mod users;

pub use auth::{LoginRequest, LoginResponse, SessionResponse};
pub use badges::{Badge, BadgeColor};
pub use ids::{PermissionId, RoleId, UserId};
pub use permissions::{
    AddPermissionDto, Permission, PermissionFilterParams, PermissionGroup, RolePermissionAck,
    RolePermissionDetail, available_permissions, group_by_resource,
};
pub use roles::{
    CreateRoleDto, Role, RoleCapabilities, RoleFilterParams, RoleKind, RoleScope, RoleView,
    UpdateRoleDto,
};
pub use users::{User, system_roles};

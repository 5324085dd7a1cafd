//! Session and capability checks.
//!
//! A [`Session`] is rebuilt from verified [`Claims`] on every request and
//! handed to handlers explicitly. Its [`PermissionSet`] answers
//! `has_permission(resource, action)`; [`PermissionGuard`] wraps that
//! predicate for callers that want "render this, else that" semantics.
//!
//! A grant of `manage:<resource>` satisfies every action on `<resource>`.

use std::collections::BTreeSet;

use uuid::Uuid;

use edunexia_core::AppError;
use edunexia_core::permissions::{actions, parse_permission_name, permission_name};

use crate::claims::Claims;

/// The `(resource, action)` pairs granted to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    // (resource, action); ordered so `names()` is stable
    grants: BTreeSet<(String, String)>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from `action:resource` names. Malformed names are skipped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let grants = names
            .into_iter()
            .filter_map(|name| {
                parse_permission_name(name.as_ref())
                    .map(|(action, resource)| (resource.to_string(), action.to_string()))
            })
            .collect();
        Self { grants }
    }

    pub fn grant(&mut self, resource: &str, action: &str) {
        self.grants
            .insert((resource.to_string(), action.to_string()));
    }

    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        self.contains(resource, action) || self.contains(resource, actions::MANAGE)
    }

    /// Sorted `action:resource` names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .grants
            .iter()
            .map(|(resource, action)| permission_name(action, resource))
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    fn contains(&self, resource: &str, action: &str) -> bool {
        self.grants
            .contains(&(resource.to_string(), action.to_string()))
    }
}

/// Gate for a UI region or an operation that requires `(resource, action)`.
///
/// ```ignore
/// let delete_button = PermissionGuard::new("roles", "delete")
///     .render(&session.permissions, || "Excluir", None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGuard<'a> {
    pub resource: &'a str,
    pub action: &'a str,
}

impl<'a> PermissionGuard<'a> {
    pub const fn new(resource: &'a str, action: &'a str) -> Self {
        Self { resource, action }
    }

    pub fn allows(&self, permissions: &PermissionSet) -> bool {
        permissions.has_permission(self.resource, self.action)
    }

    /// Yields `children()` when allowed, otherwise `fallback`.
    pub fn render<T, F>(
        &self,
        permissions: &PermissionSet,
        children: F,
        fallback: Option<T>,
    ) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        if self.allows(permissions) {
            Some(children())
        } else {
            fallback
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role_id: Option<Uuid>,
    pub permissions: PermissionSet,
}

impl Session {
    /// # Errors
    ///
    /// Returns unauthorized when the subject claim is not a UUID.
    pub fn from_claims(claims: Claims) -> Result<Self, AppError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))?;

        Ok(Self {
            user_id,
            email: claims.email,
            role_id: claims.role_id,
            permissions: PermissionSet::from_names(&claims.permissions),
        })
    }

    pub fn has_permission(&self, resource: &str, action: &str) -> bool {
        self.permissions.has_permission(resource, action)
    }
}

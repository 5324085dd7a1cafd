//! The permission catalog.
//!
//! A permission is a `(resource, action)` pair. Its display name is
//! `action:resource` (for example `create:courses`). The catalog is reference
//! data: it is written to the database by `edunexia-cli seed` and never
//! mutated through the API.
//!
//! # Example
//!
//! ```ignore
//! use edunexia_core::permissions::{self, actions, resources};
//!
//! assert_eq!(permissions::ROLES_UPDATE, "update:roles");
//! assert_eq!(
//!     permissions::permission_name(actions::CREATE, resources::COURSES),
//!     "create:courses"
//! );
//! ```

/// Resource names subject to access control.
pub mod resources {
    pub const USERS: &str = "users";
    pub const ROLES: &str = "roles";
    pub const PERMISSIONS: &str = "permissions";
    pub const INSTITUTIONS: &str = "institutions";
    pub const POLOS: &str = "polos";
    pub const PARTNERS: &str = "partners";
    pub const COURSES: &str = "courses";
    pub const STUDENTS: &str = "students";
    pub const ENROLLMENTS: &str = "enrollments";
    pub const LEADS: &str = "leads";
    pub const INVOICES: &str = "invoices";
    pub const PAYMENTS: &str = "payments";
    pub const CERTIFICATES: &str = "certificates";
    pub const DOCUMENTS: &str = "documents";
    pub const AUDIT_LOGS: &str = "audit_logs";
}

/// Operation verbs.
pub mod actions {
    pub const CREATE: &str = "create";
    pub const READ: &str = "read";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    /// Grants every action on the resource.
    pub const MANAGE: &str = "manage";
}

// =============================================================================
// Well-known permission names checked by the API itself
// =============================================================================

/// Permission to list and view roles
pub const ROLES_READ: &str = "read:roles";
/// Permission to create roles
pub const ROLES_CREATE: &str = "create:roles";
/// Permission to edit roles and their permission links
pub const ROLES_UPDATE: &str = "update:roles";
/// Permission to delete roles
pub const ROLES_DELETE: &str = "delete:roles";
/// Permission to browse the permission catalog
pub const PERMISSIONS_READ: &str = "read:permissions";

/// `(resource, Portuguese label)` for every catalogued resource.
pub const RESOURCES: &[(&str, &str)] = &[
    (resources::USERS, "usuários"),
    (resources::ROLES, "perfis de acesso"),
    (resources::PERMISSIONS, "permissões"),
    (resources::INSTITUTIONS, "instituições"),
    (resources::POLOS, "polos"),
    (resources::PARTNERS, "parceiros"),
    (resources::COURSES, "cursos"),
    (resources::STUDENTS, "alunos"),
    (resources::ENROLLMENTS, "matrículas"),
    (resources::LEADS, "leads"),
    (resources::INVOICES, "faturas"),
    (resources::PAYMENTS, "pagamentos"),
    (resources::CERTIFICATES, "certificados"),
    (resources::DOCUMENTS, "documentos"),
    (resources::AUDIT_LOGS, "logs de auditoria"),
];

/// `(action, Portuguese verb)` for every catalogued action.
pub const ACTIONS: &[(&str, &str)] = &[
    (actions::CREATE, "Criar"),
    (actions::READ, "Visualizar"),
    (actions::UPDATE, "Editar"),
    (actions::DELETE, "Excluir"),
    (actions::MANAGE, "Gerenciar"),
];

/// One catalog row before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub resource: &'static str,
    pub action: &'static str,
    pub description: String,
}

impl CatalogEntry {
    pub fn name(&self) -> String {
        permission_name(self.action, self.resource)
    }
}

/// Every `(resource, action)` pair shipped with the platform, ordered by
/// resource then action.
pub fn catalog() -> Vec<CatalogEntry> {
    RESOURCES
        .iter()
        .flat_map(|&(resource, label)| {
            ACTIONS.iter().map(move |&(action, verb)| CatalogEntry {
                resource,
                action,
                description: format!("{} {}", verb, label),
            })
        })
        .collect()
}

/// Builds the `action:resource` display name.
pub fn permission_name(action: &str, resource: &str) -> String {
    format!("{}:{}", action, resource)
}

/// Splits an `action:resource` name into `(action, resource)`.
///
/// Returns `None` when either half is empty or the separator is missing.
pub fn parse_permission_name(name: &str) -> Option<(&str, &str)> {
    let (action, resource) = name.split_once(':')?;
    if action.is_empty() || resource.is_empty() {
        return None;
    }
    Some((action, resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_covers_every_resource_and_action() {
        let entries = catalog();
        assert_eq!(entries.len(), RESOURCES.len() * ACTIONS.len());

        let keys: HashSet<(&str, &str)> =
            entries.iter().map(|e| (e.resource, e.action)).collect();
        assert_eq!(keys.len(), entries.len(), "natural keys must be unique");
    }

    #[test]
    fn test_catalog_descriptions() {
        let entries = catalog();
        let create_courses = entries
            .iter()
            .find(|e| e.resource == resources::COURSES && e.action == actions::CREATE)
            .unwrap();
        assert_eq!(create_courses.description, "Criar cursos");
        assert_eq!(create_courses.name(), "create:courses");
    }

    #[test]
    fn test_well_known_names_exist_in_catalog() {
        let names: HashSet<String> = catalog().iter().map(CatalogEntry::name).collect();
        for name in [
            ROLES_READ,
            ROLES_CREATE,
            ROLES_UPDATE,
            ROLES_DELETE,
            PERMISSIONS_READ,
        ] {
            assert!(names.contains(name), "{} missing from catalog", name);
        }
    }

    #[test]
    fn test_parse_permission_name() {
        assert_eq!(
            parse_permission_name("update:roles"),
            Some(("update", "roles"))
        );
        assert_eq!(parse_permission_name("roles"), None);
        assert_eq!(parse_permission_name(":roles"), None);
        assert_eq!(parse_permission_name("update:"), None);
    }
}

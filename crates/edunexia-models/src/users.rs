use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::{RoleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub role_id: Option<RoleId>,
    pub created_at: DateTime<Utc>,
}

/// Roles seeded with the platform.
///
/// IDs are fixed so that seeding is idempotent across environments and so
/// the CLI can assign them without a lookup.
pub mod system_roles {
    use edunexia_core::permissions::{actions, resources};

    use crate::ids::RoleId;
    use crate::roles::RoleScope;

    pub const SUPER_ADMIN: RoleId = RoleId::from_u128(1);
    pub const ADMIN: RoleId = RoleId::from_u128(2);
    pub const POLO_MANAGER: RoleId = RoleId::from_u128(3);
    pub const PARTNER: RoleId = RoleId::from_u128(4);
    pub const STUDENT: RoleId = RoleId::from_u128(5);

    const CRUD: &[&str] = &[actions::CREATE, actions::READ, actions::UPDATE, actions::DELETE];
    const READ_ONLY: &[&str] = &[actions::READ];
    const READ_WRITE: &[&str] = &[actions::CREATE, actions::READ, actions::UPDATE];

    /// Default grants for a system role.
    #[derive(Debug, Clone, Copy)]
    pub enum Grants {
        /// Every catalog entry.
        All,
        /// `(resource, actions)` pairs.
        Only(&'static [(&'static str, &'static [&'static str])]),
    }

    impl Grants {
        /// Whether `(resource, action)` belongs to this grant set.
        pub fn includes(&self, resource: &str, action: &str) -> bool {
            match self {
                Grants::All => true,
                Grants::Only(pairs) => pairs
                    .iter()
                    .any(|(r, acts)| *r == resource && acts.iter().any(|a| *a == action)),
            }
        }
    }

    #[derive(Debug, Clone, Copy)]
    pub struct SystemRole {
        pub id: RoleId,
        pub name: &'static str,
        pub description: &'static str,
        pub scope: RoleScope,
        pub grants: Grants,
    }

    pub const ALL: &[SystemRole] = &[
        SystemRole {
            id: SUPER_ADMIN,
            name: "Super Admin",
            description: "Acesso total à plataforma",
            scope: RoleScope::Global,
            grants: Grants::All,
        },
        SystemRole {
            id: ADMIN,
            name: "Administrador",
            description: "Administração completa da instituição",
            scope: RoleScope::Institution,
            grants: Grants::Only(&[
                (resources::USERS, CRUD),
                (resources::ROLES, CRUD),
                (resources::PERMISSIONS, READ_ONLY),
                (resources::INSTITUTIONS, &[actions::READ, actions::UPDATE]),
                (resources::POLOS, CRUD),
                (resources::PARTNERS, CRUD),
                (resources::COURSES, CRUD),
                (resources::STUDENTS, CRUD),
                (resources::ENROLLMENTS, CRUD),
                (resources::LEADS, CRUD),
                (resources::INVOICES, CRUD),
                (resources::PAYMENTS, CRUD),
                (resources::CERTIFICATES, CRUD),
                (resources::DOCUMENTS, CRUD),
                (resources::AUDIT_LOGS, READ_ONLY),
            ]),
        },
        SystemRole {
            id: POLO_MANAGER,
            name: "Gestor de Polo",
            description: "Gestão operacional de um polo",
            scope: RoleScope::Polo,
            grants: Grants::Only(&[
                (resources::POLOS, &[actions::READ, actions::UPDATE]),
                (resources::COURSES, READ_ONLY),
                (resources::STUDENTS, READ_WRITE),
                (resources::ENROLLMENTS, READ_WRITE),
                (resources::LEADS, CRUD),
                (resources::DOCUMENTS, READ_WRITE),
                (resources::CERTIFICATES, READ_ONLY),
            ]),
        },
        SystemRole {
            id: PARTNER,
            name: "Parceiro",
            description: "Parceiro comercial da instituição",
            scope: RoleScope::Institution,
            grants: Grants::Only(&[
                (resources::PARTNERS, READ_ONLY),
                (resources::COURSES, READ_ONLY),
                (resources::LEADS, READ_WRITE),
                (resources::ENROLLMENTS, READ_ONLY),
            ]),
        },
        SystemRole {
            id: STUDENT,
            name: "Aluno",
            description: "Acesso do aluno aos próprios cursos",
            scope: RoleScope::Institution,
            grants: Grants::Only(&[
                (resources::COURSES, READ_ONLY),
                (resources::ENROLLMENTS, READ_ONLY),
                (resources::CERTIFICATES, READ_ONLY),
                (resources::DOCUMENTS, READ_ONLY),
                (resources::INVOICES, READ_ONLY),
                (resources::PAYMENTS, READ_ONLY),
            ]),
        },
    ];

    pub fn find(id: RoleId) -> Option<&'static SystemRole> {
        ALL.iter().find(|role| role.id == id)
    }

    /// Looks a system role up by name, ignoring case.
    pub fn find_by_name(name: &str) -> Option<&'static SystemRole> {
        ALL.iter()
            .find(|role| role.name.eq_ignore_ascii_case(name.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::system_roles::{self, Grants};
    use edunexia_core::permissions::catalog;
    use std::collections::HashSet;

    #[test]
    fn test_system_role_ids_and_names_are_unique() {
        let ids: HashSet<_> = system_roles::ALL.iter().map(|r| r.id).collect();
        let names: HashSet<_> = system_roles::ALL
            .iter()
            .map(|r| r.name.to_lowercase())
            .collect();
        assert_eq!(ids.len(), system_roles::ALL.len());
        assert_eq!(names.len(), system_roles::ALL.len());
    }

    #[test]
    fn test_super_admin_gets_everything() {
        let super_admin = system_roles::find(system_roles::SUPER_ADMIN).unwrap();
        assert!(matches!(super_admin.grants, Grants::All));
        assert!(
            catalog()
                .iter()
                .all(|entry| super_admin.grants.includes(entry.resource, entry.action))
        );
    }

    #[test]
    fn test_restricted_grants_only_reference_catalog_entries() {
        let catalog: HashSet<(&str, &str)> =
            catalog().iter().map(|e| (e.resource, e.action)).collect();

        for role in system_roles::ALL {
            if let Grants::Only(pairs) = role.grants {
                for (resource, actions) in pairs {
                    for action in *actions {
                        assert!(
                            catalog.contains(&(*resource, *action)),
                            "{} grants unknown {}:{}",
                            role.name,
                            action,
                            resource
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_student_cannot_manage_roles() {
        let student = system_roles::find_by_name("aluno").unwrap();
        assert!(student.grants.includes("courses", "read"));
        assert!(!student.grants.includes("roles", "read"));
        assert!(!student.grants.includes("courses", "delete"));
    }
}

//! Database seeding.
//!
//! - [`seed_access_control`] writes the permission catalog, the system roles
//!   and their default grants. Safe to run repeatedly.
//! - [`seed_users`] creates demo users for every system role.
//!
//! # Performance
//!
//! - Parallel user generation using Rayon
//! - Multi-value INSERT statements inside a single transaction
//! - Single bcrypt hash reused for all users (cost 4 for speed)

use anyhow::{Context, bail};
use bcrypt::hash;
use fake::Fake;
use fake::faker::name::pt_br::{FirstName, LastName};
use rayon::prelude::*;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::time::Instant;

use edunexia_core::permissions::catalog;
use edunexia_models::{PermissionId, RoleId, system_roles};

pub const DEFAULT_PASSWORD: &str = "password123";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub permissions_inserted: u64,
    pub roles_inserted: u64,
    pub grants_inserted: u64,
}

pub struct UserSeed {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: RoleId,
}

#[derive(FromRow)]
struct CatalogRow {
    id: PermissionId,
    resource: String,
    action: String,
}

/// Inserts the catalog, the system roles and their default grants, skipping
/// anything already present.
pub async fn seed_access_control(db: &PgPool) -> anyhow::Result<SeedSummary> {
    let start_time = Instant::now();
    let mut summary = SeedSummary::default();
    let mut tx = db.begin().await?;

    println!("🌱 Seeding permission catalog...");
    for entry in catalog() {
        summary.permissions_inserted += sqlx::query(
            r#"INSERT INTO permissions (resource, action, description)
               VALUES ($1, $2, $3)
               ON CONFLICT (resource, action) DO NOTHING"#,
        )
        .bind(entry.resource)
        .bind(entry.action)
        .bind(&entry.description)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    let permissions: Vec<CatalogRow> =
        sqlx::query_as("SELECT id, resource, action FROM permissions")
            .fetch_all(&mut *tx)
            .await?;

    println!("🔐 Seeding system roles...");
    for role in system_roles::ALL {
        let blocking: Option<String> = sqlx::query_scalar(
            "SELECT name FROM roles WHERE LOWER(name) = LOWER($1) AND id <> $2",
        )
        .bind(role.name)
        .bind(role.id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(existing) = blocking {
            bail!(
                "Custom role '{}' blocks system role seeding: rename or delete it, then run seed again",
                existing
            );
        }

        summary.roles_inserted += sqlx::query(
            r#"INSERT INTO roles (id, name, description, scope, is_system)
               VALUES ($1, $2, $3, $4, true)
               ON CONFLICT (id) DO NOTHING"#,
        )
        .bind(role.id)
        .bind(role.name)
        .bind(role.description)
        .bind(role.scope)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to seed role {}", role.name))?
        .rows_affected();

        let granted: Vec<PermissionId> = permissions
            .iter()
            .filter(|p| role.grants.includes(&p.resource, &p.action))
            .map(|p| p.id)
            .collect();

        summary.grants_inserted += sqlx::query(
            r#"INSERT INTO role_permissions (role_id, permission_id)
               SELECT $1, UNNEST($2::uuid[])
               ON CONFLICT (role_id, permission_id) DO NOTHING"#,
        )
        .bind(role.id)
        .bind(&granted)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;

    println!(
        "✅ Seeded {} permissions, {} roles and {} grants in {:?}",
        summary.permissions_inserted,
        summary.roles_inserted,
        summary.grants_inserted,
        start_time.elapsed()
    );

    Ok(summary)
}

/// Creates `per_role` demo users for every system role.
///
/// Every user gets [`DEFAULT_PASSWORD`]. Emails that already exist are skipped.
pub async fn seed_users(db: &PgPool, per_role: usize) -> anyhow::Result<u64> {
    let start_time = Instant::now();

    println!("🔐 Hashing password...");
    let password_hash =
        hash(DEFAULT_PASSWORD, 4).context("Failed to hash seed password")?;

    println!("👥 Generating user data in parallel...");
    let users = generate_users_parallel(per_role, &password_hash);

    println!("💾 Inserting {} users in batches...", users.len());
    let inserted = insert_users_batch(db, &users).await?;

    println!(
        "✅ Inserted {} users in {:?}\n📝 Default password for all users: {}",
        inserted,
        start_time.elapsed(),
        DEFAULT_PASSWORD
    );

    Ok(inserted)
}

fn generate_users_parallel(per_role: usize, password_hash: &str) -> Vec<UserSeed> {
    let specs: Vec<(usize, usize)> = (0..system_roles::ALL.len())
        .flat_map(|role_idx| (0..per_role).map(move |user_idx| (role_idx, user_idx)))
        .collect();

    specs
        .into_par_iter()
        .map(|(role_idx, user_idx)| {
            let role = &system_roles::ALL[role_idx];
            generate_user(role.id, role.name, user_idx, password_hash)
        })
        .collect()
}

fn generate_user(
    role_id: RoleId,
    role_name: &str,
    user_idx: usize,
    password_hash: &str,
) -> UserSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let email = format!(
        "{}.{}+{}{}@edunexia.dev",
        email_part(&first_name),
        email_part(&last_name),
        email_part(role_name),
        user_idx
    );

    UserSeed {
        full_name: format!("{} {}", first_name, last_name),
        email,
        password_hash: password_hash.to_string(),
        role_id,
    }
}

/// Lowercase ASCII letters and digits only.
fn email_part(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

async fn insert_users_batch(db: &PgPool, users: &[UserSeed]) -> anyhow::Result<u64> {
    // 4 params per user, well under the Postgres bind limit
    const BATCH_SIZE: usize = 1000;

    let mut tx = db.begin().await?;
    let mut inserted = 0;

    for chunk in users.chunks(BATCH_SIZE) {
        inserted += insert_users_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

/// `INSERT INTO users ... VALUES ($1, $2, $3, $4), ($5, $6, $7, $8), ...`
async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> anyhow::Result<u64> {
    if users.is_empty() {
        return Ok(0);
    }

    let mut query = String::from("INSERT INTO users (full_name, email, password, role_id) VALUES ");
    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let idx = i * 4;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${})",
            idx + 1,
            idx + 2,
            idx + 3,
            idx + 4
        ));
    }
    query.push_str(" ON CONFLICT (email) DO NOTHING");

    let mut q = sqlx::query(&query);
    for user in users {
        q = q
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role_id);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}

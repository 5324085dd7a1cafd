mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use common::{
    create_custom_role, create_test_user, generate_unique_role_name, login_as, seed, send,
    setup_test_app,
};
use edunexia_models::system_roles;

async fn role_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM roles")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_roles_protects_system_roles(pool: PgPool) {
    seed(&pool).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::SUPER_ADMIN).await;

    let (status, body) = send(&app, "GET", "/api/roles", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let roles = body.as_array().unwrap();
    assert_eq!(roles.len(), system_roles::ALL.len());

    for role in roles {
        assert_eq!(role["isSystem"], true);
        assert_eq!(role["kindBadge"]["label"], "Sistema");
        assert_eq!(
            role["capabilities"],
            json!({ "canEdit": false, "canDelete": false, "canManagePermissions": false })
        );
    }

    let super_admin = roles
        .iter()
        .find(|r| r["name"] == "Super Admin")
        .unwrap();
    assert_eq!(super_admin["permissionCount"], 75);
    assert_eq!(super_admin["scopeBadge"]["label"], "Global");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_custom_role(pool: PgPool) {
    seed(&pool).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::ADMIN).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/roles",
        Some(&token),
        Some(json!({
            "name": "Gerente Financeiro",
            "description": "Gerencia faturas e pagamentos",
            "scope": "institution"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Gerente Financeiro");
    assert_eq!(body["isSystem"], false);
    assert_eq!(body["permissionCount"], 0);
    assert_eq!(body["scopeBadge"], json!({ "label": "Instituição", "color": "blue" }));
    assert_eq!(body["kindBadge"], json!({ "label": "Customizado", "color": "gray" }));
    assert_eq!(
        body["capabilities"],
        json!({ "canEdit": true, "canDelete": true, "canManagePermissions": true })
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_role_short_name_inserts_nothing(pool: PgPool) {
    seed(&pool).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::ADMIN).await;
    let before = role_count(&pool).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/roles",
        Some(&token),
        Some(json!({ "name": "GF", "description": "Gerencia faturas", "scope": "global" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(role_count(&pool).await, before);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_role_duplicate_name_ignores_case(pool: PgPool) {
    seed(&pool).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::ADMIN).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/roles",
        Some(&token),
        Some(json!({ "name": "ALUNO", "description": "Outro perfil de aluno", "scope": "polo" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A role with this name already exists");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_matches_description_and_scope(pool: PgPool) {
    seed(&pool).await;
    create_custom_role(&pool, "Tutor Presencial", &[]).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::ADMIN).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/roles?search=PLATAFORMA",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Super Admin"]);

    let (_, body) = send(&app, "GET", "/api/roles?search=polo", Some(&token), None).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Gestor de Polo"));
    assert!(!names.contains(&"Tutor Presencial"));

    let (_, body) = send(&app, "GET", "/api/roles?search=%20%20", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), system_roles::ALL.len() + 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_role_returns_permission_count(pool: PgPool) {
    seed(&pool).await;
    let role_id = create_custom_role(
        &pool,
        &generate_unique_role_name(),
        &["read:invoices", "update:invoices"],
    )
    .await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::ADMIN).await;

    let (status, body) = send(&app, "GET", &format!("/api/roles/{}", role_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permissionCount"], 2);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/roles/{}", Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_custom_role(pool: PgPool) {
    seed(&pool).await;
    let role_id = create_custom_role(&pool, &generate_unique_role_name(), &[]).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::ADMIN).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/roles/{}", role_id),
        Some(&token),
        Some(json!({ "description": "Acompanha o polo de Campinas", "scope": "polo" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Acompanha o polo de Campinas");
    assert_eq!(body["scope"], "polo");
    assert_eq!(body["scopeBadge"]["label"], "Polo");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_system_role_is_forbidden(pool: PgPool) {
    seed(&pool).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::SUPER_ADMIN).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/roles/{}", system_roles::STUDENT),
        Some(&token),
        Some(json!({ "name": "Estudante" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let name: String = sqlx::query_scalar("SELECT name FROM roles WHERE id = $1")
        .bind(system_roles::STUDENT)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "Aluno");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_custom_role(pool: PgPool) {
    seed(&pool).await;
    let role_id = create_custom_role(&pool, &generate_unique_role_name(), &["read:courses"]).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::ADMIN).await;
    let uri = format!("/api/roles/{}", role_id);

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role_permissions WHERE role_id = $1")
        .bind(role_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_system_role_is_forbidden(pool: PgPool) {
    seed(&pool).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::SUPER_ADMIN).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/roles/{}", system_roles::PARTNER),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(role_count(&pool).await, system_roles::ALL.len() as i64);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_assigned_role_conflicts(pool: PgPool) {
    seed(&pool).await;
    let role_id = create_custom_role(&pool, &generate_unique_role_name(), &[]).await;
    create_test_user(&pool, Some(role_id)).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::ADMIN).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/roles/{}", role_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_cannot_list_roles(pool: PgPool) {
    seed(&pool).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, system_roles::STUDENT).await;

    let (status, body) = send(&app, "GET", "/api/roles", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Access denied. Missing required permission: read:roles"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_capabilities_follow_the_caller(pool: PgPool) {
    seed(&pool).await;
    let role_name = generate_unique_role_name();
    create_custom_role(&pool, &role_name, &[]).await;
    let viewer = create_custom_role(&pool, &generate_unique_role_name(), &["read:roles"]).await;
    let app = setup_test_app(pool.clone());
    let token = login_as(&app, &pool, viewer).await;

    let (status, body) = send(&app, "GET", "/api/roles", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let role = body
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == role_name.as_str())
        .unwrap();
    assert_eq!(
        role["capabilities"],
        json!({ "canEdit": false, "canDelete": false, "canManagePermissions": false })
    );
}

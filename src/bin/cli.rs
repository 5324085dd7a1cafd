use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;

use edunexia::cli::{self, seeder};
use edunexia::modules::roles::service as role_service;
use edunexia_db::{init_db_pool, run_migrations};
use edunexia_models::RoleScope;

#[derive(Parser)]
#[command(name = "edunexia-cli")]
#[command(about = "EdunexIA CLI - Administrative tools for roles and permissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Seed the permission catalog and the system roles
    Seed,
    /// Create demo users for every system role
    SeedUsers {
        /// Number of users per system role
        #[arg(long, default_value = "10")]
        per_role: usize,
    },
    /// Create a Super Admin account
    CreateAdmin {
        /// Full name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Manage roles
    Roles {
        #[command(subcommand)]
        command: RoleCommands,
    },
}

#[derive(Subcommand)]
enum RoleCommands {
    /// List roles
    List {
        /// Case-insensitive filter over name, description and scope
        #[arg(short = 's', long)]
        search: Option<String>,
    },
    /// Create a custom role
    Create {
        #[arg(short = 'n', long)]
        name: Option<String>,

        #[arg(short = 'd', long)]
        description: Option<String>,

        /// global, institution or polo
        #[arg(long)]
        scope: Option<RoleScope>,
    },
    /// Delete a custom role
    Delete {
        /// Role ID or name
        role: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Link a permission (e.g. `create:courses`) to a custom role
    Grant {
        /// Role ID or name
        role: String,
        permission: String,
    },
    /// Unlink a permission from a custom role
    Revoke {
        /// Role ID or name
        role: String,
        permission: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let pool = init_db_pool().await?;

    match cli.command {
        Commands::Migrate => {
            run_migrations(&pool).await?;
            println!("✅ Migrations applied");
        }
        Commands::Seed => {
            seeder::seed_access_control(&pool).await?;
        }
        Commands::SeedUsers { per_role } => {
            seeder::seed_users(&pool, per_role).await?;
        }
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&pool, name, email, password).await?,
        Commands::Roles { command } => handle_roles(&pool, command).await?,
    }

    Ok(())
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::new().with_prompt("Full name").interact_text()?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let user_id = cli::create_admin(pool, &name, &email, &password).await?;

    println!("\n✅ Super Admin created successfully!");
    println!("   ID: {}", user_id);
    println!("   Email: {}", email);
    println!("   Name: {}", name);
    Ok(())
}

async fn handle_roles(pool: &PgPool, command: RoleCommands) -> anyhow::Result<()> {
    match command {
        RoleCommands::List { search } => {
            let roles = role_service::get_roles(pool, search.as_deref())
                .await
                .map_err(|e| e.error)?;

            if roles.is_empty() {
                println!("No roles found");
            }
            for (role, count) in roles {
                println!(
                    "{}  {:<24} {:<12} {:<12} {:>3} permissions",
                    role.id,
                    role.name,
                    role.scope.badge().label,
                    role.kind().badge().label,
                    count
                );
            }
        }
        RoleCommands::Create {
            name,
            description,
            scope,
        } => {
            let name = match name {
                Some(name) => name,
                None => Input::new().with_prompt("Name").interact_text()?,
            };
            let description = match description {
                Some(description) => description,
                None => Input::new().with_prompt("Description").interact_text()?,
            };
            let scope = match scope {
                Some(scope) => scope,
                None => {
                    let raw: String = Input::new()
                        .with_prompt("Scope (global, institution, polo)")
                        .interact_text()?;
                    raw.parse().map_err(anyhow::Error::msg)?
                }
            };

            let role = cli::create_role(pool, &name, &description, scope).await?;
            println!("✅ Role '{}' created ({})", role.name, role.id);
        }
        RoleCommands::Delete { role, yes } => {
            let role = cli::resolve_role(pool, &role).await?;
            if !yes && !confirm(&format!("Delete role '{}'?", role.name))? {
                println!("Cancelled");
                return Ok(());
            }
            cli::delete_role(pool, &role).await?;
            println!("✅ Role '{}' deleted", role.name);
        }
        RoleCommands::Grant { role, permission } => {
            let role = cli::resolve_role(pool, &role).await?;
            let ack = cli::grant_permission(pool, &role, &permission).await?;
            println!("✅ {}", ack.message);
        }
        RoleCommands::Revoke {
            role,
            permission,
            yes,
        } => {
            let role = cli::resolve_role(pool, &role).await?;
            if !yes
                && !confirm(&format!(
                    "Remove permission '{}' from role '{}'?",
                    permission, role.name
                ))?
            {
                println!("Cancelled");
                return Ok(());
            }
            cli::revoke_permission(pool, &role, &permission).await?;
            println!("✅ Permission '{}' removed from '{}'", permission, role.name);
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

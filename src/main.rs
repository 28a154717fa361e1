//! Clinic Access maintenance tool.
//!
//! Connects to the clinic database and runs one maintenance command
//! against the settings and role permission tables.
//!
//! ## Commands
//!
//! - `seed` - store missing default settings and role templates
//! - `matrix` - print every role's permissions as JSON
//! - `modules <Role>` - list the modules a role can view
//! - `reset-role <Role>` - restore a role's default template
//! - `reset-settings <Category>` - restore a settings category
//! - `get <Key>` / `set <Key> <Value>` - read or write one setting

use anyhow::{Context, bail};
use serde_json::{Map, Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use clinic_access::AccessServices;
use clinic_access::config::Config;
use clinic_access::settings::defaults;
use clinic_access::database::{Database, PermissionRepository, Role, SettingsRepository, UpsertOutcome};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

type Services = AccessServices<SettingsRepository, PermissionRepository>;

/// A parsed command line.
#[derive(Debug)]
enum Command {
    Seed,
    Matrix,
    Modules(Role),
    ResetRole(Role),
    ResetSettings(String),
    Get(String),
    Set(String, String),
}

impl Command {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            ["seed"] => Self::Seed,
            ["matrix"] | [] => Self::Matrix,
            ["modules", role] => Self::Modules(role.parse()?),
            ["reset-role", role] => Self::ResetRole(role.parse()?),
            ["reset-settings", category] => Self::ResetSettings(category.to_string()),
            ["get", key] => Self::Get(key.to_string()),
            ["set", key, value] => Self::Set(key.to_string(), value.to_string()),
            other => bail!("Unknown command: {}", other.join(" ")),
        };
        Ok(command)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("clinic_access=info,mongodb=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database)
        .await
        .context("Failed to connect to MongoDB")?;
    info!("Database connected");

    let services = AccessServices::mongo(&db, &config)
        .await
        .context("Failed to prepare access collections")?;
    run(&services, command, &config.operator).await
}

async fn run(services: &Services, command: Command, operator: &str) -> anyhow::Result<()> {
    match command {
        Command::Seed => {
            let (settings, permissions) = services.initialize_defaults(operator).await?;
            info!("Seeded {} settings and {} permission entries", settings, permissions);
        }
        Command::Matrix => {
            let mut roles = Map::new();
            for role in Role::ALL {
                let mut modules = Map::new();
                for (module, flags) in services.permissions.role_matrix(role).await {
                    modules.insert(module.to_string(), serde_json::to_value(flags)?);
                }
                roles.insert(role.to_string(), Value::Object(modules));
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(roles))?);
        }
        Command::Modules(role) => {
            let modules: Vec<String> = services
                .permissions
                .accessible_modules(role)
                .await
                .iter()
                .map(|m| m.to_string())
                .collect();
            println!("{}", json!({ "role": role.as_str(), "modules": modules }));
        }
        Command::ResetRole(role) => {
            let written = services.permissions.reset_role_to_default(role, operator).await?;
            info!("Reset {} ({} modules)", role, written);
        }
        Command::ResetSettings(category) => {
            let written = services
                .settings
                .reset_category_to_defaults(&category, operator)
                .await?;
            if written == 0 {
                bail!(
                    "No well-known settings in category {} (known: {})",
                    category,
                    defaults::categories().join(", ")
                );
            }
            info!("Reset {} settings in {}", written, category);
        }
        Command::Get(key) => {
            let value = services.settings.get_string(&key, "").await;
            println!("{}", json!({ "key": key, "value": value }));
        }
        Command::Set(key, value) => {
            match services.settings.set_string(&key, &value, operator).await? {
                UpsertOutcome::Unchanged => info!("{} already set to {:?}", key, value),
                outcome => info!("{} set to {:?} ({:?})", key, value, outcome),
            }
        }
    }
    Ok(())
}

use clap::Parser;
use pkg_constants::auth::DEFAULT_ADMIN_PASSWORD;
use pkg_constants::paths::{DEFAULT_CONFIG, DEFAULT_DATA_DIR};
use pkg_rbac::bootstrap::hash_password;
use pkg_rbac::defaults::default_catalog;
use pkg_rbac::{AdminNaming, BootstrapOptions, bootstrap_rbac};
use pkg_state::client::StateStore;
use pkg_state::kv::MemoryKv;
use pkg_state::registry::Registry;
use pkg_types::config::{BootstrapConfigFile, load_config_file};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "rbac-bootstrap",
    about = "Reconcile the built-in role catalog and ensure the default admin exists"
)]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Directory for SlateDB state storage
    #[arg(long)]
    data_dir: Option<String>,

    /// Keep state in memory (useful for dry runs)
    #[arg(long)]
    in_memory: bool,

    /// Initial password for the default admin
    #[arg(long, env = "RBAC_BOOTSTRAP_ADMIN_PASSWORD")]
    admin_password: Option<String>,

    /// Use deterministic admin user/binding names
    #[arg(long)]
    fixed_admin_names: bool,

    /// Log format: text or json
    #[arg(long)]
    log_format: Option<String>,
}

fn init_logging(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let file_cfg: BootstrapConfigFile = load_config_file(&cli.config)?;

    // Merge: CLI args > config file > defaults
    let log_format = cli
        .log_format
        .or(file_cfg.log_format)
        .unwrap_or_else(|| "text".to_string());
    init_logging(&log_format);
    info!("Config file: {}", cli.config);

    let in_memory = cli.in_memory || file_cfg.in_memory.unwrap_or(false);
    let data_dir = cli
        .data_dir
        .or(file_cfg.data_dir)
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let password = cli
        .admin_password
        .or(file_cfg.admin_password)
        .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());
    let naming = if cli.fixed_admin_names || file_cfg.fixed_admin_names.unwrap_or(false) {
        AdminNaming::Fixed
    } else {
        AdminNaming::Generated
    };

    info!("Starting rbac-bootstrap");
    if in_memory {
        info!("  Storage:   in-memory");
    } else {
        info!("  Data dir:  {}", data_dir);
    }
    info!("  Naming:    {:?}", naming);
    if password == DEFAULT_ADMIN_PASSWORD {
        warn!("Default admin uses the built-in initial password; it must be changed on first login");
    }

    let options = BootstrapOptions {
        password_hash: hash_password(&password)?,
        naming,
    };
    let catalog = default_catalog();

    let admin = if in_memory {
        let registry = Registry::new(MemoryKv::new());
        bootstrap_rbac(&registry, &catalog, &options).await?
    } else {
        let store = StateStore::open(&data_dir).await?;
        let registry = Registry::new(store.clone());
        let result = bootstrap_rbac(&registry, &catalog, &options).await;
        store.close().await?;
        result?
    };

    println!("{}", admin);
    Ok(())
}

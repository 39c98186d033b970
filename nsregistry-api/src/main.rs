use anyhow::Context;
use clap::{Parser, Subcommand};
use nsregistry_api::config::NsRegistryConfig;
use nsregistry_api::db::{self, Database};
use nsregistry_api::logging::LoggingConfig;
use nsregistry_api::middleware::auth::create_jwt_token;
use nsregistry_api::registry::{AccessPartitioner, ClusterGateway, NamespaceRegistry};
use nsregistry_api::{routes, shutdown, AppState};
use nsregistry_common::auth::{Principal, UserRole};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Kubernetes namespace registry", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a sample configuration file
    SampleConfig,
    /// Issue a bearer token for an existing user
    IssueToken {
        /// Registry user id
        user_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::SampleConfig => {
            print!("{}", NsRegistryConfig::generate_sample());
            Ok(())
        }
        Command::IssueToken { user_id } => issue_token(user_id).await,
    }
}

fn load_config() -> anyhow::Result<NsRegistryConfig> {
    let config = NsRegistryConfig::load()?;
    config.validate()?;
    Ok(config)
}

async fn open_database(config: &NsRegistryConfig) -> anyhow::Result<Arc<Database>> {
    let database = Database::new(&config.database.url, config.database.max_connections).await?;
    database.migrate().await?;

    if db::users::count_users(database.pool()).await? == 0 {
        let admin = Principal::new(1, config.auth.bootstrap_admin.clone(), UserRole::Admin);
        db::users::create_user(database.pool(), &admin).await?;
        info!(user_id = admin.user_id, username = %admin.username, "Seeded bootstrap administrator");
    }

    Ok(Arc::new(database))
}

#[cfg(feature = "kubernetes")]
async fn build_gateway(config: &NsRegistryConfig) -> anyhow::Result<Arc<dyn ClusterGateway>> {
    let gateway =
        nsregistry_api::kubernetes::KubeClusterGateway::from_config(&config.kubernetes).await?;
    info!(clusters = gateway.cluster_count(), "Kubernetes gateway initialized");
    Ok(Arc::new(gateway))
}

#[cfg(not(feature = "kubernetes"))]
async fn build_gateway(config: &NsRegistryConfig) -> anyhow::Result<Arc<dyn ClusterGateway>> {
    use nsregistry_api::registry::memory::InMemoryClusterGateway;

    warn!("Built without the kubernetes feature; namespaces are only tracked in memory");
    let codes = config.kubernetes.clusters.iter().map(|c| c.code);
    Ok(Arc::new(InMemoryClusterGateway::with_clusters(codes)))
}

async fn serve() -> anyhow::Result<()> {
    let config = load_config()?;

    let _log_guard = LoggingConfig::from(&config.logging).init()?;
    info!("Configuration loaded successfully");

    if config.uses_default_secret() {
        warn!("auth.jwt_secret is the built-in default; set NSREGISTRY_JWT_SECRET in production");
    }

    let database = open_database(&config).await?;
    let gateway = build_gateway(&config).await?;

    let registry = Arc::new(NamespaceRegistry::new(
        database.clone(),
        gateway,
        database.clone(),
    ));
    let access = Arc::new(
        AccessPartitioner::new(database.clone(), database.clone(), database.clone())
            .with_max_page_size(config.registry.max_page_size),
    );

    let state = Arc::new(AppState::new(registry, access, config.auth.jwt_secret.clone()));
    let app = routes::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Namespace registry listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    info!("Server stopped, closing database...");
    database.close().await;

    Ok(())
}

async fn issue_token(user_id: i64) -> anyhow::Result<()> {
    let config = load_config()?;
    let database = open_database(&config).await?;

    let user = db::users::get_user(database.pool(), user_id)
        .await?
        .with_context(|| format!("User {} not found", user_id))?;

    let token = create_jwt_token(&config.auth.jwt_secret, &user, config.auth.token_ttl_hours)
        .map_err(anyhow::Error::msg)?;
    println!("{}", token);

    database.close().await;
    Ok(())
}

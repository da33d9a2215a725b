use anyhow::Context;
use clap::{Parser, Subcommand};
use reservo_config::load as load_config;
use reservo_gateway::{create_router, GatewayState};
use reservo_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

mod data;

#[derive(Parser)]
#[command(name = "reservo-server")]
#[command(about = "Reservo booking backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Print users, shops, services and appointments
    DumpData,
    /// Delete every row from the booking tables
    ClearData,
    /// Create a demo owner, customer and shop
    SeedData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::DumpData => {
            let services = bootstrap().await?;
            data::dump(&services.db_pool).await
        }
        Commands::ClearData => {
            let services = bootstrap().await?;
            let summary = data::clear(&services.db_pool).await?;
            println!("Database cleared:");
            for (table, rows) in summary {
                println!("- {rows} {table} deleted");
            }
            Ok(())
        }
        Commands::SeedData => {
            let services = bootstrap().await?;
            let seeded = data::seed(&services).await?;
            println!("Database seeded with demo data:");
            println!("- owner    {} / {}", data::DEMO_OWNER_EMAIL, data::DEMO_PASSWORD);
            println!("- customer {} / {}", data::DEMO_CUSTOMER_EMAIL, data::DEMO_PASSWORD);
            println!("- shop     {}", seeded.shop_id);
            println!("- service  {}", seeded.service_id);
            println!("Run 'dump-data' to see the inserted data");
            Ok(())
        }
    }
}

async fn bootstrap() -> anyhow::Result<BackendServices> {
    let config = load_config().context("failed to load configuration")?;
    BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting Reservo backend");

    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = GatewayState::new(
        services.db_pool.clone(),
        services.authenticator.clone(),
        services.booking.clone(),
    );
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(reservo_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use creatorpay::config::Config;
use creatorpay::db::{create_pool, init_db, queries, AppState};
use creatorpay::handlers;
use creatorpay::models::{CreatePlan, CreateProfile, PlanInterval};

#[derive(Parser, Debug)]
#[command(name = "creatorpay")]
#[command(about = "Creator subscription platform with eSewa payments")]
struct Cli {
    /// Seed the database with dev data (creator, buyer, plan)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds the database with dev data for testing: a creator with a monthly
/// plan, and a buyer. Only runs in dev mode and when the database is empty.
fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let existing = queries::get_profile_by_username(&conn, "dev-creator")
        .expect("Failed to check for seed data");
    if existing.is_some() {
        tracing::info!("Database already has data, skipping seed");
        return;
    }

    let creator = queries::create_profile(
        &conn,
        &CreateProfile {
            username: "dev-creator".to_string(),
            phone_number: "9800000001".to_string(),
            discord_id: None,
            is_creator: true,
        },
    )
    .expect("Failed to create dev creator");

    let buyer = queries::create_profile(
        &conn,
        &CreateProfile {
            username: "dev-buyer".to_string(),
            phone_number: "9800000002".to_string(),
            discord_id: None,
            is_creator: false,
        },
    )
    .expect("Failed to create dev buyer");

    let plan = queries::create_plan(
        &conn,
        &creator.id,
        &CreatePlan {
            name: "Supporter".to_string(),
            bio: "Monthly supporter tier".to_string(),
            price: "100".parse().expect("valid price"),
            interval: PlanInterval::Monthly,
        },
    )
    .expect("Failed to create dev plan");

    tracing::info!("============================================");
    tracing::info!("DEV DATA SEEDED");
    tracing::info!("============================================");

    println!();
    println!("--- COPY FROM HERE ---");
    println!("  creator_api_key: {}", creator.api_key);
    println!("  buyer_api_key: {}", buyer.api_key);
    println!("  plan_id: {}", plan.id);
    println!("--- END COPY ---");
    println!();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "creatorpay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode (eSewa sandbox credentials)");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");

    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        base_url: config.base_url.clone(),
        esewa: config.esewa.clone(),
        success_page_url: config.success_page_url.clone(),
        failure_page_url: config.failure_page_url.clone(),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set CREATORPAY_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    let app = Router::new()
        // Public endpoints (no auth)
        .merge(handlers::public::router())
        // Gateway callback (signed payload, no auth)
        .merge(handlers::webhooks::router())
        // Profile API (bearer key auth)
        .merge(handlers::api::router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();

    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("CreatorPay server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

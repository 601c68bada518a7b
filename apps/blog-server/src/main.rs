//! # Blog Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod render;
mod state;
mod telemetry;

use config::AppConfig;
use render::Renderer;
use state::{AppState, Repositories};
use telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Create an account that may moderate comments
    CreateUser {
        username: String,

        #[arg(long, env = "BLOG_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    config.warn_insecure_defaults();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::CreateUser { username, password } => {
            create_user(config, &username, &password).await
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let renderer = match &config.template_dir {
        Some(dir) => Renderer::from_dir(dir),
        None => Renderer::embedded(),
    }
    .context("failed to load templates")?;

    let repos = Repositories::from_config(&config).await?;
    let state = AppState::new(repos, renderer, &config);

    tracing::info!("Starting blog server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}

async fn create_user(config: AppConfig, username: &str, password: &str) -> anyhow::Result<()> {
    if config.database.is_none() {
        anyhow::bail!("DATABASE_URL must be set to create a persistent user");
    }

    let repos = Repositories::from_config(&config).await?;
    let state = AppState::new(repos, Renderer::embedded()?, &config);

    let user = state.accounts.register(username, password).await?;
    tracing::info!(user_id = user.id, username = %user.username, "Created user");
    Ok(())
}

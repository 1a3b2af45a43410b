use clap::Parser;
use tracing_subscriber::EnvFilter;

use keymint::config::{Cli, Config};
use keymint::db::{AppState, queries};
use keymint::handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().with_cli(&cli);

    let default_filter = if config.dev_mode {
        "keymint=debug,tower_http=debug"
    } else {
        "keymint=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let state = AppState::open(&config.database_path)?;
    tracing::info!("Database ready at {}", config.database_path);

    if let Some(email) = &config.bootstrap_admin_email {
        let conn = state.db.get()?;
        if let Some(api_key) = queries::bootstrap_admin(&conn, email)? {
            // Shown once; the hash is all that's stored
            tracing::info!("Bootstrapped admin {} with API key: {}", email, api_key);
        }
    }

    let app = handlers::app(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!("keymint listening on http://{}", config.addr());
    axum::serve(listener, app).await?;

    Ok(())
}

use std::env;

use clap::Parser;

/// Command-line overrides for the environment-driven config.
#[derive(Debug, Parser)]
#[command(name = "keymint", about = "License management service")]
pub struct Cli {
    /// Bind address (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,
    /// Bind port (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,
    /// SQLite database path (overrides DATABASE_PATH)
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub bootstrap_admin_email: Option<String>,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("KEYMINT_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "keymint.db".to_string()),
            bootstrap_admin_email: env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            dev_mode,
        }
    }

    /// Apply CLI flags on top of the environment config.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(db) = &cli.database {
            self.database_path = db.clone();
        }
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

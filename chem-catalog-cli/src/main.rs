use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chem_catalog_core::{CatalogConfig, CatalogHttpClient, SessionStore};

mod commands;

use commands::ProductArgs;

/// Admin client for the chemical product catalog service.
#[derive(Parser, Debug)]
#[command(name = "chem-catalog", version)]
struct Cli {
    /// Configuration file (defaults to ./chem-catalog.toml or $CHEM_CATALOG_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the service base URL
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all products.
    List {
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },
    /// List product categories.
    Categories,
    /// List the sub-categories of a category.
    SubCategories { category: String },
    /// Add a product.
    Add(ProductArgs),
    /// Update a product; only the given fields change.
    Update {
        id: String,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product.
    Delete { id: String },
    /// Manage the stored bearer token.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand, Debug)]
enum SessionAction {
    /// Store a bearer token for later calls.
    SetToken { token: String },
    /// Forget the stored token.
    Clear,
    /// Show the stored token (masked) and where it lives.
    Show,
}

fn load_config(cli: &Cli) -> Result<CatalogConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = CatalogConfig::load_from_file(path)
                .with_context(|| format!("reading {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => CatalogConfig::load().context("loading configuration")?,
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    debug!("using catalog service at {}", config.api.base_url);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Commands::Session { action } = &cli.command {
        let session = SessionStore::open(config.session_path());
        return match action {
            SessionAction::SetToken { token } => commands::session_set(&session, token, &mut out),
            SessionAction::Clear => commands::session_clear(&session, &mut out),
            SessionAction::Show => commands::session_show(&session, &mut out),
        };
    }

    let client = CatalogHttpClient::from_config(&config).context("building catalog client")?;
    match &cli.command {
        Commands::List { json } => commands::list(&client, *json, &mut out).await?,
        Commands::Categories => commands::categories(&client, &mut out).await?,
        Commands::SubCategories { category } => commands::sub_categories(&client, category, &mut out).await?,
        Commands::Add(fields) => commands::add(&client, fields, &mut out).await?,
        Commands::Update { id, fields } => commands::update(&client, id, fields, &mut out).await?,
        Commands::Delete { id } => commands::delete(&client, id, &mut out).await?,
        Commands::Session { .. } => {}
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_takes_optional_overrides() {
        let cli = Cli::try_parse_from(["chem-catalog", "update", "6650a1", "--cas", "64-17-5"]).unwrap();
        match cli.command {
            Commands::Update { id, fields } => {
                assert_eq!(id, "6650a1");
                assert_eq!(fields.cas.as_deref(), Some("64-17-5"));
                assert!(fields.name.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sub_category_flag_is_kebab_case() {
        let cli = Cli::try_parse_from([
            "chem-catalog",
            "add",
            "--category",
            "Solvents",
            "--sub-category",
            "Ketones",
            "--sds",
            "acetone.pdf",
        ])
        .unwrap();
        match cli.command {
            Commands::Add(fields) => {
                assert_eq!(fields.sub_category.as_deref(), Some("Ketones"));
                assert_eq!(fields.sds, Some(PathBuf::from("acetone.pdf")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_api_url_overrides_config() {
        let cli = Cli::try_parse_from(["chem-catalog", "list", "--api-url", "http://catalog.test/"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.api.base_url, "http://catalog.test");
    }
}

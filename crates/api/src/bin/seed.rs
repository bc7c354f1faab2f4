//! Bulk fixture loader: `devcamper-seed -i` imports, `devcamper-seed -d` deletes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};
use tracing::info;

use devcamper_api::config::AppConfig;
use devcamper_api::app::load_geocoder;
use devcamper_infra::{PostgresDocumentStore, Services, fixtures};

#[derive(Debug, Parser)]
#[command(name = "devcamper-seed", about = "Import or delete fixture data")]
#[command(group(ArgGroup::new("action").required(true).args(["import", "delete"])))]
struct Cli {
    /// Insert every fixture file found in the data directory
    #[arg(short = 'i', long)]
    import: bool,

    /// Remove every record of every collection
    #[arg(short = 'd', long)]
    delete: bool,

    /// Directory holding bootcamps.json, courses.json, users.json and reviews.json
    #[arg(long, default_value = "_data")]
    data_dir: PathBuf,

    /// YAML config file (defaults to DEVCAMPER_CONFIG or config/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_layered(path)?,
        None => AppConfig::load()?,
    };
    devcamper_observability::init(config.environment.log_format());

    let Some(url) = config.database_url.as_deref() else {
        bail!("database_url must be set to seed a database (DEVCAMPER_DATABASE_URL)");
    };
    let store = PostgresDocumentStore::connect(url)
        .await
        .context("Failed to connect to Postgres")?;

    if cli.import {
        let geocoder = load_geocoder(&config)?;
        let services = Services::new(Arc::new(store), geocoder.clone());
        services.ensure_indexes().await.context("Failed to create unique indexes")?;
        let inserted = fixtures::import(services.store().as_ref(), geocoder.as_ref(), &cli.data_dir)
            .await
            .with_context(|| format!("Failed to import fixtures from {}", cli.data_dir.display()))?;
        info!(inserted, "data imported");
    } else {
        let removed = fixtures::destroy(&store).await.context("Failed to delete data")?;
        info!(removed, "data destroyed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exactly_one_action_is_required() {
        assert!(Cli::try_parse_from(["devcamper-seed"]).is_err());
        assert!(Cli::try_parse_from(["devcamper-seed", "-i", "-d"]).is_err());

        let cli = Cli::try_parse_from(["devcamper-seed", "-i"]).unwrap();
        assert!(cli.import);
        assert_eq!(cli.data_dir, PathBuf::from("_data"));

        let cli = Cli::try_parse_from(["devcamper-seed", "-d", "--data-dir", "fixtures"]).unwrap();
        assert!(cli.delete);
        assert_eq!(cli.data_dir, PathBuf::from("fixtures"));
    }
}

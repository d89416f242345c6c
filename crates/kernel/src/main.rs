//! Listing page CLI.
//!
//! Renders listing pages from a YAML site fixture, or from PostgreSQL with
//! the fixture supplying only the content types.
//!
//! Usage:
//!   listing render --site site.yaml --page 10 --query "page10=1"
//!   listing fields --site site.yaml Article
//!   listing check --site site.yaml

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use listing_kernel::admin::ListingAdmin;
use listing_kernel::config::Config;
use listing_kernel::content::TypeRegistry;
use listing_kernel::listing::{ListingService, Viewer};
use listing_kernel::store::{ContentStore, ListingPageStore, PgContentStore, SiteFixture};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serve content from DATABASE_URL instead of the fixture.
    #[arg(long, global = true)]
    postgres: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a listing page body.
    Render {
        /// Site fixture (YAML).
        #[arg(long)]
        site: PathBuf,

        /// Listing page ID.
        #[arg(long)]
        page: i64,

        /// Request query string, e.g. "page10=2".
        #[arg(long, default_value = "")]
        query: String,

        /// Render as an administrator.
        #[arg(long)]
        admin: bool,
    },

    /// Print the sortable fields of a content type.
    Fields {
        /// Site fixture (YAML).
        #[arg(long)]
        site: PathBuf,

        /// Content type name.
        type_name: String,
    },

    /// Validate every stored listing page.
    Check {
        /// Site fixture (YAML).
        #[arg(long)]
        site: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    let args = Args::parse();

    match args.command {
        Command::Render {
            site,
            page,
            query,
            admin,
        } => {
            let fixture = SiteFixture::load(&site)?;
            let registry = fixture.registry()?;
            let (content, pages) = open_stores(&config, &fixture, args.postgres).await?;

            let service = ListingService::new(content, pages, registry, config.listing.clone());
            let viewer = if admin {
                Viewer::admin(1)
            } else {
                Viewer::anonymous()
            };

            match service.render_page(page, &viewer, &query).await? {
                Some(body) => println!("{body}"),
                None => anyhow::bail!("no listing page with id {page}"),
            }
        }
        Command::Fields { site, type_name } => {
            let registry = SiteFixture::load(&site)?.registry()?;
            print_fields(&registry, &type_name);
        }
        Command::Check { site } => {
            let fixture = SiteFixture::load(&site)?;
            let registry = fixture.registry()?;
            let (_, pages) = open_stores(&config, &fixture, args.postgres).await?;

            let stored = pages.list_pages().await?;
            let admin = ListingAdmin::new(
                pages,
                registry,
                config.listing.clone(),
                config.max_depth,
            );

            let mut failures = 0;
            for page in &stored {
                match admin.validate(page).await {
                    Ok(()) => info!(page_id = page.id(), "listing page ok"),
                    Err(e) if e.is_configuration() => {
                        warn!(page_id = page.id(), error = %e, "listing page invalid");
                        failures += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            if failures > 0 {
                anyhow::bail!("{failures} listing page(s) failed validation");
            }
        }
    }

    Ok(())
}

/// Pick the content backend: the fixture's memory store, or PostgreSQL.
async fn open_stores(
    config: &Config,
    fixture: &SiteFixture,
    postgres: bool,
) -> Result<(Arc<dyn ContentStore>, Arc<dyn ListingPageStore>)> {
    if postgres {
        let url = config
            .database_url
            .as_deref()
            .context("--postgres requires DATABASE_URL")?;
        let store = Arc::new(PgContentStore::connect(url, config.database_max_connections).await?);
        info!("serving content from PostgreSQL");
        let content: Arc<dyn ContentStore> = store.clone();
        let pages: Arc<dyn ListingPageStore> = store;
        return Ok((content, pages));
    }

    let store = Arc::new(fixture.to_store());
    let content: Arc<dyn ContentStore> = store.clone();
    let pages: Arc<dyn ListingPageStore> = store;
    Ok((content, pages))
}

fn print_fields(registry: &TypeRegistry, type_name: &str) {
    if !registry.exists(type_name) {
        warn!(type_name, "unknown content type, showing metadata fields only");
    }
    for field in registry.selectable_fields(type_name) {
        println!("{field}");
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

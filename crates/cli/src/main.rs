//! RocketShoes CLI - drive the cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! rs-cart show
//!
//! # Add a product, checking live stock
//! rs-cart add 1
//!
//! # Set a quantity (0 or less is ignored)
//! rs-cart update 1 3
//!
//! # Remove a product
//! rs-cart remove 1
//!
//! # Any command can print JSON instead of a table
//! rs-cart --json show
//! ```
//!
//! Configuration comes from the environment (see
//! `rocketshoes_storefront::config`). Failed operations print their
//! notification to stderr and exit with status 1.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;
use rocketshoes_storefront::config::StorefrontConfig;
use rocketshoes_storefront::notify::ChannelNotifier;
use rocketshoes_storefront::state::{StateError, Storefront};
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::Action;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    /// Print the cart and notifications as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

impl From<Commands> for Action {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show => Self::Show,
            Commands::Add { product_id } => Self::Add(product_id),
            Commands::Remove { product_id } => Self::Remove(product_id),
            Commands::Update { product_id, amount } => Self::Update(product_id, amount),
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("{0} cart operation(s) reported an error")]
    Notified(usize),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(std::io::stderr(), "Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_storefront=info,rs_cart=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Notified(count)) => {
            tracing::debug!(count, "Cart operation reported failures");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let (notifier, mut notifications) = ChannelNotifier::new();
    let storefront = Storefront::new(config, notifier).await?;

    commands::cart::run(&storefront, cli.command.into()).await;

    let raised: Vec<_> = std::iter::from_fn(|| notifications.try_recv().ok()).collect();
    let cart = storefront.cart().cart();

    let mut out = std::io::stdout().lock();
    if cli.json {
        commands::cart::write_json(&mut out, &cart, &raised)?;
    } else {
        let mut err = std::io::stderr().lock();
        for notification in &raised {
            writeln!(err, "error: {}", notification.message)?;
        }
        commands::cart::write_table(&mut out, &cart)?;
    }
    out.flush()?;

    if raised.is_empty() {
        Ok(())
    } else {
        Err(CliError::Notified(raised.len()))
    }
}

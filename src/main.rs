//! Protocol Bridge
//!
//! Loads the bridge configuration and every legacy block palette, builds the
//! translation engine and reports what each supported revision resolves to.
//! Exits non-zero when any table fails to load, so it doubles as a startup
//! check for deployments that embed the library.

use std::env;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use protocol_bridge::config::BridgeConfig;
use protocol_bridge::protocol::ProtocolRevision;
use protocol_bridge::translate::PaletteDirectory;
use protocol_bridge::{TranslationEngine, VERSION};

/// Filter used when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info,protocol_bridge=debug";

/// Filter used when `RUST_LOG` is unset and the config enables debug
const DEBUG_FILTER: &str = "debug,protocol_bridge=trace";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging before anything can warn
    let filter_handle = init_logging();

    info!("╔══════════════════════════════════════════════╗");
    info!("║          Protocol Bridge v{}                 ║", VERSION);
    info!("║       Canonical revision: {}                ║", ProtocolRevision::CANONICAL);
    info!("╚══════════════════════════════════════════════╝");

    // Load configuration
    let config = BridgeConfig::load().await?;
    if config.config_path.exists() {
        info!(
            "Configuration loaded from: {}",
            config.config_path.display()
        );
    } else {
        info!("Running with default configuration");
    }

    if apply_debug_level(&filter_handle, config.debug, env::var_os("RUST_LOG").is_some())? {
        info!("Debug logging enabled by configuration");
    }

    let palettes = PaletteDirectory::new(&config.palette_path);
    info!("Loading block palettes from: {}", palettes.root().display());

    let engine = TranslationEngine::from_config(&config, &palettes)
        .context("Failed to build translation engine")?;

    for revision in engine.registry().supported() {
        let name = revision.name().unwrap_or("unknown");
        if engine.registry().is_current(revision) {
            info!("Revision {} ({}): current, no translation", revision, name);
            continue;
        }

        let mapping = engine
            .translator()
            .mapping(revision)
            .with_context(|| format!("No block state mapping for revision {}", revision))?;
        info!(
            "Revision {} ({}): legacy, {} block states",
            revision,
            name,
            mapping.len()
        );
    }

    info!(
        "Translation engine ready: {} overrides, {} rewrite rules, max packet size {} bytes",
        engine.overrides().len(),
        engine.rules().len(),
        engine.max_packet_size()
    );

    Ok(())
}

/// Initialize the logging system. The returned handle lets the filter be
/// raised once the configuration is known.
fn init_logging() -> FilterHandle {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true),
        )
        .init();

    handle
}

/// Switch to the debug filter when the config asks for it. An explicit
/// `RUST_LOG` always wins. Returns whether the filter changed.
fn apply_debug_level(handle: &FilterHandle, debug: bool, env_filter_set: bool) -> Result<bool> {
    if !debug || env_filter_set {
        return Ok(false);
    }
    handle
        .reload(EnvFilter::new(DEBUG_FILTER))
        .context("Failed to raise log level")?;
    Ok(true)
}

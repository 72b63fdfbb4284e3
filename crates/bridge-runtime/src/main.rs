//! # Token Bridge Runtime
//!
//! Runs one popup/opener token exchange in process and exits non-zero if the
//! tokens did not make it across.
//!
//! Configuration comes from `TB_CONFIG` (a TOML file), `TB_SENDER_ORIGIN` and
//! `TB_DEBUG`; logging from `TB_LOG_LEVEL`/`RUST_LOG` and `TB_JSON_LOGS`.

use anyhow::{bail, Context, Result};
use bridge_runtime::{run_demo, DemoSettings, DEFAULT_OPENER_ORIGIN};
use bridge_telemetry::{init_tracing, TelemetryConfig};
use tb_01_token_bridge::{BridgeConfig, TomlConfigLoader};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration
    let config = TomlConfigLoader::from_env(BridgeConfig::new(DEFAULT_OPENER_ORIGIN))
        .context("Failed to load bridge configuration")?;

    // Initialize logging
    let telemetry = TelemetryConfig::from_env().with_debug(config.debug);
    init_tracing(&telemetry).context("Failed to initialize tracing")?;

    info!(
        version = tb_01_token_bridge::VERSION,
        sender_origin = %config.sender_origin,
        "Token bridge runtime starting"
    );

    let outcome = run_demo(DemoSettings::new(config)).await?;
    if !outcome.is_complete() {
        bail!(
            "Token exchange incomplete (popup: {}, opener: {})",
            outcome.popup_state,
            outcome.opener_state
        );
    }

    info!("Token exchange complete");
    Ok(())
}

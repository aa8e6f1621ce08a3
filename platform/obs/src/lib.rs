use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: OnceCell<()> = OnceCell::new();

/// Configuration for tracing initialization.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "deal-tracker-server",
            env_filter: None,
        }
    }
}

/// Install the tracing subscriber. Safe to call more than once; only
/// the first call wins.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let filter = config
        .env_filter
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info,tower_http=warn".to_string());

    let env_filter = EnvFilter::try_new(filter)?;
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    INIT.set(()).ok();
    tracing::debug!(service = config.service_name, "tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_noop() {
        init_tracing(ObsConfig::default()).unwrap();
        init_tracing(ObsConfig::default()).unwrap();
    }
}

use anyhow::Result;
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber and bridges `log` records into
/// it. Call once, before any database work.
pub fn init_tracing() -> Result<()> {
    LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_ansi(true)
        .with_thread_names(true);

    let subscriber = tracing_subscriber::registry::Registry::default()
        .with(filter)
        .with(fmt_layer);

    set_global_default(subscriber)?;

    Ok(())
}

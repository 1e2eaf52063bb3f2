//! Logging setup for the command line tool

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `RUST_LOG` wins over the verbosity flag
fn build_env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_for(verbosity);
        EnvFilter::new(format!(
            "ferrum_profile={level},ferrum_profile_tree={level},ferrum_context={level}"
        ))
    })
}

/// Log to stderr so stdout stays clean for the rendered tree
pub fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(build_env_filter(verbosity))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

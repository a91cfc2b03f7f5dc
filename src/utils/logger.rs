use tracing_subscriber::filter::{Directive, EnvFilter};
use tracing_subscriber::fmt::format;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;

/// Environment variable overriding the default log level
pub const LOG_ENV_VAR: &str = "ZONECREATOR_LOG";

/// Custom logger initialization to exclude timestamps but keep colors.
///
/// Use ZONECREATOR_LOG=info or ZONECREATOR_LOG=debug to increase verbosity.
/// Example: ZONECREATOR_LOG=debug zonecreator convert < zone.lua
pub fn init_custom_logger(debug: bool) {
    // Empty time formatter that doesn't print anything
    struct EmptyTime;
    impl FormatTime for EmptyTime {
        fn format_time(&self, _: &mut format::Writer<'_>) -> std::fmt::Result {
            Ok(())
        }
    }

    let format = format()
        .with_timer(EmptyTime)
        .with_level(true)
        .with_target(true)
        .with_ansi(true);

    let filter = EnvFilter::from_default_env().add_directive(default_directive(
        std::env::var(LOG_ENV_VAR).ok().as_deref(),
        debug,
    ));

    // Logging to stderr keeps stdout clean for the command output
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .try_init();
    if installed.is_err() {
        eprintln!("A global logger was already installed; keeping it");
    }
}

/// Level directive for the crate: `--debug` wins, then the environment
/// variable, then `warn` for minimal noise. Unparseable values fall back to
/// `warn`.
pub fn default_directive(env_value: Option<&str>, debug: bool) -> Directive {
    let warn = || Directive::from(tracing_subscriber::filter::LevelFilter::WARN);
    if debug {
        return Directive::from(tracing_subscriber::filter::LevelFilter::DEBUG);
    }
    env_value
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or_else(warn)
}

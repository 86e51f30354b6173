// ============================================================================
// bitrate-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger Initialisation for the CLI
//
// The core library logs through the `log` facade. The CLI installs an
// env_logger backend writing to stderr, so stdout only ever carries the
// bitrate report:
// - default: warnings and errors (absorbed fallbacks show up as warnings)
// - --verbose: debug output, including every ffmpeg/ffprobe invocation
// - RUST_LOG overrides both

use console::style;
use log::LevelFilter;
use std::io::Write;

/// Initialises the global logger. Safe to call once per process.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let level = match record.level() {
                log::Level::Error => style("ERROR").red().bold(),
                log::Level::Warn => style("WARN ").yellow(),
                log::Level::Info => style("INFO ").green(),
                log::Level::Debug => style("DEBUG").blue(),
                log::Level::Trace => style("TRACE").magenta(),
            };
            writeln!(
                buf,
                "{} {} {}",
                style(buf.timestamp()).dim(),
                level,
                record.args()
            )
        })
        .init();

    log::debug!("Logger initialized with level: {}", level);
}

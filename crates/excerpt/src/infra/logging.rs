//! Tracing subscriber setup.

use tracing::Level;

/// Install the global fmt subscriber, writing to stderr so command output stays parseable.
///
/// Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

use tracing::Level;

/// Install the stdout log subscriber.
///
/// Debug builds log at `DEBUG`, release builds at `INFO`. Safe to call more
/// than once; later calls are no-ops.
pub fn init() {
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true)
        .try_init();
}

//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// arbor::core::logging::init();
/// log::info!("Generating trees");
/// ```
pub fn init() {
    // A logger may already be installed (doctests, benches)
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}

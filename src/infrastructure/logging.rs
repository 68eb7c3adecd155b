use tracing_subscriber::EnvFilter;

/// Maps the `-v` count to a filter directive
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs a stderr subscriber so stdout stays reserved for the result.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::new(format!("appcall={}", level_for(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Replaces the default panic hook so a panicking application does not
/// write its message and backtrace note to stderr.
///
/// The panic is still caught and reported as a dispatch error; the details
/// are only visible at debug level.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "panic captured");
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn repeated_init_is_harmless() {
        init(0);
        init(3);
    }

    #[test]
    fn panic_hook_still_lets_panics_be_caught() {
        fn fail() {
            panic!("quiet");
        }

        install_panic_hook();
        let caught = std::panic::catch_unwind(fail);
        let _ = std::panic::take_hook();
        assert!(caught.is_err());
    }
}

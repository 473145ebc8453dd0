use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "sadc_agro=info,_core=info";

/// Install a `fmt` subscriber filtered by `filter`, then `RUST_LOG`, then the default.
///
/// Returns `false` when a global subscriber is already installed.
pub fn init_logging(filter: Option<&str>) -> bool {
    let env_filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_refused() {
        let _ = init_logging(Some("debug"));
        assert!(!init_logging(None));
    }
}

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_DIRECTIVE: &str = "perk_tracker=info";

/// Installs the global fmt subscriber once.
///
/// `RUST_LOG` is honoured first; `directive` (or [`DEFAULT_LOG_DIRECTIVE`]) is added on top.
pub fn init_tracing(directive: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        for raw in [Some(DEFAULT_LOG_DIRECTIVE), directive].into_iter().flatten() {
            match raw.parse::<Directive>() {
                Ok(parsed) => filter = filter.add_directive(parsed),
                Err(err) => eprintln!("ignoring log filter `{raw}`: {err}"),
            }
        }
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

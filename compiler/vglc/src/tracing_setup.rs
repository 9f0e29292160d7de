//! Logging initialisation.
//!
//! Filtering follows `VGL_LOG`, then `RUST_LOG`. Setting `VGL_LOG_TREE`
//! switches from flat lines to an indented span tree, which reads better when
//! following nested calls through the VM:
//!
//! ```text
//! VGL_LOG=vglc=debug,vgl_vm=trace VGL_LOG_TREE=1 <host>
//! ```

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber if a log variable is set. Later calls do
/// nothing.
pub fn init_tracing() {
    init_tracing_with_default(None);
}

/// Like [`init_tracing`], falling back to `default` (a filter directive such
/// as `"vglc=debug"`) when no log variable is set.
pub fn init_tracing_with_default(default: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let directives = std::env::var("VGL_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .or_else(|| default.map(str::to_string));
        let Some(directives) = directives else {
            return;
        };
        let filter = EnvFilter::new(directives);
        let registry = tracing_subscriber::registry().with(filter);

        // Another subscriber may already be installed by an embedding host.
        let _ = if std::env::var_os("VGL_LOG_TREE").is_some() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true))
                .try_init()
        };
    });
}

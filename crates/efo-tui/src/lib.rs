//! efo-explorer TUI — ratatui application shell.

pub mod app;
pub mod commands;
pub mod event;
pub mod theme;
pub mod widgets;

use std::sync::Arc;

use efo_core::{config::Config, OntologyLookup};

pub use app::App;

/// Start the TUI over `client`. Must be called inside a tokio runtime
/// context; the loop itself runs on the calling thread.
pub fn run(config: Config, client: Arc<dyn OntologyLookup>) -> anyhow::Result<()> {
    let theme = theme::Theme::by_name(&config.ui.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.ui.theme, "unknown theme, using default");
        theme::Theme::load_default()
    });
    App::new(config, theme, client).run()
}

// Rewrite practice entry point.
//
// Startup sequence:
// 1. Load config
// 2. Initialize tracing (log to file, not terminal)
// 3. Open the sentence store
// 4. Build the session and orchestrator
// 5. Run the TUI event loop (blocking until the user quits)

use std::path::Path;

use anyhow::Context;
use tracing::info;

use rewrite_practice::app::App;
use rewrite_practice::config;
use rewrite_practice::db::Store;
use rewrite_practice::session::Session;
use rewrite_practice::tui;

fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing (log to file, not terminal)
    init_tracing(&config.log_dir)?;
    info!("rewrite practice starting up");
    info!("database at {}", config.db_path);

    // 3. Open the sentence store. The data directory may not exist yet on a
    //    first run with the platform-default path.
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create data directory {}", parent.display())
            })?;
        }
    }
    let store = Store::open(&config.db_path).context("failed to open the practice database")?;

    // 4. Build the session and orchestrator
    let session = Session::new(store);
    let mut app = App::new(session).context("failed to load initial session state")?;

    // 5. Run the TUI event loop (blocking until the user quits)
    tui::run(&mut app)?;

    info!("rewrite practice shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by
/// the TUI).
fn init_tracing(log_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_file = std::fs::File::create(log_dir.join("rescribe.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rewrite_practice=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

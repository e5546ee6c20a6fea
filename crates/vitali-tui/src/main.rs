// Vitali entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open the local store and load tracked data for today
// 4. Build the LLM advisor
// 5. Create mpsc channels
// 6. Spawn app logic task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use vitali_app::app;
use vitali_core::config;
use vitali_core::store::Store;
use vitali_llm::advisor::Advisor;
use vitali_tui::tui;

use anyhow::Context;
use chrono::Local;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Vitali starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: model={}, store={}",
        config.llm.model,
        config.db_path.display()
    );

    // 3. Open the store and load today's tracker
    let store = Store::open(&config.db_path).context("failed to open database")?;
    let today = Local::now().date_naive();
    let tracker = store
        .load_tracker(today)
        .context("failed to load tracked data")?;
    info!(
        "Loaded {} exercises, {} journal entries, {} shopping items",
        tracker.exercises.len(),
        tracker.journal.len(),
        tracker.shopping.len()
    );

    // 4. Build the advisor from config
    let advisor = Advisor::from_config(&config);
    if advisor.is_enabled() {
        info!("LLM client initialized (API key configured)");
    } else {
        info!("LLM client disabled (no API key)");
    }

    // 5. Create mpsc channels
    let (llm_tx, llm_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(config, tracker, store, advisor, llm_tx);

    // 6. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(llm_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. The TUI consumes ui_rx and sends commands through cmd_tx.
    // It blocks until the user confirms quit or presses Ctrl+C.
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 8. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Vitali shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("vitali.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("vitali_core=info,vitali_llm=info,vitali_app=info,vitali_tui=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

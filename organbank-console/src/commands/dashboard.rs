//! Live organ bank dashboard.

use crate::app::App;
use crate::render;
use crate::shutdown::shutdown_signal;
use organbank_core::processors::{ReconciliationView, RefreshTrigger};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Render the bank view on every change until a shutdown signal arrives.
///
/// Typing `r` + Enter forces a refresh of both lists; `q` quits.
pub async fn run(app: &App) -> anyhow::Result<()> {
    app.registry.initialize().await;
    let registry_link = app.registry.attach(&app.bus);

    let view = ReconciliationView::new(Arc::clone(&app.gateway))
        .with_poll_interval(app.settings.poll_interval)
        .activate(&app.bus);
    tracing::info!(
        poll_interval = ?app.settings.poll_interval,
        "Dashboard active, press r to refresh or q to quit"
    );

    let mut bank = view.subscribe();
    let mut organs = app.registry.subscribe();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            line = input.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match line.trim() {
                    "q" | "quit" => break,
                    "r" | "refresh" => {
                        if !view.refresh_now(RefreshTrigger::All) {
                            tracing::debug!("Refresh already pending");
                        }
                        continue;
                    }
                    _ => continue,
                },
                // Detached from a terminal: only signals stop the loop.
                Ok(None) => {
                    stdin_open = false;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read input");
                    continue;
                }
            },
            changed = bank.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = organs.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let text = render::dashboard(&bank.borrow(), &organs.borrow());
        println!("{text}");
    }

    tracing::info!("Deactivating dashboard");
    registry_link.unsubscribe();
    view.deactivate().await;
    Ok(())
}

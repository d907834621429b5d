//! Local change watcher
//!
//! Subscribes to filesystem notifications for the local file and logs each
//! one. With `WatchAction::LogAndResync` every modify event additionally
//! pushes the file to the remote end. Each push establishes its own session;
//! a failed push is logged and the watch keeps running, since watching is
//! the long-running mode. Watch mode is push-only.

use std::sync::mpsc;

use color_eyre::Result;
use notify::{RecursiveMode, Watcher};
use tracing::{debug, error, info};

use sftpsync_core::{ConnectConfig, Direction, FileSpec, WatchAction};

/// Watch the local file until the notification channel closes.
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be
/// watched.
pub async fn watch(config: &ConnectConfig, spec: &FileSpec, action: WatchAction) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(&spec.local, RecursiveMode::NonRecursive)?;

    info!(
        "watching {} for changes (Ctrl+C to stop)...",
        spec.local.display()
    );

    loop {
        match rx.recv() {
            Ok(Ok(event)) => {
                info!("event: {event:?}");
                if event.kind.is_modify() && action == WatchAction::LogAndResync {
                    match sftpsync_transport::sync_file(config, spec, Direction::Push).await {
                        Ok(bytes) => info!("re-synced {bytes} bytes to {:?}", spec.remote),
                        Err(e) => error!("re-sync failed: {e:#}"),
                    }
                }
            }
            Ok(Err(e)) => error!("watch error: {e}"),
            Err(e) => {
                debug!("watch channel closed: {e}");
                return Ok(());
            }
        }
    }
}

/*!
 * Decay Task - Autonomous Usage Aging
 *
 * Background task that drives the decay engine at 1 Hz, the housekeeping
 * cadence the priority model assumes. Uses the graceful-with-fallback
 * shutdown pattern: `shutdown().await` is the clean path, and Drop aborts
 * the task (with a warning) when shutdown was never called.
 */

use super::Scheduler;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Control messages for the decay task
#[derive(Debug, Clone)]
pub enum DecayCommand {
    /// Pause the periodic pass
    Pause,
    /// Resume the periodic pass
    Resume,
    /// Run one pass immediately
    Trigger,
    /// Shut the task down
    Shutdown,
}

/// Handle to the decay background task
pub struct DecayTask {
    command_tx: mpsc::UnboundedSender<DecayCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
    /// Tracks whether graceful shutdown was initiated (lock-free)
    shutdown_initiated: Arc<AtomicBool>,
}

impl DecayTask {
    /// Spawn the decay task against a shared scheduler
    pub fn spawn(scheduler: Arc<Scheduler>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let shutdown_initiated = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(async move {
            run_decay_loop(scheduler, command_rx).await;
        });
        info!("decay task spawned (1 Hz)");

        Self {
            command_tx,
            handle: Some(handle),
            shutdown_initiated,
        }
    }

    /// Pause periodic decay (manual `schedcpu` calls still work)
    pub fn pause(&self) {
        let _ = self.command_tx.send(DecayCommand::Pause);
    }

    /// Resume periodic decay
    pub fn resume(&self) {
        let _ = self.command_tx.send(DecayCommand::Resume);
    }

    /// Run one decay pass now
    pub fn trigger(&self) {
        let _ = self.command_tx.send(DecayCommand::Trigger);
    }

    /// Shut the task down gracefully; consumes self so a handle cannot be
    /// used after shutdown
    pub async fn shutdown(mut self) {
        self.shutdown_initiated.store(true, Ordering::SeqCst);
        let _ = self.command_tx.send(DecayCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("decay task shutdown error: {}", e);
            } else {
                info!("decay task shutdown complete");
            }
        }
    }
}

async fn run_decay_loop(
    scheduler: Arc<Scheduler>,
    mut command_rx: mpsc::UnboundedReceiver<DecayCommand>,
) {
    let mut active = true;
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if active {
                    scheduler.schedcpu();
                }
            }
            Some(cmd) = command_rx.recv() => {
                match cmd {
                    DecayCommand::Pause => {
                        info!("decay task paused");
                        active = false;
                    }
                    DecayCommand::Resume => {
                        info!("decay task resumed");
                        active = true;
                    }
                    DecayCommand::Trigger => {
                        scheduler.schedcpu();
                    }
                    DecayCommand::Shutdown => {
                        info!("decay task shutting down");
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for DecayTask {
    fn drop(&mut self) {
        if self.shutdown_initiated.load(Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.handle.take() {
            warn!("DecayTask dropped without shutdown() - aborting task");
            handle.abort();
        }
    }
}

//! Shutdown Coordination
//!
//! Turns external interrupts into a shared, cooperative cancellation signal.
//! The signal is advisory: the feeder, the workers and the committer check it
//! at their safe points and wind down on their own; nothing is torn down
//! preemptively.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Exit status used when the process stops because of a signal
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Cloneable read/trigger handle for the shared cancellation state
#[derive(Clone, Debug)]
pub struct CancellationSignal {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
}

impl CancellationSignal {
    fn new() -> Self {
        // Use a larger channel to avoid dropping bursts of shutdown signals
        let (shutdown_tx, _) = broadcast::channel(8);
        Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation; idempotent
    pub fn trigger(&self) {
        // Release pairs with the Acquire load in is_cancelled()
        self.shutdown_requested.store(true, Ordering::Release);
        let _ = self.shutdown_tx.send(());
    }

    /// Check if cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Resolve once cancellation has been requested
    ///
    /// Subscribes before checking the flag so a trigger racing with this call
    /// is never missed. A lagged receiver is treated as cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.shutdown_tx.subscribe();
        if self.is_cancelled() {
            return;
        }
        let _ = rx.recv().await;
    }
}

/// Coordinates graceful shutdown across the application
pub struct ShutdownCoordinator {
    signal: CancellationSignal,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> Self {
        Self {
            signal: CancellationSignal::new(),
        }
    }

    /// A handle to hand to the feeder, workers and committer
    pub fn signal(&self) -> CancellationSignal {
        self.signal.clone()
    }

    /// Trigger shutdown
    pub fn trigger_shutdown(&self) {
        self.signal.trigger();
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.signal.is_cancelled()
    }

    /// Listen for process signals and flip the cancellation signal on the first one
    pub fn install_signal_handlers(&self) {
        setup_signal_handlers(self.signal.clone());
    }

    /// Guard execution of a future with shutdown coordination
    ///
    /// Sets up signal handlers and hands the closure the cancellation signal,
    /// making it appear as if the closure is "guarded" by shutdown coordination.
    pub async fn guard<F, Fut, R>(future_fn: F) -> R
    where
        F: FnOnce(CancellationSignal) -> Fut,
        Fut: std::future::Future<Output = R>,
    {
        let coordinator = Self::new();
        coordinator.install_signal_handlers();
        future_fn(coordinator.signal()).await
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Set up signal handlers for graceful shutdown
fn setup_signal_handlers(signal: CancellationSignal) {
    #[cfg(unix)]
    {
        // Writing a summary into a closed pipe should terminate quietly
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use std::sync::atomic::AtomicUsize;
        use tokio::signal::unix::{signal as unix_signal, SignalKind};
        let signal_count = Arc::new(AtomicUsize::new(0));
        let kinds = [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ];

        for kind in kinds {
            let signal = signal.clone();
            let sig_ctr = signal_count.clone();

            tokio::spawn(async move {
                if let Ok(mut sig) = unix_signal(kind) {
                    while sig.recv().await.is_some() {
                        let prev = sig_ctr.fetch_add(1, Ordering::AcqRel);
                        if prev >= 1 {
                            log::warn!("Second interrupt received; exiting immediately");
                            std::process::exit(INTERRUPTED_EXIT_CODE);
                        }
                        log::warn!("Interrupt received, shutting down (repeat to force exit)");
                        signal.trigger();
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            let mut received = 0usize;
            while tokio::signal::ctrl_c().await.is_ok() {
                received += 1;
                if received > 1 {
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
                log::warn!("Ctrl-C received, shutting down (repeat to force exit)");
                signal.trigger();
            }
        });
    }
}

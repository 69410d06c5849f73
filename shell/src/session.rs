use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// State shared by every actor of one shell session.
///
/// `running` goes from `true` to `false` exactly once, in [`shutdown`]. The
/// shutdown channel never carries a message: dropping its only sender wakes
/// every actor blocked in a `select!` on [`shutdown_signal`].
///
/// [`shutdown`]: SessionState::shutdown
/// [`shutdown_signal`]: SessionState::shutdown_signal
#[derive(Debug)]
pub struct SessionState {
    running: AtomicBool,
    interrupted: Arc<AtomicBool>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,
}

impl SessionState {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = bounded(0);
        Arc::new(Self {
            running: AtomicBool::new(true),
            interrupted: Arc::new(AtomicBool::new(false)),
            shutdown_tx: Mutex::new(Some(tx)),
            shutdown_rx: rx,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ends the session. Returns `false` if it had already ended.
    pub fn shutdown(&self) -> bool {
        if !self.running.swap(false, Ordering::AcqRel) {
            return false;
        }
        let sender = match self.shutdown_tx.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(sender);
        true
    }

    /// A receiver that becomes ready (disconnected) once the session ends.
    pub fn shutdown_signal(&self) -> Receiver<()> {
        self.shutdown_rx.clone()
    }

    /// Asks the dispatch loop to end the session as if interrupted.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }

    /// The flag behind [`interrupt`](Self::interrupt), for registering with
    /// an OS signal handler.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }
}

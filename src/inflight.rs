use std::future::Future;
use std::pin::pin;

use futures::future::{self, Either};
use futures_channel::oneshot;
use leptos::logging::log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aborted;

/// Admits at most one request at a time and keeps the abort handle of the
/// active one.
#[derive(Debug, Default)]
pub struct RequestSlot {
    next_id: u64,
    active: Option<(u64, oneshot::Sender<()>)>,
}

/// Handed to the task that performs the request.
#[derive(Debug)]
pub struct RequestToken {
    id: u64,
    cancel: oneshot::Receiver<()>,
}

impl RequestSlot {
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// `None` while another request is active. Concurrent requests are rejected, not queued.
    pub fn try_begin(&mut self) -> Option<RequestToken> {
        if self.is_busy() {
            return None;
        }
        self.next_id += 1;
        let (tx, rx) = oneshot::channel();
        self.active = Some((self.next_id, tx));
        Some(RequestToken {
            id: self.next_id,
            cancel: rx,
        })
    }

    /// Releases the slot. Returns false for a token that is no longer the active one.
    pub fn finish(&mut self, id: u64) -> bool {
        match &self.active {
            Some((active_id, _)) if *active_id == id => {
                self.active = None;
                true
            }
            _ => {
                log!("[WARN] [Request] Ignoring completion of stale request #{}", id);
                false
            }
        }
    }

    /// Signals the active request to stop. The slot stays busy until its task calls `finish`.
    pub fn abort(&mut self) -> bool {
        let Some((id, tx)) = self.active.take() else {
            return false;
        };
        log!("[INFO] [Request] Aborting request #{}", id);
        let _ = tx.send(());
        // keep the id so the aborted task can still release the slot
        let (placeholder, _) = oneshot::channel();
        self.active = Some((id, placeholder));
        true
    }
}

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Drives `fut` until it completes or the slot aborts this request.
    pub async fn run<F: Future>(self, fut: F) -> Result<F::Output, Aborted> {
        let fut = pin!(fut);
        match future::select(self.cancel, fut).await {
            Either::Left(_) => Err(Aborted),
            Either::Right((output, _)) => Ok(output),
        }
    }
}

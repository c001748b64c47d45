//! Debounced progress writer
//!
//! Every engine mutation pushes a snapshot here. A background task keeps
//! only the newest one and writes it once the quiet window has passed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::store::{ProgressRecord, ProgressStore};

enum PersistCommand {
    Write(ProgressRecord),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background writer of one user's progress
pub(crate) struct Persister {
    tx: mpsc::UnboundedSender<PersistCommand>,
    task: JoinHandle<()>,
}

impl Persister {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub(crate) fn spawn(user_id: String, store: Arc<dyn ProgressStore>, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_persister(user_id, store, window, rx));
        Self { tx, task }
    }

    /// Queue a snapshot. Restarts the quiet window.
    pub(crate) fn schedule(&self, record: ProgressRecord) {
        if self.tx.send(PersistCommand::Write(record)).is_err() {
            tracing::debug!("Persister stopped, dropping progress write");
        }
    }

    /// Write the pending snapshot now and wait until it is stored
    pub(crate) async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        // Anything still inside the debounce window is lost
        self.task.abort();
    }
}

async fn run_persister(
    user_id: String,
    store: Arc<dyn ProgressStore>,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<PersistCommand>,
) {
    let mut pending: Option<ProgressRecord> = None;

    loop {
        let command = if pending.is_some() {
            match timeout(window, rx.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    if let Some(record) = pending.take() {
                        write(&user_id, store.as_ref(), &record);
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match command {
            Some(PersistCommand::Write(record)) => {
                if pending.is_some() {
                    tracing::debug!(user = %user_id, "Coalescing progress write");
                }
                pending = Some(record);
            }
            Some(PersistCommand::Flush(ack)) => {
                if let Some(record) = pending.take() {
                    write(&user_id, store.as_ref(), &record);
                }
                let _ = ack.send(());
            }
            None => {
                if pending.is_some() {
                    tracing::debug!(user = %user_id, "Engine dropped inside debounce window, write lost");
                }
                return;
            }
        }
    }
}

fn write(user_id: &str, store: &dyn ProgressStore, record: &ProgressRecord) {
    match store.save(user_id, record) {
        Ok(()) => tracing::debug!(
            user = %user_id,
            points = record.points,
            level = record.level,
            "Progress saved"
        ),
        Err(e) => tracing::warn!(user = %user_id, "Failed to save progress: {}", e),
    }
}

/// Generation session — one active request at a time.
///
/// Starting a new generation aborts the one in flight, including its
/// provider calls. A ticket for a superseded request never yields results,
/// even if its task happened to finish first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::core::pipeline::{Generation, PipelineError, ScriptEngine};
use crate::schema::request::GenerationRequest;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("generation was cancelled or superseded by a newer request")]
    Superseded,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("generation task panicked: {0}")]
    Panicked(String),
}

#[derive(Debug)]
pub struct GenerationSession {
    engine: ScriptEngine,
    current: Arc<AtomicU64>,
    inflight: Mutex<Option<AbortHandle>>,
}

/// Handle to one started generation.
#[derive(Debug)]
pub struct GenerationTicket {
    id: u64,
    current: Arc<AtomicU64>,
    handle: JoinHandle<Result<Generation, PipelineError>>,
}

impl GenerationSession {
    pub fn new(engine: ScriptEngine) -> Self {
        Self {
            engine,
            current: Arc::new(AtomicU64::new(0)),
            inflight: Mutex::new(None),
        }
    }

    /// Spawn `request` on the current tokio runtime, aborting any generation
    /// still running in this session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, request: GenerationRequest) -> GenerationTicket {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        let engine = self.engine.clone();
        let handle = tokio::spawn(async move { engine.generate(&request).await });

        if let Ok(mut slot) = self.inflight.lock() {
            if let Some(previous) = slot.replace(handle.abort_handle()) {
                if !previous.is_finished() {
                    debug!(superseded_by = id, "aborting in-flight generation");
                }
                previous.abort();
            }
        }

        GenerationTicket {
            id,
            current: Arc::clone(&self.current),
            handle,
        }
    }

    /// Abort the running generation, if any. Its ticket resolves to
    /// `SessionError::Superseded`.
    pub fn cancel(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.inflight.lock() {
            if let Some(previous) = slot.take() {
                previous.abort();
            }
        }
    }

    pub fn is_current(&self, ticket: &GenerationTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.id
    }
}

impl Drop for GenerationSession {
    fn drop(&mut self) {
        self.current.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.inflight.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

impl GenerationTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the generation. Results of superseded requests are dropped.
    pub async fn wait(self) -> Result<Generation, SessionError> {
        let joined = self.handle.await;
        if self.current.load(Ordering::SeqCst) != self.id {
            return Err(SessionError::Superseded);
        }
        match joined {
            Ok(result) => result.map_err(SessionError::from),
            Err(err) if err.is_cancelled() => Err(SessionError::Superseded),
            Err(err) => Err(SessionError::Panicked(err.to_string())),
        }
    }
}

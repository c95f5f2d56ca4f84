//! Workflow Session Persistence
//!
//! Durable single-slot storage for the in-progress workflow session so a
//! restarted client resumes without repeating LLM calls.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use noviq_core::WorkflowSession;

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::ensure_parent;

/// Holds at most one session. Exclusively owned by one controller.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> AppResult<Option<WorkflowSession>>;

    fn save(&self, session: &WorkflowSession) -> AppResult<()>;

    fn clear(&self) -> AppResult<()>;
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileSessionStore {
    /// A missing file means no session. An unreadable one is logged and
    /// treated the same way.
    fn load(&self) -> AppResult<Option<WorkflowSession>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable workflow session"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &WorkflowSession) -> AppResult<()> {
        ensure_parent(&self.path)?;
        let tmp = self.temp_path();
        fs::write(&tmp, serde_json::to_vec_pretty(session)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

/// In-process store; counts writes so callers can assert on persistence.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<WorkflowSession>>,
    saves: AtomicUsize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: WorkflowSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Option<WorkflowSession> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> AppResult<Option<WorkflowSession>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| AppError::internal("session store lock poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, session: &WorkflowSession) -> AppResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AppError::internal("session store lock poisoned"))?;
        *slot = Some(session.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AppError::internal("session store lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}

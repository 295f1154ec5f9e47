//! Display targets: the single output surface the poller overwrites.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed to write display '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// A named surface whose whole content is replaced on every write.
pub trait DisplayTarget: Send + Sync {
    fn name(&self) -> &str;

    /// Overwrite the content. Never appends.
    fn replace(&self, content: &str) -> Result<(), DisplayError>;

    /// Current content, `None` until the first successful write.
    fn content(&self) -> Option<String>;
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory target. Also counts writes so callers can tell an
/// overwrite with identical text from no write at all.
pub struct MemoryDisplay {
    name: String,
    content: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryDisplay {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Mutex::new(None),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DisplayTarget for MemoryDisplay {
    fn name(&self) -> &str {
        &self.name
    }

    fn replace(&self, content: &str) -> Result<(), DisplayError> {
        *lock(&self.content) = Some(content.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn content(&self) -> Option<String> {
        lock(&self.content).clone()
    }
}

/// Rewrites one terminal line in place: `\r`, clear line, `name: content`.
pub struct TerminalDisplay<W = io::Stdout> {
    name: String,
    writer: Mutex<W>,
    content: Mutex<Option<String>>,
}

impl TerminalDisplay<io::Stdout> {
    pub fn stdout(name: impl Into<String>) -> Self {
        Self::with_writer(name, io::stdout())
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn with_writer(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer: Mutex::new(writer),
            content: Mutex::new(None),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> DisplayTarget for TerminalDisplay<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn replace(&self, content: &str) -> Result<(), DisplayError> {
        let mut writer = lock(&self.writer);
        write!(writer, "\r\x1b[2K{}: {}", self.name, content)
            .and_then(|_| writer.flush())
            .map_err(|source| DisplayError::Io {
                name: self.name.clone(),
                source,
            })?;
        *lock(&self.content) = Some(content.to_string());
        Ok(())
    }

    fn content(&self) -> Option<String> {
        lock(&self.content).clone()
    }
}

/// Keeps the content in a file, replaced atomically on each write.
/// Whatever the file held before the first write is not content.
pub struct FileDisplay {
    name: String,
    path: PathBuf,
    content: Mutex<Option<String>>,
}

impl FileDisplay {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: Mutex::new(None),
        }
    }
}

impl DisplayTarget for FileDisplay {
    fn name(&self) -> &str {
        &self.name
    }

    fn replace(&self, content: &str) -> Result<(), DisplayError> {
        // Write to temp file then rename, readers never see a partial line.
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .and_then(|_| fs::rename(&tmp_path, &self.path))
            .map_err(|source| DisplayError::Io {
                name: self.name.clone(),
                source,
            })?;
        *lock(&self.content) = Some(content.to_string());
        Ok(())
    }

    fn content(&self) -> Option<String> {
        lock(&self.content).clone()
    }
}

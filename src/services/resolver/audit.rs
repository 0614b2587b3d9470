/*
 * Responsibility
 * - Audit capability for tripwire hits, injected at construction
 * - Tracing (default), append-only file and no-op sinks; each hit is recorded once
 */
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use chrono::Utc;

pub trait AuditSink: Send + Sync {
    fn tripwire(&self, type_name: &str, field_name: &str);
}

#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn tripwire(&self, type_name: &str, field_name: &str) {
        tracing::error!(
            target: "tripwire",
            severity = "critical",
            type_name = %type_name,
            field = %field_name,
            "Tripwire triggered: {type_name}.{field_name}"
        );
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn tripwire(&self, _type_name: &str, _field_name: &str) {}
}

/// Append-only file; each hit becomes exactly one line and nothing else.
///
/// Writes happen on a dedicated thread so the resolver never blocks on disk.
/// Dropping the sink flushes pending lines.
#[derive(Debug)]
pub struct FileAuditSink {
    path: PathBuf,
    lines: Option<Sender<String>>,
    writer: Option<JoinHandle<()>>,
}

impl FileAuditSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let (tx, rx) = mpsc::channel::<String>();

        let log_path = path.clone();
        let writer = thread::Builder::new()
            .name("tripwire-log".into())
            .spawn(move || {
                for line in rx {
                    if let Err(err) = file.write_all(line.as_bytes()).and_then(|()| file.flush()) {
                        tracing::warn!(error = ?err, path = %log_path.display(), "failed to write audit line");
                    }
                }
            })?;

        Ok(Self {
            path,
            lines: Some(tx),
            writer: Some(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileAuditSink {
    fn tripwire(&self, type_name: &str, field_name: &str) {
        let line = format!(
            "[{}] tripwire.CRITICAL: Tripwire triggered: {type_name}.{field_name}\n",
            Utc::now().to_rfc3339()
        );
        if let Some(lines) = &self.lines
            && lines.send(line).is_err()
        {
            tracing::warn!(path = %self.path.display(), "audit writer is gone; tripwire line dropped");
        }
    }
}

impl Drop for FileAuditSink {
    fn drop(&mut self) {
        // Closing the channel ends the writer loop.
        self.lines.take();
        if let Some(writer) = self.writer.take() {
            let _ = writer.join();
        }
    }
}

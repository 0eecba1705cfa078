//! CSV Epoch Logger
//!
//! Passive consumer of epoch snapshots. Owns its session lifecycle: a new
//! CSV file is started lazily the first time an epoch is logged after
//! output has been enabled. The engine never sees files.

use netsim_events::{EpochSnapshot, CSV_HEADER};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

/// Directory new sessions are written into
pub const DEFAULT_OUTPUT_DIR: &str = "data_out";

/// Errors raised while writing a session
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that consumes one snapshot per completed epoch
pub trait EpochSink {
    fn log_epoch(&mut self, snapshot: &EpochSnapshot) -> Result<(), LoggerError>;
}

/// Writes epoch snapshots as CSV rows, one file per logging session
pub struct CsvLogger {
    root: PathBuf,
    current: Option<PathBuf>,
    allow_output: bool,
    session_open: bool,
    subscribers: Vec<Sender<bool>>,
    rows_written: u64,
}

impl CsvLogger {
    /// Create a logger writing under `root`, creating the directory if needed.
    /// Output starts disabled.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            current: None,
            allow_output: false,
            session_open: false,
            subscribers: Vec::new(),
            rows_written: 0,
        })
    }

    /// Receive every change of the output flag
    pub fn subscribe(&mut self) -> Receiver<bool> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Enable or disable output. Enabling after being disabled starts a
    /// fresh session on the next logged epoch.
    pub fn set_allow_output(&mut self, value: bool) {
        if !self.allow_output && value {
            self.session_open = false;
        }
        self.allow_output = value;
        tracing::info!(enabled = value, "epoch logging toggled");

        // Drop subscribers whose receiver has gone away
        self.subscribers.retain(|tx| tx.send(value).is_ok());
    }

    pub fn toggle_allow_output(&mut self) {
        self.set_allow_output(!self.allow_output);
    }

    pub fn is_output_allowed(&self) -> bool {
        self.allow_output
    }

    /// File of the current session, if one has been started
    pub fn current_file(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn start_new_session(&mut self) -> Result<(), LoggerError> {
        let stamp = chrono::Local::now().format("%m_%d_%H_%M").to_string();
        let mut path = self.root.join(format!("{stamp}.csv"));
        let mut suffix = 1;
        while path.exists() {
            path = self.root.join(format!("{stamp}_{suffix}.csv"));
            suffix += 1;
        }

        let mut file = File::create(&path)?;
        writeln!(file, "{}", CSV_HEADER)?;

        tracing::info!(file = %path.display(), "started logging session");
        self.current = Some(path);
        self.session_open = true;
        Ok(())
    }
}

impl EpochSink for CsvLogger {
    fn log_epoch(&mut self, snapshot: &EpochSnapshot) -> Result<(), LoggerError> {
        if !self.allow_output {
            return Ok(());
        }
        if !self.session_open {
            self.start_new_session()?;
        }
        let Some(path) = self.current.as_ref() else {
            return Ok(());
        };

        let mut file = OpenOptions::new().append(true).open(path)?;
        append_whole(&mut file, render_rows(snapshot).as_bytes())?;

        self.rows_written += snapshot.agents.len() as u64;
        Ok(())
    }
}

/// Every row of one epoch, newline terminated
fn render_rows(snapshot: &EpochSnapshot) -> String {
    let mut rows = String::new();
    for record in &snapshot.agents {
        rows.push_str(&record.to_csv_row());
        rows.push('\n');
    }
    rows
}

/// Append `bytes` to `file` in one write. On failure the file is cut back to
/// its previous length so no part of the epoch remains.
fn append_whole(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    let start = file.metadata()?.len();
    if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
        if let Err(rollback) = file.set_len(start) {
            tracing::warn!(error = %rollback, "could not remove partial epoch rows");
        }
        return Err(e);
    }
    Ok(())
}

//! # Reader environment
//!
//! This module defines [`crate::env_state::ReaderEnv`], the **context object** passed to every
//! snapshot read. It carries:
//!
//! - The **task rank** of the calling worker in the distributed job. It is used only to tag
//!   log lines and error messages, never to change behavior.
//! - The **open retry policy**: snapshot files often live on shared filesystems where an
//!   `open` can fail transiently, so a failed open is retried a bounded number of times.
//! - The **wrap mode** applied to particle positions (see [`WrapMode`]).
//!
//! ## Structure
//!
//! ```text
//! ReaderEnv
//! ├── task          (i32)
//! ├── open_retries  (u32, extra attempts after the first)
//! ├── retry_delay   (Duration)
//! └── wrap_mode     (WrapMode)
//! ```
//!
//! ## Usage
//!
//! ```rust, no_run
//! use std::time::Duration;
//! use camino::Utf8Path;
//! use lgadget::env_state::ReaderEnv;
//!
//! let env = ReaderEnv::default()
//!     .with_task(12)
//!     .with_open_retries(5)
//!     .with_retry_delay(Duration::from_millis(250));
//!
//! let reader = env.open_snapshot(Utf8Path::new("lightcone_000.0")).unwrap();
//! ```
//!
//! ## Notes
//!
//! - The environment is plain data: cheap to clone, `Send + Sync`, and serializable with
//!   `serde` so it can be embedded into the configuration of the calling pipeline.
use std::{fs::File, io::BufReader, thread, time::Duration};

use camino::Utf8Path;
use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_OPEN_RETRIES, DEFAULT_RETRY_DELAY},
    lgadget_errors::LGadgetError,
    snapshot::particles::WrapMode,
};

/// Per-worker settings shared by every read issued through [`crate::lgadget::LGadget`].
///
/// # Fields
///
/// * `task` - Rank of the worker, used to tag diagnostics
/// * `open_retries` - Number of extra open attempts after a failed open
/// * `retry_delay` - Pause between two open attempts
/// * `wrap_mode` - Periodic wrap applied to decoded positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderEnv {
    pub task: i32,
    pub open_retries: u32,
    pub retry_delay: Duration,
    pub wrap_mode: WrapMode,
}

impl Default for ReaderEnv {
    fn default() -> Self {
        ReaderEnv {
            task: 0,
            open_retries: DEFAULT_OPEN_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            wrap_mode: WrapMode::default(),
        }
    }
}

impl ReaderEnv {
    pub fn with_task(mut self, task: i32) -> Self {
        self.task = task;
        self
    }

    pub fn with_open_retries(mut self, open_retries: u32) -> Self {
        self.open_retries = open_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_wrap_mode(mut self, wrap_mode: WrapMode) -> Self {
        self.wrap_mode = wrap_mode;
        self
    }

    /// Open a snapshot file for buffered reading, retrying failed opens.
    ///
    /// The first attempt is followed by up to `open_retries` further attempts, each
    /// preceded by a `retry_delay` pause and a warning tagged with the task rank.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: Location of the snapshot file.
    ///
    /// Return
    /// ----------
    /// * A [`BufReader`] over the opened file, or [`LGadgetError::OpenFailed`] carrying the
    ///   last OS error once every attempt has failed.
    pub fn open_snapshot(&self, path: &Utf8Path) -> Result<BufReader<File>, LGadgetError> {
        let max_attempts = self.open_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match File::open(path) {
                Ok(file) => return Ok(BufReader::new(file)),
                Err(err) if attempt < max_attempts => {
                    warn!(
                        "{}: could not open file '{}' (attempt {}/{}): {}",
                        self.task, path, attempt, max_attempts, err
                    );
                    thread::sleep(self.retry_delay);
                }
                Err(err) => {
                    let err = LGadgetError::OpenFailed {
                        path: path.to_path_buf(),
                        task: self.task,
                        attempts: attempt,
                        source: err,
                    };
                    error!("{err}");
                    return Err(err);
                }
            }
        }
    }
}

//! # LGadget: entry point of the snapshot reader
//!
//! This module defines the [`LGadget`](crate::lgadget::LGadget) struct, the façade a
//! ray-tracing worker uses to read LGadget-2 snapshot files by path. It owns a
//! [`ReaderEnv`](crate::env_state::ReaderEnv) (task rank, open retries, wrap mode) and
//! exposes:
//!
//! 1. **Header access** – [`read_header`](crate::lgadget::LGadget::read_header), the single
//!    decode routine every other call goes through.
//! 2. **Metadata accessors** – total particle count, file count, Ω_m, scale factor, box size
//!    (see [`crate::snapshot::metadata`]).
//! 3. **Particle reader** – [`read_particles`](crate::lgadget::LGadget::read_particles).
//!
//! Every call opens the file, reads what it needs and closes it again: calls share no
//! session and no cache, so an `LGadget` can be cloned freely across threads.
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use camino::Utf8Path;
//! use lgadget::{env_state::ReaderEnv, lgadget::LGadget};
//!
//! let reader = LGadget::new(ReaderEnv::default().with_task(3));
//! let path = Utf8Path::new("lightcone_042.7");
//!
//! let n_files = reader.file_count(path).unwrap();
//! let batch = reader.read_particles(path, true).unwrap();
//! println!("{} particles, {} files", batch.len(), n_files);
//! ```
//!
//! ## Errors
//!
//! Failures are logged at `error` level, tagged with the task rank, then returned as
//! [`LGadgetError`](crate::lgadget_errors::LGadgetError). Nothing here aborts the process;
//! the calling job decides what a failed file means for the run.

use camino::Utf8Path;
use log::error;

use crate::{
    env_state::ReaderEnv,
    lgadget_errors::LGadgetError,
    snapshot::{
        header::SnapshotHeader,
        particles::{read_particle_blocks, ParticleBatch},
    },
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LGadget {
    env: ReaderEnv,
}

impl LGadget {
    pub fn new(env: ReaderEnv) -> Self {
        LGadget { env }
    }

    pub fn env(&self) -> &ReaderEnv {
        &self.env
    }

    /// Open a snapshot and decode its header.
    ///
    /// The file is closed before returning.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: Location of the snapshot file.
    ///
    /// Return
    /// ----------
    /// * The decoded [`SnapshotHeader`], or an I/O or format error.
    ///
    /// See also
    /// ------------
    /// * [`SnapshotHeader::read`] – Decoder of the framed header record.
    pub fn read_header(&self, path: &Utf8Path) -> Result<SnapshotHeader, LGadgetError> {
        let mut reader = self.env.open_snapshot(path)?;
        SnapshotHeader::read(&mut reader).map_err(|err| self.report(path, err))
    }

    /// Read the positions, and optionally the ids, of every particle of a snapshot file.
    ///
    /// Positions are folded into `[0, BoxSize)` with the environment's
    /// [`WrapMode`](crate::snapshot::particles::WrapMode). When `want_ids` is false the
    /// velocity and id blocks are never read.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: Location of the snapshot file.
    /// * `want_ids`: Whether particle ids must be decoded.
    ///
    /// Return
    /// ----------
    /// * A fully populated [`ParticleBatch`], or the error that stopped the read. No partial
    ///   arrays are ever returned.
    ///
    /// See also
    /// ------------
    /// * [`read_particle_blocks`] – Block decoder working on any `Read + Seek` source.
    pub fn read_particles(
        &self,
        path: &Utf8Path,
        want_ids: bool,
    ) -> Result<ParticleBatch, LGadgetError> {
        let mut reader = self.env.open_snapshot(path)?;
        read_particle_blocks(&mut reader, want_ids, self.env.wrap_mode)
            .map_err(|err| self.report(path, err))
    }

    fn report(&self, path: &Utf8Path, err: LGadgetError) -> LGadgetError {
        error!("{}: error reading file '{}': {}", self.env.task, path, err);
        err
    }
}

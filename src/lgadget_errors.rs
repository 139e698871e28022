//! Error taxonomy of the snapshot decoder.
//!
//! Every failure of a read or accessor call is surfaced as a [`LGadgetError`].
//! The variants fall into three classes reported by [`LGadgetError::kind`]:
//!
//! * [`ErrorKind::Io`] – the file cannot be opened or the OS refused a read.
//! * [`ErrorKind::Format`] – a record marker disagrees with the expected payload
//!   size, the file ends inside a block, or decoded values make the file unusable.
//! * [`ErrorKind::Allocation`] – the particle arrays could not be allocated.
//!
//! None of these are recovered inside the crate. The caller (typically the
//! orchestration layer of a distributed job) decides whether to retry, skip the
//! file, or shut down.
use std::fmt;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Binary block of a snapshot file, used to locate a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Header,
    Positions,
    Velocities,
    Ids,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Block::Header => "header",
            Block::Positions => "positions",
            Block::Velocities => "velocities",
            Block::Ids => "ids",
        };
        write!(f, "{name}")
    }
}

/// Which of the two record markers bracketing a block was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPosition {
    Leading,
    Trailing,
}

impl fmt::Display for MarkerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerPosition::Leading => write!(f, "leading"),
            MarkerPosition::Trailing => write!(f, "trailing"),
        }
    }
}

/// Coarse classification of a [`LGadgetError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Allocation,
}

#[derive(Error, Debug)]
pub enum LGadgetError {
    #[error("{task}: could not open file '{path}' after {attempts} attempt(s): {source}")]
    OpenFailed {
        path: Utf8PathBuf,
        task: i32,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Record marker mismatch in the {block} block ({position} marker): expected {expected} bytes, found {found}")]
    MarkerMismatch {
        block: Block,
        position: MarkerPosition,
        expected: u64,
        found: u64,
    },

    #[error("File truncated inside the {0} block")]
    TruncatedBlock(Block),

    #[error("Error during the nom parsing: {0}")]
    NomParsingError(String),

    #[error("Invalid box size in snapshot header: {0}")]
    InvalidBoxSize(f64),

    #[error("The {block} block would hold {bytes} bytes, more than a record marker can describe")]
    BlockTooLarge { block: Block, bytes: u64 },

    #[error("Unable to allocate {elements} elements for the {block} block")]
    AllocationFailed { block: Block, elements: usize },
}

impl LGadgetError {
    /// Classify the error into the I/O, format or allocation family.
    pub fn kind(&self) -> ErrorKind {
        use LGadgetError::*;
        match self {
            OpenFailed { .. } | IoError(_) => ErrorKind::Io,
            MarkerMismatch { .. }
            | TruncatedBlock(_)
            | NomParsingError(_)
            | InvalidBoxSize(_)
            | BlockTooLarge { .. } => ErrorKind::Format,
            AllocationFailed { .. } => ErrorKind::Allocation,
        }
    }

    /// Map an I/O failure raised while reading `block`.
    ///
    /// An end of file inside a block means the snapshot is truncated, which is a
    /// format problem rather than an I/O one.
    pub(crate) fn from_read(err: std::io::Error, block: Block) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            LGadgetError::TruncatedBlock(block)
        } else {
            LGadgetError::IoError(err)
        }
    }
}

impl PartialEq for LGadgetError {
    fn eq(&self, other: &Self) -> bool {
        use LGadgetError::*;
        match (self, other) {
            (
                OpenFailed {
                    path: p1,
                    task: t1,
                    attempts: a1,
                    ..
                },
                OpenFailed {
                    path: p2,
                    task: t2,
                    attempts: a2,
                    ..
                },
            ) => p1 == p2 && t1 == t2 && a1 == a2,

            // io::Error is not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,

            (
                MarkerMismatch {
                    block: b1,
                    position: p1,
                    expected: e1,
                    found: f1,
                },
                MarkerMismatch {
                    block: b2,
                    position: p2,
                    expected: e2,
                    found: f2,
                },
            ) => b1 == b2 && p1 == p2 && e1 == e2 && f1 == f2,
            (TruncatedBlock(a), TruncatedBlock(b)) => a == b,
            (NomParsingError(a), NomParsingError(b)) => a == b,
            (InvalidBoxSize(a), InvalidBoxSize(b)) => a.to_bits() == b.to_bits(),
            (
                BlockTooLarge {
                    block: b1,
                    bytes: n1,
                },
                BlockTooLarge {
                    block: b2,
                    bytes: n2,
                },
            ) => b1 == b2 && n1 == n2,
            (
                AllocationFailed {
                    block: b1,
                    elements: e1,
                },
                AllocationFailed {
                    block: b2,
                    elements: e2,
                },
            ) => b1 == b2 && e1 == e2,

            _ => false,
        }
    }
}

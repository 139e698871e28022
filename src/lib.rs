//! Reader for LGadget-2 lightcone snapshot files.
//!
//! See [`lgadget::LGadget`] for the entry point.
pub mod constants;
pub mod env_state;
pub mod lgadget;
pub mod lgadget_errors;
pub mod snapshot;

pub use env_state::ReaderEnv;
pub use lgadget::LGadget;
pub use lgadget_errors::{ErrorKind, LGadgetError};
pub use snapshot::{
    header::SnapshotHeader,
    particles::{ParticleBatch, WrapMode},
};

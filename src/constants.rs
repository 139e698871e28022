//! # Constants for the LGadget-2 snapshot layout
//!
//! Sizes and counts fixed by the on-disk format, and the defaults of the
//! reader environment.

use std::time::Duration;

// -------------------------------------------------------------------------------------------------
// On-disk layout
// -------------------------------------------------------------------------------------------------

/// Size in bytes of the header payload (without its record markers)
pub const HEADER_SIZE: usize = 256;

/// Size in bytes of a Fortran record marker
pub const MARKER_SIZE: usize = 4;

/// Number of particle types stored in the header tables
pub const N_PARTICLE_TYPES: usize = 6;

/// Number of particle types counted in a file's particle blocks (type 5 is excluded)
pub const N_COUNTED_TYPES: usize = 5;

/// Size in bytes of the reserved padding closing the header
pub const HEADER_FILL_SIZE: usize = 60;

/// Bytes per particle in the position and velocity blocks (three `f32`)
pub const VECTOR3_F32_SIZE: usize = 3 * std::mem::size_of::<f32>();

/// Bytes per particle in the identifier block (one `u64`)
pub const ID_SIZE: usize = std::mem::size_of::<u64>();

/// Index of the particle type whose total count is reported by the metadata accessors
pub const TOTAL_COUNT_TYPE: usize = 1;

// -------------------------------------------------------------------------------------------------
// Reader defaults
// -------------------------------------------------------------------------------------------------

/// Extra open attempts after the first failure
pub const DEFAULT_OPEN_RETRIES: u32 = 3;

/// Pause between two open attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Particle identifier as stored in the ids block
pub type ParticleId = u64;

/// Box length, in simulation code units
pub type CodeLength = f64;

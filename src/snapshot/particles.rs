//! Particle block decoding and periodic box wrap.
//!
//! After the header, an LGadget-2 snapshot stores one record per particle
//! property. This module reads the ones the ray tracer needs:
//!
//! 1. **positions** – `Np` interleaved `(x, y, z)` `f32` triplets, always read;
//! 2. **velocities** – same layout, never decoded, skipped only to reach the ids;
//! 3. **ids** – `Np` `u64` identifiers, read on request.
//!
//! `Np` is the number of particles of the first five types in *this* file
//! (see [`SnapshotHeader::particles_in_file`]).
//!
//! Positions are folded into `[0, BoxSize)` before being returned. The default
//! [`WrapMode::Legacy`] reproduces the repeated add/subtract correction of the
//! historical reader bit for bit; [`WrapMode::Modulo`] is a closed form that
//! costs the same for every coordinate but may round differently when a value
//! sits several box lengths away from the box.
//!
//! A call either returns a fully populated [`ParticleBatch`] or an error; the
//! arrays are never handed out half filled.
use std::io::{Read, Seek};

use itertools::izip;
use log::debug;
use nalgebra::Vector3;
use nom::{
    number::{
        complete::{f32 as nom_f32, u64 as nom_u64},
        Endianness,
    },
    sequence::tuple,
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{CodeLength, ParticleId, ID_SIZE, VECTOR3_F32_SIZE},
    lgadget_errors::{Block, LGadgetError},
    snapshot::{
        header::SnapshotHeader,
        record::{read_record, skip_record},
    },
};

/// Strategy used to fold coordinates back into the periodic box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// Repeatedly add or subtract the box size, rounding to `f32` after each step.
    #[default]
    Legacy,
    /// Closed-form Euclidean remainder.
    Modulo,
}

impl WrapMode {
    pub fn apply(self, value: f32, box_size: CodeLength) -> f32 {
        match self {
            WrapMode::Legacy => wrap_legacy(value, box_size),
            WrapMode::Modulo => wrap_modulo(value, box_size),
        }
    }
}

/// Fold `value` into `[0, box_size)` by repeated correction.
///
/// Each step is computed in `f64` and stored back as `f32`, which is what the
/// historical reader did when adding a `double` box size to a `float`
/// coordinate. The number of steps grows with the distance to the box, so the
/// input is expected to lie within about one box length of it.
///
/// A coordinate so large that one step no longer changes its `f32` value would
/// never converge; it is folded with [`wrap_modulo`] instead. NaN fails both
/// comparisons and comes back unchanged, infinities too.
///
/// `box_size` must be finite and strictly positive.
pub fn wrap_legacy(value: f32, box_size: CodeLength) -> f32 {
    let mut x = value;
    while (x as f64) < 0.0 {
        let next = (x as f64 + box_size) as f32;
        if next == x {
            return wrap_modulo(value, box_size);
        }
        x = next;
    }
    while (x as f64) >= box_size {
        let next = (x as f64 - box_size) as f32;
        if next == x {
            return wrap_modulo(value, box_size);
        }
        x = next;
    }
    x
}

/// Fold `value` into `[0, box_size)` with a Euclidean remainder.
///
/// Non-finite values are returned unchanged.
pub fn wrap_modulo(value: f32, box_size: CodeLength) -> f32 {
    if !value.is_finite() {
        return value;
    }
    let wrapped = (value as f64).rem_euclid(box_size) as f32;
    // rem_euclid of a tiny negative value, or the f32 rounding, can land on the edge
    if wrapped as f64 >= box_size {
        0.0
    } else {
        wrapped
    }
}

/// Particle arrays decoded from one snapshot file.
///
/// `px`, `py`, `pz` (and `id` when requested) all hold exactly the number of
/// particles of the file. The batch is owned by the caller; nothing is cached.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleBatch {
    pub px: Vec<f32>,
    pub py: Vec<f32>,
    pub pz: Vec<f32>,
    pub id: Option<Vec<ParticleId>>,
}

impl ParticleBatch {
    /// Number of particles in the batch (`Np`).
    pub fn len(&self) -> usize {
        self.px.len()
    }

    pub fn is_empty(&self) -> bool {
        self.px.is_empty()
    }

    /// Position of particle `index` as a vector, `None` if out of range.
    pub fn position(&self, index: usize) -> Option<Vector3<f32>> {
        Some(Vector3::new(
            *self.px.get(index)?,
            *self.py.get(index)?,
            *self.pz.get(index)?,
        ))
    }

    /// Iterate over all positions as vectors, in file order.
    pub fn positions(&self) -> impl Iterator<Item = Vector3<f32>> + '_ {
        izip!(&self.px, &self.py, &self.pz).map(|(&x, &y, &z)| Vector3::new(x, y, z))
    }
}

/// Allocate a zeroed buffer of `len` elements, reporting failure instead of aborting.
fn try_alloc<T: Clone + Default>(len: usize, block: Block) -> Result<Vec<T>, LGadgetError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| LGadgetError::AllocationFailed {
            block,
            elements: len,
        })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

/// Allocate an empty vector able to hold `len` elements without reallocating.
fn try_with_capacity<T>(len: usize, block: Block) -> Result<Vec<T>, LGadgetError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| LGadgetError::AllocationFailed {
            block,
            elements: len,
        })?;
    Ok(buffer)
}

/// Payload size in bytes of the positions block described by `header`.
///
/// Markers are `u32`, so a header announcing more than `u32::MAX` bytes of
/// positions cannot describe a readable file. Checked before anything is allocated.
fn positions_block_len(header: &SnapshotHeader) -> Result<usize, LGadgetError> {
    // at most 5 * u32::MAX particles, the product fits in a u64
    let bytes = header.particles_in_file() * VECTOR3_F32_SIZE as u64;
    if bytes > u32::MAX as u64 {
        return Err(LGadgetError::BlockTooLarge {
            block: Block::Positions,
            bytes,
        });
    }
    usize::try_from(bytes).map_err(|_| LGadgetError::AllocationFailed {
        block: Block::Positions,
        elements: usize::MAX,
    })
}

fn ne_f32(input: &[u8]) -> IResult<&[u8], f32> {
    nom_f32(Endianness::Native)(input)
}

fn ne_u64(input: &[u8]) -> IResult<&[u8], u64> {
    nom_u64(Endianness::Native)(input)
}

fn parse_triplet(input: &[u8]) -> IResult<&[u8], (f32, f32, f32)> {
    tuple((ne_f32, ne_f32, ne_f32))(input)
}

/// Fold every coordinate into `[0, box_size)`.
///
/// Arguments
/// -----------------
/// * `px`, `py`, `pz`: Coordinate arrays of equal length, modified in place.
/// * `box_size`: Edge length of the periodic box.
/// * `wrap_mode`: Folding strategy.
///
/// NaN and infinite coordinates are left as they are.
///
/// Return
/// ----------
/// * [`LGadgetError::InvalidBoxSize`] if there is at least one particle and the box
///   is not a finite positive length. Without particles the box size is never used.
pub fn wrap_positions(
    px: &mut [f32],
    py: &mut [f32],
    pz: &mut [f32],
    box_size: CodeLength,
    wrap_mode: WrapMode,
) -> Result<(), LGadgetError> {
    if px.is_empty() && py.is_empty() && pz.is_empty() {
        return Ok(());
    }
    if !box_size.is_finite() || box_size <= 0.0 {
        return Err(LGadgetError::InvalidBoxSize(box_size));
    }

    for (x, y, z) in izip!(px.iter_mut(), py.iter_mut(), pz.iter_mut()) {
        for coord in [x, y, z] {
            *coord = wrap_mode.apply(*coord, box_size);
        }
    }
    Ok(())
}

/// Decode the particle blocks of a snapshot from its first byte.
///
/// The header is decoded first to size every block. Velocities and ids are only
/// touched when `want_ids` is set; otherwise the reader is left right after the
/// positions block. Code that needs a later block must skip the velocities and ids
/// explicitly rather than rely on this position.
///
/// Arguments
/// -----------------
/// * `reader`: Source positioned at the beginning of the snapshot file.
/// * `want_ids`: Whether the ids block must be decoded.
/// * `wrap_mode`: Folding strategy applied to positions.
///
/// Return
/// ----------
/// * The decoded [`ParticleBatch`], or the first error met.
///
/// See also
/// ------------
/// * [`SnapshotHeader::read`] – Header decoding.
/// * [`wrap_positions`] – Periodic folding of the positions.
pub fn read_particle_blocks<R: Read + Seek>(
    reader: &mut R,
    want_ids: bool,
    wrap_mode: WrapMode,
) -> Result<ParticleBatch, LGadgetError> {
    let header = SnapshotHeader::read(reader)?;

    let vector_len = positions_block_len(&header)?;
    let np = vector_len / VECTOR3_F32_SIZE;

    let mut px = try_with_capacity(np, Block::Positions)?;
    let mut py = try_with_capacity(np, Block::Positions)?;
    let mut pz = try_with_capacity(np, Block::Positions)?;
    let mut id = if want_ids {
        Some(try_with_capacity::<ParticleId>(np, Block::Ids)?)
    } else {
        None
    };

    {
        let mut raw = try_alloc::<u8>(vector_len, Block::Positions)?;
        read_record(reader, Block::Positions, &mut raw)?;

        for triplet in raw.chunks_exact(VECTOR3_F32_SIZE) {
            let (_, (x, y, z)) = parse_triplet(triplet)
                .map_err(|err| LGadgetError::NomParsingError(err.to_string()))?;
            px.push(x);
            py.push(y);
            pz.push(z);
        }
    }

    wrap_positions(&mut px, &mut py, &mut pz, header.box_size, wrap_mode)?;

    if let Some(ids) = id.as_mut() {
        skip_record(reader, Block::Velocities, vector_len as u64)?;

        let mut raw = try_alloc::<u8>(np * ID_SIZE, Block::Ids)?;
        read_record(reader, Block::Ids, &mut raw)?;

        for chunk in raw.chunks_exact(ID_SIZE) {
            let (_, value) =
                ne_u64(chunk).map_err(|err| LGadgetError::NomParsingError(err.to_string()))?;
            ids.push(value);
        }
    }

    debug!(
        "decoded {np} particles (ids: {}) in a box of size {}",
        want_ids, header.box_size
    );

    Ok(ParticleBatch { px, py, pz, id })
}

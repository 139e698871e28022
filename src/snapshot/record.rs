//! Fortran unformatted record framing.
//!
//! Every block of a snapshot (header, positions, velocities, ids) is written as
//! a Fortran unformatted record: the payload is bracketed by two 4‑byte
//! unsigned markers holding the payload size in bytes.
//!
//! ```text
//! [u32 len][len bytes of payload][u32 len]
//! ```
//!
//! The decoder always knows how large a block must be (it is derived from the
//! header), so both markers are checked against that expected size. A marker
//! that disagrees means the file is corrupt or was not written for this layout.
//!
//! # Endianness
//! Markers are read in the **native** byte order of the host, like the rest of
//! the file.
use std::io::{Read, Seek, SeekFrom};

use log::debug;

use crate::{
    constants::MARKER_SIZE,
    lgadget_errors::{Block, LGadgetError, MarkerPosition},
};

/// Read one 4‑byte record marker.
fn read_marker<R: Read>(reader: &mut R, block: Block) -> Result<u32, LGadgetError> {
    let mut buf = [0u8; MARKER_SIZE];
    reader
        .read_exact(&mut buf)
        .map_err(|err| LGadgetError::from_read(err, block))?;
    Ok(u32::from_ne_bytes(buf))
}

/// Read one record marker and check it against the expected payload size.
///
/// Arguments
/// -----------------
/// * `reader`: Source positioned on the marker.
/// * `block`: Block the marker belongs to, reported on failure.
/// * `position`: Whether this is the leading or the trailing marker.
/// * `expected`: Payload size in bytes the marker must hold.
///
/// Return
/// ----------
/// * `Ok(())` if the marker matches, [`LGadgetError::MarkerMismatch`] otherwise,
///   or [`LGadgetError::TruncatedBlock`] if the file ends before the marker.
pub(crate) fn expect_marker<R: Read>(
    reader: &mut R,
    block: Block,
    position: MarkerPosition,
    expected: u64,
) -> Result<(), LGadgetError> {
    let found = read_marker(reader, block)? as u64;
    if found != expected {
        return Err(LGadgetError::MarkerMismatch {
            block,
            position,
            expected,
            found,
        });
    }
    Ok(())
}

/// Read a complete record whose payload fills `payload` exactly.
///
/// The caller owns the buffer, so the allocation policy (and its failure mode)
/// stays with the code that knows how many particles the block holds.
///
/// Arguments
/// -----------------
/// * `reader`: Source positioned on the leading marker.
/// * `block`: Block being read.
/// * `payload`: Destination buffer; its length is the expected payload size.
///
/// Return
/// ----------
/// * `Ok(())` once both markers are validated and `payload` is filled.
///
/// See also
/// ------------
/// * [`skip_record`] – Same framing checks without reading the payload.
pub(crate) fn read_record<R: Read>(
    reader: &mut R,
    block: Block,
    payload: &mut [u8],
) -> Result<(), LGadgetError> {
    let expected = payload.len() as u64;

    expect_marker(reader, block, MarkerPosition::Leading, expected)?;
    reader
        .read_exact(payload)
        .map_err(|err| LGadgetError::from_read(err, block))?;
    expect_marker(reader, block, MarkerPosition::Trailing, expected)?;

    debug!("read {block} record of {expected} bytes");
    Ok(())
}

/// Validate the markers of a record and seek over its payload.
///
/// Seeking past the end of the file is allowed by the OS; a truncated payload
/// is detected when the trailing marker cannot be read.
pub(crate) fn skip_record<R: Read + Seek>(
    reader: &mut R,
    block: Block,
    len: u64,
) -> Result<(), LGadgetError> {
    expect_marker(reader, block, MarkerPosition::Leading, len)?;
    // len matched a u32 marker, so it fits in an i64
    reader.seek(SeekFrom::Current(len as i64))?;
    expect_marker(reader, block, MarkerPosition::Trailing, len)?;

    debug!("skipped {block} record of {len} bytes");
    Ok(())
}

//! Decoding of a single LGadget-2 snapshot file.
//!
//! * [`header`] – the fixed 256‑byte header record.
//! * [`record`] – Fortran record markers framing every block.
//! * [`particles`] – positions (wrapped into the box) and optional ids.
//! * [`metadata`] – one-value header queries by path.
pub mod header;
pub mod metadata;
pub mod particles;
mod record;

//! LGadget-2 snapshot header decoding.
//!
//! The first record of every snapshot file is a fixed 256‑byte header framed by
//! two record markers. It describes the particle content of *this* file, the
//! totals of the whole snapshot, and the cosmology of the run.
//!
//! # Layout
//!
//! | offset | field                  | type      |
//! |-------:|------------------------|-----------|
//! |      0 | `npart`                | 6 × u32   |
//! |     24 | `mass`                 | 6 × f64   |
//! |     72 | `time`                 | f64       |
//! |     80 | `redshift`             | f64       |
//! |     88 | `flag_sfr`             | i32       |
//! |     92 | `flag_feedback`        | i32       |
//! |     96 | `npart_total`          | 6 × u32   |
//! |    120 | `flag_cooling`         | i32       |
//! |    124 | `num_files`            | i32       |
//! |    128 | `box_size`             | f64       |
//! |    136 | `omega0`               | f64       |
//! |    144 | `omega_lambda`         | f64       |
//! |    152 | `hubble_param`         | f64       |
//! |    160 | `flag_stellarage`      | i32       |
//! |    164 | `flag_metals`          | i32       |
//! |    168 | `hashtabsize`          | i32       |
//! |    172 | `npart_total_high_word`| 6 × u32   |
//! |    196 | reserved fill          | 60 bytes  |
//!
//! Fields are decoded one after the other at these offsets, never by overlaying
//! a struct on the raw bytes, so the host's struct packing plays no role.
//!
//! # Endianness
//! Values are read in the **native** byte order: snapshots are assumed to be read
//! on the same kind of machine that wrote them.
//!
//! # See also
//! ------------
//! * [`SnapshotHeader::read`] – Decode the framed header from a reader.
//! * [`crate::snapshot::record`] – Record marker conventions.
use std::{fmt, io::Read};

use log::debug;
use nom::{
    bytes::complete::take,
    number::{
        complete::{f64 as nom_f64, i32 as nom_i32, u32 as nom_u32},
        Endianness,
    },
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        CodeLength, HEADER_FILL_SIZE, HEADER_SIZE, N_COUNTED_TYPES, N_PARTICLE_TYPES,
        TOTAL_COUNT_TYPE,
    },
    lgadget_errors::{Block, LGadgetError},
    snapshot::record::read_record,
};

/// Decoded LGadget-2 snapshot header.
///
/// The reserved fill closing the record is not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    /// Particles of each type in this file.
    pub npart: [u32; N_PARTICLE_TYPES],
    /// Mass table, one entry per particle type.
    pub mass: [f64; N_PARTICLE_TYPES],
    /// Cosmological scale factor of the snapshot.
    pub time: f64,
    pub redshift: f64,
    pub flag_sfr: i32,
    pub flag_feedback: i32,
    /// Low 32 bits of the total particle count of each type, across all files.
    pub npart_total: [u32; N_PARTICLE_TYPES],
    pub flag_cooling: i32,
    /// Number of files composing the snapshot.
    pub num_files: i32,
    /// Edge length of the periodic box, in code units.
    pub box_size: CodeLength,
    /// Matter density parameter.
    pub omega0: f64,
    /// Vacuum energy density parameter.
    pub omega_lambda: f64,
    /// Little `h`.
    pub hubble_param: f64,
    pub flag_stellarage: i32,
    pub flag_metals: i32,
    pub hashtabsize: i32,
    /// High 32 bits of the total particle count of each type.
    pub npart_total_high_word: [u32; N_PARTICLE_TYPES],
}

fn ne_u32(input: &[u8]) -> IResult<&[u8], u32> {
    nom_u32(Endianness::Native)(input)
}

fn ne_i32(input: &[u8]) -> IResult<&[u8], i32> {
    nom_i32(Endianness::Native)(input)
}

fn ne_f64(input: &[u8]) -> IResult<&[u8], f64> {
    nom_f64(Endianness::Native)(input)
}

/// Decode `N` consecutive values with the same nom number parser.
fn parse_array<'a, T: Copy + Default, const N: usize>(
    mut input: &'a [u8],
    parser: fn(&'a [u8]) -> IResult<&'a [u8], T>,
) -> IResult<&'a [u8], [T; N]> {
    let mut values = [T::default(); N];
    for value in values.iter_mut() {
        let (rest, decoded) = parser(input)?;
        *value = decoded;
        input = rest;
    }
    Ok((input, values))
}

impl SnapshotHeader {
    /// Decode the 256‑byte header payload (markers excluded).
    ///
    /// Arguments
    /// -----------------
    /// * `input`: Byte slice starting at the first header field, at least 256 bytes long.
    ///
    /// Return
    /// ----------
    /// * An [`IResult`] whose value is `(remaining, header)`; `remaining` starts right
    ///   after the reserved fill.
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, npart) = parse_array::<u32, N_PARTICLE_TYPES>(input, ne_u32)?;
        let (input, mass) = parse_array::<f64, N_PARTICLE_TYPES>(input, ne_f64)?;
        let (input, time) = ne_f64(input)?;
        let (input, redshift) = ne_f64(input)?;
        let (input, flag_sfr) = ne_i32(input)?;
        let (input, flag_feedback) = ne_i32(input)?;
        let (input, npart_total) = parse_array::<u32, N_PARTICLE_TYPES>(input, ne_u32)?;
        let (input, flag_cooling) = ne_i32(input)?;
        let (input, num_files) = ne_i32(input)?;
        let (input, box_size) = ne_f64(input)?;
        let (input, omega0) = ne_f64(input)?;
        let (input, omega_lambda) = ne_f64(input)?;
        let (input, hubble_param) = ne_f64(input)?;
        let (input, flag_stellarage) = ne_i32(input)?;
        let (input, flag_metals) = ne_i32(input)?;
        let (input, hashtabsize) = ne_i32(input)?;
        let (input, npart_total_high_word) =
            parse_array::<u32, N_PARTICLE_TYPES>(input, ne_u32)?;
        let (input, _) = take(HEADER_FILL_SIZE)(input)?; // reserved
        Ok((
            input,
            SnapshotHeader {
                npart,
                mass,
                time,
                redshift,
                flag_sfr,
                flag_feedback,
                npart_total,
                flag_cooling,
                num_files,
                box_size,
                omega0,
                omega_lambda,
                hubble_param,
                flag_stellarage,
                flag_metals,
                hashtabsize,
                npart_total_high_word,
            },
        ))
    }

    /// Read the framed header record from the start of a snapshot.
    ///
    /// Both record markers must hold 256; the reader is left on the first byte
    /// of the position block.
    ///
    /// Arguments
    /// -----------------
    /// * `reader`: Source positioned at the beginning of the file.
    ///
    /// Return
    /// ----------
    /// * The decoded [`SnapshotHeader`], or a format error if a marker is wrong or the
    ///   file is shorter than the header record.
    ///
    /// See also
    /// ------------
    /// * [`Self::parse`] – Field decoder for the raw payload.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, LGadgetError> {
        let mut buffer = [0u8; HEADER_SIZE];
        read_record(reader, Block::Header, &mut buffer)?;

        let (_, header) = SnapshotHeader::parse(&buffer)
            .map_err(|err| LGadgetError::NomParsingError(err.to_string()))?;

        debug!(
            "decoded header: npart={:?}, num_files={}, box_size={}",
            header.npart, header.num_files, header.box_size
        );
        Ok(header)
    }

    /// Number of particles stored in this file's particle blocks.
    ///
    /// Only the first five types are counted; the sixth never has particle data
    /// in LGadget-2 lightcone files.
    pub fn particles_in_file(&self) -> u64 {
        self.npart[..N_COUNTED_TYPES]
            .iter()
            .map(|&n| n as u64)
            .sum()
    }

    /// Total number of type‑1 particles across all files of the snapshot.
    ///
    /// The on-disk count is split into a low and a high 32‑bit word.
    pub fn total_particle_count(&self) -> u64 {
        self.npart_total[TOTAL_COUNT_TYPE] as u64
            + ((self.npart_total_high_word[TOTAL_COUNT_TYPE] as u64) << 32)
    }
}

impl fmt::Display for SnapshotHeader {
    /// Render a fixed-width table with the fields used downstream.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LABEL_WIDTH: usize = 18;
        const VALUE_WIDTH: usize = 50;

        let border = format!(
            "+{:-<label$}+{:-<value$}+",
            "",
            "",
            label = LABEL_WIDTH + 1,
            value = VALUE_WIDTH + 1
        );

        let fields = [
            ("Particles (file)", format!("{:?}", self.npart)),
            (
                "Particles (total)",
                self.total_particle_count().to_string(),
            ),
            ("Mass table", format!("{:?}", self.mass)),
            ("Scale factor", self.time.to_string()),
            ("Redshift", self.redshift.to_string()),
            ("Files", self.num_files.to_string()),
            ("Box size", self.box_size.to_string()),
            ("Omega0", self.omega0.to_string()),
            ("OmegaLambda", self.omega_lambda.to_string()),
            ("HubbleParam", self.hubble_param.to_string()),
        ];

        writeln!(f, "{border}")?;
        writeln!(
            f,
            "| {:<label$}| {:<value$}|",
            "LGadget-2 Header",
            "",
            label = LABEL_WIDTH,
            value = VALUE_WIDTH
        )?;
        writeln!(f, "{border}")?;

        for (label, value) in fields {
            writeln!(
                f,
                "| {:<label$}| {:<value$}|",
                label,
                value,
                label = LABEL_WIDTH,
                value = VALUE_WIDTH
            )?;
        }

        writeln!(f, "{border}")
    }
}

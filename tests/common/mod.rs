#![allow(dead_code)]

use camino::Utf8PathBuf;
use tempfile::TempDir;

/// Header fields written by [`SnapshotWriter`]; everything else is zero.
#[derive(Debug, Clone)]
pub struct HeaderFields {
    pub npart: [u32; 6],
    pub mass: [f64; 6],
    pub time: f64,
    pub redshift: f64,
    pub npart_total: [u32; 6],
    pub num_files: i32,
    pub box_size: f64,
    pub omega0: f64,
    pub omega_lambda: f64,
    pub hubble_param: f64,
    pub npart_total_high_word: [u32; 6],
}

impl Default for HeaderFields {
    fn default() -> Self {
        HeaderFields {
            npart: [0; 6],
            mass: [0.0; 6],
            time: 1.0,
            redshift: 0.0,
            npart_total: [0; 6],
            num_files: 1,
            box_size: 100.0,
            omega0: 0.3,
            omega_lambda: 0.7,
            hubble_param: 0.7,
            npart_total_high_word: [0; 6],
        }
    }
}

impl HeaderFields {
    pub fn payload(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(256);
        self.npart.iter().for_each(|v| bytes.extend(v.to_ne_bytes()));
        self.mass.iter().for_each(|v| bytes.extend(v.to_ne_bytes()));
        bytes.extend(self.time.to_ne_bytes());
        bytes.extend(self.redshift.to_ne_bytes());
        bytes.extend(0i32.to_ne_bytes()); // flag_sfr
        bytes.extend(0i32.to_ne_bytes()); // flag_feedback
        self.npart_total
            .iter()
            .for_each(|v| bytes.extend(v.to_ne_bytes()));
        bytes.extend(0i32.to_ne_bytes()); // flag_cooling
        bytes.extend(self.num_files.to_ne_bytes());
        bytes.extend(self.box_size.to_ne_bytes());
        bytes.extend(self.omega0.to_ne_bytes());
        bytes.extend(self.omega_lambda.to_ne_bytes());
        bytes.extend(self.hubble_param.to_ne_bytes());
        bytes.extend(0i32.to_ne_bytes()); // flag_stellarage
        bytes.extend(0i32.to_ne_bytes()); // flag_metals
        bytes.extend(0i32.to_ne_bytes()); // hashtabsize
        self.npart_total_high_word
            .iter()
            .for_each(|v| bytes.extend(v.to_ne_bytes()));
        bytes.resize(256, 0);
        bytes
    }
}

/// Builds LGadget-2 snapshot bytes record by record.
#[derive(Debug, Default)]
pub struct SnapshotWriter {
    bytes: Vec<u8>,
}

impl SnapshotWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record with explicit leading and trailing markers.
    pub fn raw_record(mut self, leading: u32, payload: &[u8], trailing: u32) -> Self {
        self.bytes.extend(leading.to_ne_bytes());
        self.bytes.extend_from_slice(payload);
        self.bytes.extend(trailing.to_ne_bytes());
        self
    }

    pub fn record(self, payload: &[u8]) -> Self {
        let len = payload.len() as u32;
        self.raw_record(len, payload, len)
    }

    pub fn header(self, fields: &HeaderFields) -> Self {
        self.record(&fields.payload())
    }

    pub fn vectors(self, values: &[[f32; 3]]) -> Self {
        self.record(&vector_bytes(values))
    }

    pub fn ids(self, ids: &[u64]) -> Self {
        let payload: Vec<u8> = ids.iter().flat_map(|id| id.to_ne_bytes()).collect();
        self.record(&payload)
    }

    pub fn truncate(mut self, len: usize) -> Self {
        self.bytes.truncate(len);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the snapshot into a fresh temporary directory.
    ///
    /// The directory is removed when the returned [`TempDir`] is dropped.
    pub fn write(self, name: &str) -> (TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        std::fs::write(&path, &self.bytes).unwrap();
        (dir, path)
    }
}

pub fn vector_bytes(values: &[[f32; 3]]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| v.iter().flat_map(|c| c.to_ne_bytes()))
        .collect()
}

/// A two-particle snapshot with velocities and ids.
pub fn two_particle_snapshot() -> SnapshotWriter {
    let header = HeaderFields {
        npart: [2, 0, 0, 0, 0, 0],
        npart_total: [0, 2, 0, 0, 0, 0],
        box_size: 100.0,
        ..HeaderFields::default()
    };

    SnapshotWriter::new()
        .header(&header)
        .vectors(&[[-10.0, 5.0, 105.0], [50.0, 50.0, 50.0]])
        .vectors(&[[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]])
        .ids(&[1001, 1002])
}

//! One-value header queries.
//!
//! Each accessor opens the snapshot, decodes the header through
//! [`LGadget::read_header`], closes the file and returns a single field. They
//! fail exactly like the header decoder and add no validation of their own.
//!
//! ```rust, no_run
//! use camino::Utf8Path;
//! use lgadget::lgadget::LGadget;
//!
//! let reader = LGadget::default();
//! let path = Utf8Path::new("lightcone_042.0");
//! let a = reader.scale_factor(path).unwrap();
//! let l = reader.box_size(path).unwrap();
//! ```
use camino::Utf8Path;

use crate::{constants::CodeLength, lgadget::LGadget, lgadget_errors::LGadgetError};

impl LGadget {
    /// Total number of type‑1 particles of the whole snapshot, all files included.
    ///
    /// Combines the low and high 32‑bit words stored in the header, so counts above
    /// 2^32 are supported.
    pub fn total_particle_count(&self, path: &Utf8Path) -> Result<u64, LGadgetError> {
        Ok(self.read_header(path)?.total_particle_count())
    }

    /// Number of files the snapshot is split into.
    pub fn file_count(&self, path: &Utf8Path) -> Result<i32, LGadgetError> {
        Ok(self.read_header(path)?.num_files)
    }

    /// Matter density parameter Ω_m.
    pub fn matter_density(&self, path: &Utf8Path) -> Result<f64, LGadgetError> {
        Ok(self.read_header(path)?.omega0)
    }

    /// Cosmological scale factor of the snapshot.
    pub fn scale_factor(&self, path: &Utf8Path) -> Result<f64, LGadgetError> {
        Ok(self.read_header(path)?.time)
    }

    /// Edge length of the periodic box (the period used to wrap positions).
    pub fn box_size(&self, path: &Utf8Path) -> Result<CodeLength, LGadgetError> {
        Ok(self.read_header(path)?.box_size)
    }

    /// Redshift of the snapshot.
    pub fn redshift(&self, path: &Utf8Path) -> Result<f64, LGadgetError> {
        Ok(self.read_header(path)?.redshift)
    }

    /// Dimensionless Hubble parameter `h`.
    pub fn hubble_param(&self, path: &Utf8Path) -> Result<f64, LGadgetError> {
        Ok(self.read_header(path)?.hubble_param)
    }
}

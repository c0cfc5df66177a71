//! Reader for a single binary Retrieval Coefficient File (RCF).
//!
//! An RCF holds a header followed by one record per flight level. Each record carries the
//! template brightness temperature statistics and the coefficients that turn a scan into a
//! temperature profile when the aircraft is at that flight level. See [`Rcf::weighted`] for
//! interpolating a record to the actual aircraft altitude.
use crate::error::{
    Result,
    RetrievalError::{self, FlightLevelMismatch, FlightLevelOrder, NoFlightLevels},
};
use itertools::Itertools;
use log::{debug, warn};
use metfor::{Km, Quantity};
use std::path::{Path, PathBuf};

mod codec;
mod flight_level;
mod header;

pub use self::{
    flight_level::{FlightLevel, LEVEL_SPARE_LEN},
    header::{RcfHeader, HEADER_SPARE_LEN, SMATRIX_LEN},
};

/// File extension used for retrieval coefficient files.
pub const RCF_EXTENSION: &str = "RCF";

/// A parsed retrieval coefficient file.
#[derive(Clone, Debug, PartialEq)]
pub struct Rcf {
    id: String,
    path: PathBuf,
    header: RcfHeader,
    flight_levels: Vec<FlightLevel>,
}

/// A flight level record interpolated to an aircraft altitude.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedFlightLevel {
    /// The blended record.
    pub record: FlightLevel,
    /// Index of the flight level above the altitude.
    pub top_index: usize,
    /// Index of the flight level below the altitude.
    pub bottom_index: usize,
    /// Weight given to the upper flight level.
    pub top_weight: f64,
    /// Weight given to the lower flight level.
    pub bottom_weight: f64,
}

impl Rcf {
    /// Read and validate a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_flight_levels(path, None)
    }

    /// Read and validate a file, also requiring its flight levels to match `reference` exactly.
    ///
    /// Flight levels are compared at the single precision they are stored with.
    pub fn open_with_flight_levels<P: AsRef<Path>>(
        path: P,
        reference: Option<&[f64]>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| RetrievalError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_bytes(path, &bytes, reference)
    }

    /// Parse a file already in memory. The id is taken from `path`.
    pub fn from_bytes<P: AsRef<Path>>(
        path: P,
        bytes: &[u8],
        reference: Option<&[f64]>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let format_err = |message: String| RetrievalError::Format {
            path: path.to_path_buf(),
            message,
        };

        let (mut input, header) =
            RcfHeader::parse(bytes).map_err(|err| format_err(format!("header: {}", err)))?;

        let num_brt_temps = header.num_brt_temps();
        let num_retr_lvls = header.nret();
        if usize::from(header.nobs) != num_brt_temps {
            warn!(
                "{}: Nobs is {} but Nlo * Nel is {}, using {}",
                path.display(),
                header.nobs,
                num_brt_temps,
                num_brt_temps
            );
        }

        let mut flight_levels = Vec::with_capacity(header.nfl());
        for i in 0..header.nfl() {
            let (rest, level) = FlightLevel::parse(input, num_brt_temps, num_retr_lvls)
                .map_err(|err| format_err(format!("flight level {}: {}", i, err)))?;
            flight_levels.push(level);
            input = rest;
        }

        let rcf = Self::from_parts(path, header, flight_levels, reference)?;
        debug!(
            "Read RCF {} with {} flight levels, {} observables and {} retrieval levels",
            rcf.id,
            rcf.header.nfl(),
            num_brt_temps,
            num_retr_lvls
        );

        Ok(rcf)
    }

    /// Build an RCF from its parts, applying the same validation as reading a file.
    pub fn from_parts<P: AsRef<Path>>(
        path: P,
        header: RcfHeader,
        flight_levels: Vec<FlightLevel>,
        reference: Option<&[f64]>,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let rcf = Rcf {
            id,
            path,
            header,
            flight_levels,
        };
        rcf.validate(reference)?;

        Ok(rcf)
    }

    fn validate(&self, reference: Option<&[f64]>) -> Result<()> {
        let zr = &self.header.zr;

        if zr.is_empty() {
            return Err(NoFlightLevels {
                id: self.id.clone(),
            });
        }

        if !is_strictly_decreasing(zr) {
            return Err(FlightLevelOrder {
                id: self.id.clone(),
                levels: zr.clone(),
            });
        }

        if let Some(expected) = reference {
            if !same_flight_levels(zr, expected) {
                return Err(FlightLevelMismatch {
                    id: self.id.clone(),
                    expected: expected.to_vec(),
                    found: zr.clone(),
                });
            }
        }

        let (num_brt_temps, num_retr_lvls) = (self.num_brt_temps(), self.num_retr_lvls());
        if self.flight_levels.len() != zr.len()
            || !self
                .flight_levels
                .iter()
                .all(|lvl| lvl.is_consistent(num_brt_temps, num_retr_lvls))
        {
            return Err(RetrievalError::InconsistentDimensions {
                id: self.id.clone(),
            });
        }

        Ok(())
    }

    /// Encode in the binary RCF layout.
    ///
    /// Fails if an array is too long for its count field.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = vec![];
        self.header.write(&mut out)?;
        for level in &self.flight_levels {
            level.write(&mut out);
        }
        Ok(out)
    }

    /// The file name without its extension.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where this file was read from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file header.
    #[inline]
    pub fn header(&self) -> &RcfHeader {
        &self.header
    }

    /// The flight level records, in the same order as the flight level altitudes.
    #[inline]
    pub fn flight_levels(&self) -> &[FlightLevel] {
        &self.flight_levels
    }

    /// The flight level altitudes, km, highest first.
    #[inline]
    pub fn flight_level_altitudes(&self) -> &[f64] {
        &self.header.zr
    }

    /// Number of brightness temperatures in a scan, `NUM_BRT_TEMPS`.
    #[inline]
    pub fn num_brt_temps(&self) -> usize {
        self.header.num_brt_temps()
    }

    /// Number of levels in a retrieved profile, `NUM_RETR_LVLS`.
    #[inline]
    pub fn num_retr_lvls(&self) -> usize {
        self.header.nret()
    }

    /// Interpolate the flight level records to the aircraft altitude.
    ///
    /// At or above the highest flight level the top record is returned unchanged, at or below
    /// the lowest the bottom record is. In between the two bracketing records are blended
    /// linearly in altitude.
    pub fn weighted(&self, altitude: Km) -> WeightedFlightLevel {
        let zr = &self.header.zr;
        let alt = altitude.unpack();
        let last = self.flight_levels.len() - 1;

        let unchanged = |index: usize| WeightedFlightLevel {
            record: self.flight_levels[index].clone(),
            top_index: index,
            bottom_index: index,
            top_weight: 1.0,
            bottom_weight: 0.0,
        };

        if alt >= zr[0] {
            return unchanged(0);
        }
        if alt <= zr[last] {
            return unchanged(last);
        }

        zr.iter()
            .tuple_windows::<(_, _)>()
            // Find the pair of levels bracketing the altitude.
            .position(|(&top, &bottom)| top > alt && alt >= bottom)
            .map(|i| {
                let (z_top, z_bottom) = (zr[i], zr[i + 1]);
                let bottom_weight = 1.0 - (alt - z_bottom) / (z_top - z_bottom);
                let top_weight = 1.0 - bottom_weight;

                WeightedFlightLevel {
                    record: FlightLevel::blend(
                        &self.flight_levels[i],
                        &self.flight_levels[i + 1],
                        top_weight,
                        bottom_weight,
                    ),
                    top_index: i,
                    bottom_index: i + 1,
                    top_weight,
                    bottom_weight,
                }
            })
            // Only a NaN altitude fails to find a bracket.
            .unwrap_or_else(|| unchanged(last))
    }
}

pub(crate) fn is_strictly_decreasing(vals: &[f64]) -> bool {
    vals.iter().tuple_windows::<(_, _)>().all(|(a, b)| a > b)
}

pub(crate) fn same_flight_levels(found: &[f64], expected: &[f64]) -> bool {
    found.len() == expected.len()
        && found
            .iter()
            .zip(expected)
            .all(|(&f, &e)| f as f32 == e as f32)
}

//! Find tropopauses in a retrieved temperature profile.
//!
//! A tropopause is the lowest level where the lapse rate decreases to 2 K/km or less, provided the
//! average lapse rate between that level and every point within the next 2 km stays at 2 K/km or
//! less too. A second tropopause is only searched for above a layer at least 1 km deep where the
//! average lapse rate exceeds 3 K/km again.
use crate::{interpolation::linear_interp, retriever::Atp};
use itertools::izip;
use metfor::{Kelvin, Km, Quantity};
use optional::Optioned;
use smallvec::SmallVec;

/// Linear lapse rate at or above which a level may be a tropopause, K/km.
pub const LAPSE_RATE_CUTOFF: f64 = -2.0;
/// Average lapse rate below which a layer separates two tropopauses, K/km.
pub const GAP_LAPSE_RATE_CUTOFF: f64 = -3.0;
/// Depth of the layer the average lapse rate must hold over, km.
pub const REFERENCE_LAYER: f64 = 2.0;
/// Depth of the layer separating two tropopauses, km.
pub const GAP_LAYER: f64 = 1.0;
/// Resolution the average lapse rate is checked at, km.
pub const LAYER_STEP: f64 = 0.02;
/// No tropopause below this altitude (about 500 hPa), km.
pub const MIN_TROPOPAUSE_ALTITUDE: f64 = 5.6;

/// A tropopause.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tropopause {
    /// Index of the level in the profile.
    pub index: usize,
    /// Altitude of the level.
    pub altitude: Km,
    /// Temperature at the level.
    pub temperature: Kelvin,
}

/// Lapse rate analysis over a temperature profile with altitude increasing with index.
///
/// Missing levels are kept as `NaN`, so any test that touches one fails.
#[derive(Clone, Debug)]
pub struct TropopauseAnalyzer {
    altitudes: Vec<f64>,
    temperatures: Vec<f64>,
}

impl<'a> From<&'a Atp> for TropopauseAnalyzer {
    fn from(atp: &'a Atp) -> Self {
        TropopauseAnalyzer::new(&atp.altitudes, &atp.temperatures)
    }
}

impl TropopauseAnalyzer {
    /// Create an analyzer from parallel altitude and temperature profiles.
    pub fn new(altitudes: &[Optioned<Km>], temperatures: &[Optioned<Kelvin>]) -> Self {
        debug_assert_eq!(altitudes.len(), temperatures.len());

        let altitudes = altitudes.iter().map(|z| unpack_or_nan(*z)).collect();
        let temperatures = temperatures.iter().map(|t| unpack_or_nan(*t)).collect();

        TropopauseAnalyzer {
            altitudes,
            temperatures,
        }
    }

    /// Number of levels in the profile.
    #[inline]
    pub fn len(&self) -> usize {
        self.altitudes.len()
    }

    /// True if the profile has no levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.altitudes.is_empty()
    }

    /// Find the first pair of levels at or above `start` whose linear lapse rate is at or above
    /// the cutoff.
    ///
    /// Returns the index of the lower level and the lapse rate, K/km.
    pub fn linear_lapse_rate(&self, start: usize) -> Option<(usize, f64)> {
        let zs = self.altitudes.iter().skip(start);
        let ts = self.temperatures.iter().skip(start);

        izip!(zs.clone(), zs.skip(1), ts.clone(), ts.skip(1))
            .map(|(z0, z1, t0, t1)| (t1 - t0) / (z1 - z0))
            .enumerate()
            .find(|&(_, lapse_rate)| lapse_rate >= LAPSE_RATE_CUTOFF)
            .map(|(i, lapse_rate)| (start + i, lapse_rate))
    }

    /// Interpolate the temperature at an altitude using the levels at or above `start`.
    ///
    /// Missing at or below the second level of the profile and above the top.
    pub fn t_interp(&self, altitude: Km, start: usize) -> Optioned<Kelvin> {
        Optioned::from(self.interp(altitude.unpack(), start).map(Kelvin))
    }

    /// The mean lapse rate over the reference layer above `level`, K/km.
    ///
    /// The layer is divided into sub-layers `step` km deep and the temperature interpolated at
    /// every sub-layer boundary. `NaN` if the layer leaves the profile.
    pub fn average_lapse_rate(&self, level: usize, step: Km, start: usize) -> f64 {
        self.cumulative_lapse_rates(level, REFERENCE_LAYER, step.unpack(), start)
            .and_then(|rates| rates.last().copied())
            .unwrap_or(std::f64::NAN)
    }

    /// Find the lowest level at or above `start` that begins a layer at least 1 km deep with an
    /// average lapse rate below the gap cutoff.
    ///
    /// Returns the index of the first level at or above the top of that layer.
    pub fn find_gap(&self, start: usize) -> Option<usize> {
        (start..self.len())
            .find(|&level| {
                self.cumulative_lapse_rates(level, GAP_LAYER, LAYER_STEP, level)
                    .map(|rates| rates.iter().all(|&rate| rate < GAP_LAPSE_RATE_CUTOFF))
                    .unwrap_or(false)
            })
            .and_then(|level| {
                let top = self.altitudes[level] + GAP_LAYER;
                self.altitudes
                    .iter()
                    .skip(level)
                    .position(|&z| z >= top)
                    .map(|i| level + i)
            })
    }

    /// Find a tropopause searching upward from `start`.
    ///
    /// When `start` is not zero a tropopause has already been found, and the search resumes
    /// above the next layer where the lapse rate steepens again, see [`Self::find_gap`].
    pub fn find_tropopause(&self, start: usize) -> Option<Tropopause> {
        let start = if start == 0 {
            0
        } else {
            self.find_gap(start)?
        };

        let lowest = self
            .altitudes
            .iter()
            .position(|&z| z >= MIN_TROPOPAUSE_ALTITUDE)?;
        let mut search = start.max(lowest);

        while let Some((level, _)) = self.linear_lapse_rate(search) {
            let confirmed = self
                .cumulative_lapse_rates(level, REFERENCE_LAYER, LAYER_STEP, level)
                .map(|rates| rates.iter().all(|&rate| rate >= LAPSE_RATE_CUTOFF))
                .unwrap_or(false);

            if confirmed {
                return Some(Tropopause {
                    index: level,
                    altitude: Km(self.altitudes[level]),
                    temperature: Kelvin(self.temperatures[level]),
                });
            }

            search = level + 1;
        }

        None
    }

    /// Find every tropopause in the profile, lowest first.
    pub fn find_tropopauses(&self) -> SmallVec<[Tropopause; 2]> {
        let mut found: SmallVec<[Tropopause; 2]> = SmallVec::new();

        let mut next = self.find_tropopause(0);
        while let Some(tropopause) = next {
            if found.last().map_or(false, |last| last.index >= tropopause.index) {
                break;
            }
            found.push(tropopause);
            next = self.find_tropopause(tropopause.index);
        }

        found
    }

    fn interp(&self, target: f64, start: usize) -> Option<f64> {
        let zs = &self.altitudes;
        let ts = &self.temperatures;

        // Never interpolate at or below the second level with a valid altitude.
        match zs.iter().filter(|z| z.is_finite()).nth(1) {
            Some(&second) if target > second => {}
            _ => return None,
        }

        let first = start.max(1);
        izip!(
            zs.iter().skip(first),
            zs.iter().skip(first + 1),
            ts.iter().skip(first),
            ts.iter().skip(first + 1)
        )
        .find(|&(&z0, &z1, _, _)| z0 < target && target <= z1)
        .map(|(&z0, &z1, &t0, &t1)| {
            linear_interp(Km(target), Km(z0), Km(z1), Kelvin(t0), Kelvin(t1)).unpack()
        })
        .filter(|t| t.is_finite())
    }

    /// The average lapse rate from `level` to every sub-layer boundary in the `layer` km above it.
    fn cumulative_lapse_rates(
        &self,
        level: usize,
        layer: f64,
        step: f64,
        start: usize,
    ) -> Option<Vec<f64>> {
        let (z0, t0) = (*self.altitudes.get(level)?, *self.temperatures.get(level)?);
        if !(z0.is_finite() && t0.is_finite() && step > 0.0) {
            return None;
        }

        // Guard against 2.0 / 0.02 landing just below a whole number.
        let num_steps = (layer / step + 1.0e-9).floor() as usize;
        if num_steps == 0 {
            return None;
        }

        (1..=num_steps)
            .map(|k| {
                let dz = k as f64 * step;
                self.interp(z0 + dz, start).map(|t| (t - t0) / dz)
            })
            .collect()
    }
}

fn unpack_or_nan<T: Quantity + optional::Noned + Copy>(val: Optioned<T>) -> f64 {
    val.into_option()
        .map(|v| v.unpack())
        .unwrap_or(std::f64::NAN)
}

//! Turn a scan into an atmospheric temperature profile.
//!
//! Retrieval is two steps. First the best matching retrieval coefficient file is chosen for the
//! scan and aircraft altitude, then its coefficients, interpolated to that altitude, are applied
//! to the departure of the scan from the template.
use crate::{
    atmosphere::pressure_to_altitude,
    config::RetrieverConfig,
    error::{Result, RetrievalError},
    interpolation::linear_interpolate,
    rcf_set::{BestMatch, RcfSet},
};
use itertools::izip;
use log::{debug, info};
use metfor::{HectoPascal, Kelvin, Km, Quantity};
use optional::{none, some, Optioned};

/// Selects templates and computes profiles from a loaded set of retrieval coefficient files.
///
/// The set is read only after construction, so a retriever can be shared between threads.
#[derive(Clone, Debug)]
pub struct Retriever {
    set: RcfSet,
    tb_bias: f64,
}

/// An atmospheric temperature profile, one value per retrieval level.
///
/// Levels are ordered from the highest pressure to the lowest. A level whose retrieved altitude is
/// not above the ground has both its temperature and altitude missing, but stays in the profile.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Atp {
    /// Retrieved temperatures.
    pub temperatures: Vec<Optioned<Kelvin>>,
    /// Altitudes of the retrieval levels.
    pub altitudes: Vec<Optioned<Km>>,
    /// Pressures of the retrieval levels from the weighted template.
    pub pressures: Vec<HectoPascal>,
}

/// A template match together with the profile retrieved from it.
#[derive(Clone, Debug, PartialEq)]
pub struct Retrieval {
    /// The chosen template and the ranking of every file in the set.
    pub best_match: BestMatch,
    /// The retrieved profile.
    pub atp: Atp,
}

impl Retriever {
    /// Create a retriever for a set, removing `tb_bias` from scans before matching templates.
    pub fn new(set: RcfSet, tb_bias: f64) -> Self {
        Retriever { set, tb_bias }
    }

    /// Load the retrieval coefficient files described by `config` and build a retriever.
    pub fn from_config(config: &RetrieverConfig) -> Result<Self> {
        let set = RcfSet::load_with(config.rcf_dir(), config.ids(), config.flight_levels())?;

        match config.flight_levels() {
            Some(reference) => set.validate_flight_levels(reference)?,
            None if set.is_empty() => return Err(RetrievalError::EmptySet),
            None => {}
        }

        info!(
            "Retriever ready with {} RCFs and a brightness temperature bias of {} K",
            set.len(),
            config.tb_bias()
        );

        Ok(Self::new(set, config.tb_bias()))
    }

    /// The retrieval coefficient files in use.
    #[inline]
    pub fn set(&self) -> &RcfSet {
        &self.set
    }

    /// The brightness temperature bias removed before matching, K.
    #[inline]
    pub fn tb_bias(&self) -> f64 {
        self.tb_bias
    }

    /// Choose the template that best matches a scan taken at `altitude`.
    ///
    /// The altitude is required, a missing, non-finite or non-positive altitude is an error no
    /// matter what is in the set.
    pub fn best_match<A>(&self, scan: &[f64], altitude: A) -> Result<BestMatch>
    where
        Optioned<Km>: From<A>,
    {
        let altitude = validate_altitude(Optioned::from(altitude))?;
        self.set.best_match(scan, altitude, self.tb_bias)
    }

    /// Apply the coefficients of a matched template to a scan.
    pub fn retrieve(&self, scan: &[f64], best_match: &BestMatch) -> Result<Atp> {
        let record = &best_match.weighted.record;
        let num_brt_temps = record.num_brt_temps();
        if scan.len() != num_brt_temps {
            return Err(RetrievalError::ScanLength {
                expected: num_brt_temps,
                found: scan.len(),
            });
        }

        // Departure of the scan from the template.
        let departures: Vec<f64> = izip!(scan, &record.sob_av)
            .map(|(tb, mean)| tb - mean)
            .collect();

        let num_retr_lvls = record.num_retr_lvls();
        let mut atp = Atp {
            temperatures: Vec::with_capacity(num_retr_lvls),
            altitudes: Vec::with_capacity(num_retr_lvls),
            pressures: Vec::with_capacity(num_retr_lvls),
        };

        let coefficients = record.src.chunks(num_brt_temps.max(1));
        for (&mean_t, &p, coeffs) in izip!(&record.srt_av, &record.sbp_rl, coefficients) {
            let t = mean_t
                + coeffs
                    .iter()
                    .zip(&departures)
                    .map(|(c, d)| c * d)
                    .sum::<f64>();
            let z = pressure_to_altitude(HectoPascal(p)).unpack();

            // A level at or below the ground is not physical.
            if z > 0.0 {
                atp.temperatures.push(Optioned::from(Kelvin(t)));
                atp.altitudes.push(some(Km(z)));
            } else {
                atp.temperatures.push(none());
                atp.altitudes.push(none());
            }
            atp.pressures.push(HectoPascal(p));
        }

        debug!(
            "Retrieved {} levels with RCF {}",
            atp.temperatures.len(),
            best_match.id
        );

        Ok(atp)
    }

    /// Match a template and retrieve a profile in one step.
    pub fn retrieve_profile<A>(&self, scan: &[f64], altitude: A) -> Result<Retrieval>
    where
        Optioned<Km>: From<A>,
    {
        let best_match = self.best_match(scan, altitude)?;
        let atp = self.retrieve(scan, &best_match)?;

        Ok(Retrieval { best_match, atp })
    }
}

fn validate_altitude(altitude: Optioned<Km>) -> Result<Km> {
    match altitude.into_option() {
        Some(z) if z.unpack().is_finite() && z.unpack() > 0.0 => Ok(z),
        Some(z) => Err(RetrievalError::InvalidAltitude(z.unpack())),
        None => Err(RetrievalError::InvalidAltitude(std::f64::NAN)),
    }
}

impl Atp {
    /// Number of levels in the profile.
    #[inline]
    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    /// True if the profile has no levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    /// Interpolate the temperature at an altitude. Missing levels are skipped.
    pub fn temperature_at_altitude(&self, altitude: Km) -> Optioned<Kelvin> {
        linear_interpolate(&self.altitudes, &self.temperatures, altitude)
    }
}

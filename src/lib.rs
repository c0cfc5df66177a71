#![warn(missing_docs)]
//! Temperature profile retrievals for an airborne Microwave Temperature Profiler (MTP).
//!
//! An MTP scan is a set of brightness temperatures, a few channels each viewed at a range of
//! elevation angles. Retrieval coefficient files (RCFs), derived offline from radiosonde
//! climatology, describe for each flight level what a scan is expected to look like and how to
//! turn the departure from that expectation into a temperature profile.
//!
//! The main pieces are:
//!
//! * [`Rcf`] reads one binary RCF and interpolates its flight level records to an aircraft
//!   altitude.
//! * [`RcfSet`] holds the RCFs for a campaign and finds the one whose template best matches a
//!   scan.
//! * [`Retriever`] validates the aircraft altitude, chooses a template and computes the
//!   atmospheric temperature profile, [`Atp`].
//! * [`TropopauseAnalyzer`] finds tropopauses in a retrieved profile.
//!
//! ```rust,no_run
//! use metfor::Km;
//! use mtp_retrieval::{Retriever, RetrieverConfig, TropopauseAnalyzer};
//!
//! # fn main() -> mtp_retrieval::Result<()> {
//! let config = RetrieverConfig::new("/data/CSET/RCF").with_ids(&["NRCKA068"]);
//! let retriever = Retriever::from_config(&config)?;
//!
//! # let scan = [250.0; 30];
//! let retrieval = retriever.retrieve_profile(&scan, Km(8.206))?;
//! let tropopauses = TropopauseAnalyzer::from(&retrieval.atp).find_tropopauses();
//! # Ok(())
//! # }
//! ```

//
// API
//
pub use crate::{
    atmosphere::pressure_to_altitude,
    config::RetrieverConfig,
    error::{Result, RetrievalError},
    interpolation::linear_interpolate,
    rcf::{FlightLevel, Rcf, RcfHeader, WeightedFlightLevel, RCF_EXTENSION},
    rcf_set::{template_score, BestMatch, Candidate, RcfSet},
    retriever::{Atp, Retrieval, Retriever},
    tropopause::{Tropopause, TropopauseAnalyzer},
};

/// Lapse rate thresholds and layer depths used to find tropopauses.
pub mod tropopause_constants {
    pub use crate::tropopause::{
        GAP_LAPSE_RATE_CUTOFF, GAP_LAYER, LAPSE_RATE_CUTOFF, LAYER_STEP, MIN_TROPOPAUSE_ALTITUDE,
        REFERENCE_LAYER,
    };
}

/// Binary layout constants for retrieval coefficient files.
pub mod layout {
    pub use crate::rcf::{HEADER_SPARE_LEN, LEVEL_SPARE_LEN, SMATRIX_LEN};
}

//
// Internal use only
//

// Modules
mod atmosphere;
mod config;
mod error;
mod interpolation;
mod rcf;
mod rcf_set;
mod retriever;
mod tropopause;

#[cfg(test)]
mod test_data;

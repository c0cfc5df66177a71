//! A library of retrieval coefficient files and the search for the one that best matches a scan.
//!
//! Every file in a set shares the same flight level grid. For a scan taken at a given aircraft
//! altitude each file's template statistics are interpolated to that altitude, and the scan is
//! scored against the template. The lowest score wins.
use crate::{
    error::{Result, RetrievalError},
    rcf::{is_strictly_decreasing, same_flight_levels, Rcf, WeightedFlightLevel, RCF_EXTENSION},
};
use itertools::{izip, Itertools};
use log::{debug, info, trace};
use metfor::Km;
use std::path::{Path, PathBuf};

/// An ordered collection of retrieval coefficient files.
///
/// The order is the enumeration order when the set was loaded, which breaks ties between equal
/// scores.
#[derive(Clone, Debug, Default)]
pub struct RcfSet {
    rcfs: Vec<Rcf>,
}

/// One file's score in a best match search.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Id of the file.
    pub id: String,
    /// Position of the file in the set.
    pub index: usize,
    /// Match quality, lower is better.
    pub score: f64,
}

/// The result of a best match search.
#[derive(Clone, Debug, PartialEq)]
pub struct BestMatch {
    /// Position of the chosen file in the set.
    pub index: usize,
    /// Id of the chosen file.
    pub id: String,
    /// Where the chosen file was read from.
    pub path: PathBuf,
    /// Match quality of the chosen file, lower is better.
    pub score: f64,
    /// The chosen file's flight level records interpolated to the aircraft altitude.
    pub weighted: WeightedFlightLevel,
    /// Every file in the set, best first.
    pub ranking: Vec<Candidate>,
}

impl RcfSet {
    /// Create a set from files that are already loaded.
    ///
    /// No consistency checks are done, see [`RcfSet::validate_flight_levels`].
    pub fn from_rcfs(rcfs: Vec<Rcf>) -> Self {
        RcfSet { rcfs }
    }

    /// Load every RCF in a directory.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        load_filtered(dir.as_ref(), None, None)
    }

    /// Load only the RCFs with the given ids from a directory.
    ///
    /// Fails naming every requested id that could not be found.
    pub fn load_ids<P, S>(dir: P, ids: &[S]) -> Result<Self>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let ids: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
        load_filtered(dir.as_ref(), Some(&ids[..]), None)
    }

    /// Load RCFs, optionally filtered by id, requiring every file to use the `flight_levels`
    /// grid when one is given.
    pub fn load_with<P, S>(
        dir: P,
        ids: Option<&[S]>,
        flight_levels: Option<&[f64]>,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let ids: Option<Vec<&str>> = ids.map(|ids| ids.iter().map(|id| id.as_ref()).collect());
        load_filtered(dir.as_ref(), ids.as_deref(), flight_levels)
    }

    /// Check every file uses the `reference` flight level grid.
    pub fn validate_flight_levels(&self, reference: &[f64]) -> Result<()> {
        if self.rcfs.is_empty() {
            return Err(RetrievalError::EmptySet);
        }

        for rcf in &self.rcfs {
            let zr = rcf.flight_level_altitudes();
            if !is_strictly_decreasing(zr) {
                return Err(RetrievalError::FlightLevelOrder {
                    id: rcf.id().to_owned(),
                    levels: zr.to_vec(),
                });
            }
            if !same_flight_levels(zr, reference) {
                return Err(RetrievalError::FlightLevelMismatch {
                    id: rcf.id().to_owned(),
                    expected: reference.to_vec(),
                    found: zr.to_vec(),
                });
            }
        }

        Ok(())
    }

    /// Find the file whose template best matches a scan.
    ///
    /// `scan` holds the brightness temperatures channel by channel, each channel from the
    /// highest elevation angle to the lowest. `tb_bias` is removed from every brightness
    /// temperature before comparing.
    pub fn best_match(&self, scan: &[f64], altitude: Km, tb_bias: f64) -> Result<BestMatch> {
        let expected = self
            .rcfs
            .first()
            .ok_or(RetrievalError::EmptySet)?
            .num_brt_temps();
        if scan.len() != expected {
            return Err(RetrievalError::ScanLength {
                expected,
                found: scan.len(),
            });
        }

        let mut scored: Vec<(f64, WeightedFlightLevel)> = self
            .rcfs
            .iter()
            .map(|rcf| {
                let weighted = rcf.weighted(altitude);
                let record = &weighted.record;
                let score = template_score(scan, &record.sob_av, &record.sob_rms, tb_bias);
                (score, weighted)
            })
            .collect();

        let mut ranking: Vec<Candidate> = self
            .rcfs
            .iter()
            .zip(&scored)
            .enumerate()
            .map(|(index, (rcf, (score, _)))| Candidate {
                id: rcf.id().to_owned(),
                index,
                score: *score,
            })
            .collect();
        // Stable, so the earliest file wins a tie.
        ranking.sort_by(|a, b| a.score.total_cmp(&b.score));

        let index = ranking[0].index;
        let rcf = &self.rcfs[index];
        let (score, weighted) = scored.swap_remove(index);
        debug!(
            "Best matching RCF {} with score {:.6} out of {}",
            rcf.id(),
            score,
            ranking.len()
        );

        Ok(BestMatch {
            index,
            id: rcf.id().to_owned(),
            path: rcf.path().to_path_buf(),
            score,
            weighted,
            ranking,
        })
    }

    /// The files in the set, in enumeration order.
    #[inline]
    pub fn rcfs(&self) -> &[Rcf] {
        &self.rcfs
    }

    /// Get a file by id.
    pub fn get(&self, id: &str) -> Option<&Rcf> {
        self.rcfs.iter().find(|rcf| rcf.id() == id)
    }

    /// Ids of the files in the set, in enumeration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rcfs.iter().map(Rcf::id)
    }

    /// Number of files in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.rcfs.len()
    }

    /// True if there are no files in the set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rcfs.is_empty()
    }
}

/// Score how well a scan matches a template, lower is better.
///
/// Each observable is weighted by the inverse square of its template RMS. The score combines the
/// weighted mean and weighted standard deviation of the differences between the scan and the
/// template means. Observables with a missing brightness temperature or without a usable RMS are
/// left out, and if none are left the score is infinite.
pub fn template_score(scan: &[f64], means: &[f64], rms: &[f64], tb_bias: f64) -> f64 {
    let num_brt_temps = means.len() as f64;

    let (sum_weights, sum_diffs, sum_squares, count) = izip!(scan, means, rms)
        // Difference from the template, with the weight from the template RMS
        .map(|(&tb, &mean, &rms)| (tb - tb_bias - mean, rms))
        // Leave out missing values and unusable weights
        .filter(|&(diff, rms)| diff.is_finite() && rms.is_finite() && rms > 0.0)
        .fold((0.0, 0.0, 0.0, 0usize), |acc, (diff, rms)| {
            let (sw, sd, ss, n) = acc;
            let w = 1.0 / (rms * rms);
            (sw + w, sd + w * diff, ss + w * diff * diff, n + 1)
        });

    if count == 0 {
        return std::f64::INFINITY;
    }

    let count = count as f64;
    let mean_diff = sum_diffs / sum_weights;
    let numerator = sum_squares - sum_weights * mean_diff * mean_diff;
    let denominator = (count - 1.0) * sum_weights / count;

    let std_dev = if denominator == 0.0 {
        // A single observable has no spread, the mean difference stands in for it.
        mean_diff
    } else if numerator / denominator <= 0.0 {
        0.0
    } else {
        (numerator / denominator).sqrt()
    };

    8.0 * (mean_diff * mean_diff + std_dev * std_dev).sqrt() / num_brt_temps
}

fn is_rcf_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(RCF_EXTENSION))
            .unwrap_or(false)
}

fn file_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn load_filtered(
    dir: &Path,
    ids: Option<&[&str]>,
    flight_levels: Option<&[f64]>,
) -> Result<RcfSet> {
    let io_err = |source| RetrievalError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::result::Result<_, _>>()
        .map_err(io_err)?;
    paths.retain(|path| {
        let keep = is_rcf_file(path);
        if !keep {
            trace!("Skipping {}, not an RCF", path.display());
        }
        keep
    });
    // Directory order is not stable across platforms.
    paths.sort();

    if let Some(ids) = ids {
        paths.retain(|path| ids.contains(&file_id(path).as_str()));
    }

    let rcfs = paths
        .iter()
        .map(|path| Rcf::open_with_flight_levels(path, flight_levels))
        .collect::<Result<Vec<_>>>()?;

    if let Some(ids) = ids {
        let missing: Vec<String> = ids
            .iter()
            .unique()
            .filter(|&&id| !rcfs.iter().any(|rcf| rcf.id() == id))
            .map(|&id| id.to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(RetrievalError::MissingIds { missing });
        }
    }

    check_consistency(&rcfs)?;
    info!("Loaded {} RCFs from {}", rcfs.len(), dir.display());

    Ok(RcfSet { rcfs })
}

fn check_consistency(rcfs: &[Rcf]) -> Result<()> {
    let first = match rcfs.first() {
        Some(first) => first,
        None => return Ok(()),
    };

    for rcf in &rcfs[1..] {
        if rcf.flight_level_altitudes() != first.flight_level_altitudes() {
            return Err(RetrievalError::InconsistentFlightLevels {
                id: rcf.id().to_owned(),
            });
        }
        if rcf.num_brt_temps() != first.num_brt_temps()
            || rcf.num_retr_lvls() != first.num_retr_lvls()
        {
            return Err(RetrievalError::InconsistentDimensions {
                id: rcf.id().to_owned(),
            });
        }
    }

    Ok(())
}

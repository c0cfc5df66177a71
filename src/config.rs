//! Settings for building a [`Retriever`](crate::Retriever).
use std::path::{Path, PathBuf};

/// Where to find the retrieval coefficient files and how to use them.
///
/// # Examples
///
/// ```rust
/// use mtp_retrieval::RetrieverConfig;
///
/// let config = RetrieverConfig::new("/data/CSET/RCF")
///     .with_ids(&["NRCKA066", "NRCKA068"])
///     .with_flight_levels(vec![13.0, 12.0, 9.5, 8.0, 6.0, 5.0, 3.5, 2.5, 2.0, 1.5, 1.0, 0.5, 0.0])
///     .with_tb_bias(0.5);
///
/// assert_eq!(config.ids().map(|ids| ids.len()), Some(2));
/// assert_eq!(config.tb_bias(), 0.5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RetrieverConfig {
    rcf_dir: PathBuf,
    ids: Option<Vec<String>>,
    flight_levels: Option<Vec<f64>>,
    tb_bias: f64,
}

impl RetrieverConfig {
    /// Use every RCF in `rcf_dir`, with no reference flight levels and no bias.
    pub fn new<P: Into<PathBuf>>(rcf_dir: P) -> Self {
        RetrieverConfig {
            rcf_dir: rcf_dir.into(),
            ids: None,
            flight_levels: None,
            tb_bias: 0.0,
        }
    }

    /// Only use the RCFs with these ids.
    pub fn with_ids<S: AsRef<str>>(self, ids: &[S]) -> Self {
        let ids = ids.iter().map(|id| id.as_ref().to_owned()).collect();
        RetrieverConfig {
            ids: Some(ids),
            ..self
        }
    }

    /// Require every RCF to use exactly these flight levels, km, highest first.
    pub fn with_flight_levels(self, flight_levels: Vec<f64>) -> Self {
        RetrieverConfig {
            flight_levels: Some(flight_levels),
            ..self
        }
    }

    /// Brightness temperature bias removed from scans before matching templates, K.
    pub fn with_tb_bias(mut self, tb_bias: f64) -> Self {
        self.tb_bias = tb_bias;
        self
    }

    /// Directory holding the RCFs.
    #[inline]
    pub fn rcf_dir(&self) -> &Path {
        &self.rcf_dir
    }

    /// The ids to load, if filtered.
    #[inline]
    pub fn ids(&self) -> Option<&[String]> {
        self.ids.as_deref()
    }

    /// The reference flight levels, if any.
    #[inline]
    pub fn flight_levels(&self) -> Option<&[f64]> {
        self.flight_levels.as_deref()
    }

    /// Brightness temperature bias, K.
    #[inline]
    pub fn tb_bias(&self) -> f64 {
        self.tb_bias
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetrieverConfig::new("rcfs");
        assert_eq!(config.rcf_dir(), Path::new("rcfs"));
        assert!(config.ids().is_none());
        assert!(config.flight_levels().is_none());
        assert_eq!(config.tb_bias(), 0.0);
    }

    #[test]
    fn test_builder() {
        let config = RetrieverConfig::new("rcfs")
            .with_tb_bias(-1.25)
            .with_ids(&["NRCKA068"])
            .with_flight_levels(vec![2.0, 1.0]);

        assert_eq!(config.ids(), Some(&["NRCKA068".to_owned()][..]));
        assert_eq!(config.flight_levels(), Some(&[2.0, 1.0][..]));
        assert_eq!(config.tb_bias(), -1.25);
    }
}

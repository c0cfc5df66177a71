//! Per flight level statistics and retrieval coefficients.
use super::codec::{float, floats, put_float, put_floats, Parsed};
use itertools::izip;

/// Number of floats in the spare block of each flight level record.
pub const LEVEL_SPARE_LEN: usize = 3 * 130;

/// Everything an RCF stores for one flight level.
///
/// Arrays indexed by observable have `NUM_BRT_TEMPS` elements, those indexed by retrieval level
/// have `NUM_RETR_LVLS` elements. The coefficient matrix `src` is row-major with
/// `src[level * NUM_BRT_TEMPS + observable]`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FlightLevel {
    /// Base pressure at the flight level, hPa.
    pub sbp: f64,
    /// RMS of the template brightness temperatures, K.
    pub sob_rms: Vec<f64>,
    /// Mean template brightness temperatures, K.
    pub sob_av: Vec<f64>,
    /// Pressure of each retrieval level, hPa.
    pub sbp_rl: Vec<f64>,
    /// Mean temperature at each retrieval level, K.
    pub srt_av: Vec<f64>,
    /// RMS temperature before retrieval, K.
    pub srms_a: Vec<f64>,
    /// RMS temperature error after retrieval, K.
    pub srms_e: Vec<f64>,
    /// Retrieval coefficients.
    pub src: Vec<f64>,
    /// Spare block, always 3*130 floats.
    pub spare: Vec<f64>,
}

impl FlightLevel {
    /// Number of observables.
    #[inline]
    pub fn num_brt_temps(&self) -> usize {
        self.sob_av.len()
    }

    /// Number of retrieval levels.
    #[inline]
    pub fn num_retr_lvls(&self) -> usize {
        self.srt_av.len()
    }

    /// The coefficients for a single retrieval level, one per observable.
    #[inline]
    pub fn coefficients(&self, level: usize) -> Option<&[f64]> {
        let n = self.num_brt_temps();
        self.src.get(level * n..(level + 1) * n)
    }

    /// True if every array has the length its dimension calls for.
    pub(crate) fn is_consistent(&self, num_brt_temps: usize, num_retr_lvls: usize) -> bool {
        self.sob_rms.len() == num_brt_temps
            && self.sob_av.len() == num_brt_temps
            && self.sbp_rl.len() == num_retr_lvls
            && self.srt_av.len() == num_retr_lvls
            && self.srms_a.len() == num_retr_lvls
            && self.srms_e.len() == num_retr_lvls
            && self.src.len() == num_retr_lvls * num_brt_temps
    }

    /// Blend two records, `top_weight * top + bottom_weight * bottom` for every field.
    pub(crate) fn blend(top: &Self, bottom: &Self, top_weight: f64, bottom_weight: f64) -> Self {
        let mix = |t: &[f64], b: &[f64]| -> Vec<f64> {
            izip!(t, b)
                .map(|(t, b)| top_weight * t + bottom_weight * b)
                .collect()
        };

        FlightLevel {
            sbp: top_weight * top.sbp + bottom_weight * bottom.sbp,
            sob_rms: mix(&top.sob_rms, &bottom.sob_rms),
            sob_av: mix(&top.sob_av, &bottom.sob_av),
            sbp_rl: mix(&top.sbp_rl, &bottom.sbp_rl),
            srt_av: mix(&top.srt_av, &bottom.srt_av),
            srms_a: mix(&top.srms_a, &bottom.srms_a),
            srms_e: mix(&top.srms_e, &bottom.srms_e),
            src: mix(&top.src, &bottom.src),
            spare: mix(&top.spare, &bottom.spare),
        }
    }

    pub(crate) fn parse(
        input: &[u8],
        num_brt_temps: usize,
        num_retr_lvls: usize,
    ) -> Parsed<'_, Self> {
        let (input, sbp) = float(input)?;
        let (input, sob_rms) = floats(input, num_brt_temps)?;
        let (input, sob_av) = floats(input, num_brt_temps)?;
        let (input, sbp_rl) = floats(input, num_retr_lvls)?;
        let (input, srt_av) = floats(input, num_retr_lvls)?;
        let (input, srms_a) = floats(input, num_retr_lvls)?;
        let (input, srms_e) = floats(input, num_retr_lvls)?;
        let (input, src) = floats(input, num_retr_lvls * num_brt_temps)?;
        let (input, spare) = floats(input, LEVEL_SPARE_LEN)?;

        // Stored one observable at a time, flip to one retrieval level at a time.
        let src = transpose(&src, num_brt_temps, num_retr_lvls);

        Ok((
            input,
            FlightLevel {
                sbp,
                sob_rms,
                sob_av,
                sbp_rl,
                srt_av,
                srms_a,
                srms_e,
                src,
                spare,
            },
        ))
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        let num_brt_temps = self.num_brt_temps();
        let num_retr_lvls = self.num_retr_lvls();

        put_float(out, self.sbp);
        put_floats(out, &self.sob_rms, num_brt_temps);
        put_floats(out, &self.sob_av, num_brt_temps);
        put_floats(out, &self.sbp_rl, num_retr_lvls);
        put_floats(out, &self.srt_av, num_retr_lvls);
        put_floats(out, &self.srms_a, num_retr_lvls);
        put_floats(out, &self.srms_e, num_retr_lvls);

        let stored = transpose(&self.src, num_retr_lvls, num_brt_temps);
        put_floats(out, &stored, num_retr_lvls * num_brt_temps);
        put_floats(out, &self.spare, LEVEL_SPARE_LEN);
    }
}

/// Transpose a row-major `rows x cols` matrix into a row-major `cols x rows` matrix.
pub(crate) fn transpose(vals: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    debug_assert_eq!(vals.len(), rows * cols);

    let mut out = vec![0.0; vals.len()];
    for (i, &val) in vals.iter().enumerate() {
        let (row, col) = (i / cols, i % cols);
        out[col * rows + row] = val;
    }
    out
}

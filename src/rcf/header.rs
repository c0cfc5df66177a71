//! The header block at the front of every retrieval coefficient file.
use super::codec::{
    block, float, floats, put_block, put_float, put_floats, put_u16, uint, Parsed,
};
use crate::error::{Result, RetrievalError};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::convert::TryFrom;

/// Number of floats in the header spare block.
pub const HEADER_SPARE_LEN: usize = 130;
/// Number of floats in each of the `SmatrixN1` and `SmatrixN2` blocks.
pub const SMATRIX_LEN: usize = 15 * 3 * 10;

const CREATION_TIME_LEN: usize = 8;
const FILENAME_LEN: usize = 80;

/// Header of a retrieval coefficient file.
///
/// The counts `Nret`, `NFL`, `Nlo`, `Nel` and `Nif` are not stored separately, they are the
/// lengths of the arrays they dimension.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RcfHeader {
    /// Format version.
    pub rc_format: u16,
    /// Raw creation time block, an OLE automation date. See [`RcfHeader::creation_time`].
    pub creation_date_time: [u8; CREATION_TIME_LEN],
    /// Raw, padded name of the RAOB file the coefficients were derived from.
    pub raob_filename: Vec<u8>,
    /// Raw, padded name this file was written under.
    pub rc_filename: Vec<u8>,
    /// Number of RAOBs used to build the coefficients.
    pub raob_count: u16,
    /// Lapse rate used to extend RAOBs below `zlrb`, K/km.
    pub lr1: f64,
    /// Altitude where the extension lapse rate changes, km.
    pub zlrb: f64,
    /// Lapse rate used to extend RAOBs above `zlrb`, K/km.
    pub lr2: f64,
    /// RAOB record step.
    pub record_step: u16,
    /// First RAOB record used.
    pub record_start: u16,
    /// Last RAOB record used.
    pub record_stop: u16,
    /// Minimum number of RAOBs required.
    pub raob_min: u16,
    /// Minimum RAOB top altitude, km.
    pub ztop_min: f64,
    /// Maximum RAOB top altitude, km.
    pub ztop_max: f64,
    /// Minimum RAOB surface altitude, km.
    pub surface_min: f64,
    /// Maximum RAOB surface altitude, km.
    pub surface_max: f64,
    /// Number of observables as recorded by the file writer.
    pub nobs: u16,
    /// Retrieval level offsets from flight level, km. Length `Nret`.
    pub dz: Vec<f64>,
    /// Flight level altitudes in km, strictly decreasing. Length `NFL`.
    pub zr: Vec<f64>,
    /// Local oscillator frequencies, GHz. Length `Nlo`.
    pub lo: Vec<f64>,
    /// Elevation angles, degrees, highest first. Length `Nel`.
    pub el: Vec<f64>,
    /// IF offsets. Length `Nif`.
    pub if_off: Vec<f64>,
    /// IF weights. Length `Nif`.
    pub if_wt: Vec<f64>,
    /// Brightness temperature bias correction, K.
    pub tb_bias: f64,
    /// Window loss correction.
    pub window_loss: f64,
    /// Spare block, always 130 floats.
    pub spare: Vec<f64>,
    /// Always 15*3*10 floats.
    pub smatrix_n1: Vec<f64>,
    /// Always 15*3*10 floats.
    pub smatrix_n2: Vec<f64>,
}

impl RcfHeader {
    /// Number of retrieval levels, `Nret`.
    #[inline]
    pub fn nret(&self) -> usize {
        self.dz.len()
    }

    /// Number of flight levels, `NFL`.
    #[inline]
    pub fn nfl(&self) -> usize {
        self.zr.len()
    }

    /// Number of brightness temperatures per scan, `Nlo * Nel`.
    #[inline]
    pub fn num_brt_temps(&self) -> usize {
        self.lo.len() * self.el.len()
    }

    /// Source RAOB file name with the padding removed.
    pub fn raob_filename_str(&self) -> String {
        trim_padded(&self.raob_filename)
    }

    /// File name recorded by the writer with the padding removed.
    pub fn rc_filename_str(&self) -> String {
        trim_padded(&self.rc_filename)
    }

    /// Decode the creation time, stored as days since 1899-12-30.
    ///
    /// Returns `None` if the block does not hold a plausible date.
    pub fn creation_time(&self) -> Option<NaiveDateTime> {
        let days = f64::from_le_bytes(self.creation_date_time);
        if !days.is_finite() || days.abs() > 1.0e7 {
            return None;
        }

        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        let millis = (days * 86_400_000.0).round() as i64;
        epoch.checked_add_signed(Duration::milliseconds(millis))
    }

    /// Store `time` in the creation time block.
    pub fn set_creation_time(&mut self, time: NaiveDateTime) {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(time);
        let days = (time - epoch).num_milliseconds() as f64 / 86_400_000.0;
        self.creation_date_time = days.to_le_bytes();
    }

    pub(crate) fn parse(input: &[u8]) -> Parsed<'_, Self> {
        let (input, rc_format) = uint(input)?;
        let (input, created) = block(input, CREATION_TIME_LEN)?;
        let (input, raob_filename) = block(input, FILENAME_LEN)?;
        let (input, rc_filename) = block(input, FILENAME_LEN)?;
        let (input, raob_count) = uint(input)?;
        let (input, lr1) = float(input)?;
        let (input, zlrb) = float(input)?;
        let (input, lr2) = float(input)?;
        let (input, record_step) = uint(input)?;
        let (input, record_start) = uint(input)?;
        let (input, record_stop) = uint(input)?;
        let (input, raob_min) = uint(input)?;
        let (input, ztop_min) = float(input)?;
        let (input, ztop_max) = float(input)?;
        let (input, surface_min) = float(input)?;
        let (input, surface_max) = float(input)?;

        let (input, nobs) = uint(input)?;
        let (input, nret) = uint(input)?;
        let (input, dz) = floats(input, usize::from(nret))?;
        let (input, nfl) = uint(input)?;
        let (input, zr) = floats(input, usize::from(nfl))?;
        let (input, nlo) = uint(input)?;
        let (input, lo) = floats(input, usize::from(nlo))?;
        let (input, nel) = uint(input)?;
        let (input, el) = floats(input, usize::from(nel))?;
        let (input, nif) = uint(input)?;
        let (input, if_off) = floats(input, usize::from(nif))?;
        let (input, if_wt) = floats(input, usize::from(nif))?;

        let (input, tb_bias) = float(input)?;
        let (input, window_loss) = float(input)?;
        let (input, spare) = floats(input, HEADER_SPARE_LEN)?;
        let (input, smatrix_n1) = floats(input, SMATRIX_LEN)?;
        let (input, smatrix_n2) = floats(input, SMATRIX_LEN)?;

        let mut creation_date_time = [0u8; CREATION_TIME_LEN];
        creation_date_time.copy_from_slice(created);

        Ok((
            input,
            RcfHeader {
                rc_format,
                creation_date_time,
                raob_filename: raob_filename.to_vec(),
                rc_filename: rc_filename.to_vec(),
                raob_count,
                lr1,
                zlrb,
                lr2,
                record_step,
                record_start,
                record_stop,
                raob_min,
                ztop_min,
                ztop_max,
                surface_min,
                surface_max,
                nobs,
                dz,
                zr,
                lo,
                el,
                if_off,
                if_wt,
                tb_bias,
                window_loss,
                spare,
                smatrix_n1,
                smatrix_n2,
            },
        ))
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        put_u16(out, self.rc_format);
        out.extend_from_slice(&self.creation_date_time);
        put_block(out, &self.raob_filename, FILENAME_LEN);
        put_block(out, &self.rc_filename, FILENAME_LEN);
        put_u16(out, self.raob_count);
        put_float(out, self.lr1);
        put_float(out, self.zlrb);
        put_float(out, self.lr2);
        put_u16(out, self.record_step);
        put_u16(out, self.record_start);
        put_u16(out, self.record_stop);
        put_u16(out, self.raob_min);
        put_float(out, self.ztop_min);
        put_float(out, self.ztop_max);
        put_float(out, self.surface_min);
        put_float(out, self.surface_max);

        put_u16(out, self.nobs);
        put_count(out, "dz", self.dz.len())?;
        put_floats(out, &self.dz, self.dz.len());
        put_count(out, "zr", self.zr.len())?;
        put_floats(out, &self.zr, self.zr.len());
        put_count(out, "lo", self.lo.len())?;
        put_floats(out, &self.lo, self.lo.len());
        put_count(out, "el", self.el.len())?;
        put_floats(out, &self.el, self.el.len());
        put_count(out, "if_off", self.if_off.len())?;
        put_floats(out, &self.if_off, self.if_off.len());
        put_floats(out, &self.if_wt, self.if_off.len());

        put_float(out, self.tb_bias);
        put_float(out, self.window_loss);
        put_floats(out, &self.spare, HEADER_SPARE_LEN);
        put_floats(out, &self.smatrix_n1, SMATRIX_LEN);
        put_floats(out, &self.smatrix_n2, SMATRIX_LEN);

        Ok(())
    }
}

fn put_count(out: &mut Vec<u8>, field: &'static str, len: usize) -> Result<()> {
    let count = u16::try_from(len).map_err(|_| RetrievalError::CountOverflow { field, len })?;
    put_u16(out, count);
    Ok(())
}

fn trim_padded(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_creation_time() {
        let mut hdr = RcfHeader::default();
        assert_eq!(
            hdr.creation_time().map(|t| t.to_string()).as_deref(),
            Some("1899-12-30 00:00:00")
        );

        let when = NaiveDate::from_ymd_opt(2015, 7, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .unwrap();
        hdr.set_creation_time(when);
        assert_eq!(hdr.creation_time(), Some(when));

        hdr.creation_date_time = f64::NAN.to_le_bytes();
        assert!(hdr.creation_time().is_none());
    }

    #[test]
    fn test_trim_padded() {
        let mut raw = b"CSET_RAOBs.RAOB2".to_vec();
        raw.resize(FILENAME_LEN, 0);
        assert_eq!(trim_padded(&raw), "CSET_RAOBs.RAOB2");

        let mut raw = b"NRCKA068.RCF".to_vec();
        raw.resize(FILENAME_LEN, b' ');
        assert_eq!(trim_padded(&raw), "NRCKA068.RCF");
    }

    #[test]
    fn test_header_counts() {
        let hdr = crate::test_data::make_header(3, 10, 33, &[13.0, 8.0, 0.0]);
        assert_eq!(hdr.num_brt_temps(), 30);
        assert_eq!(hdr.nret(), 33);
        assert_eq!(hdr.nfl(), 3);

        let mut bytes = vec![];
        hdr.write(&mut bytes).unwrap();
        let (rest, parsed) = RcfHeader::parse(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, hdr);
    }

    #[test]
    fn test_count_overflow() {
        let mut hdr = crate::test_data::make_header(3, 10, 33, &[13.0, 8.0, 0.0]);
        hdr.dz = vec![0.0; usize::from(u16::MAX) + 1];

        let mut bytes = vec![];
        match hdr.write(&mut bytes) {
            Err(RetrievalError::CountOverflow { field, len }) => {
                assert_eq!(field, "dz");
                assert_eq!(len, 65536);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

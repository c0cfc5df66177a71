//! Data used in tests.
//!
//! The retrieval coefficient files here are synthetic. Every value is representable as an `f32`
//! so files survive a trip through the binary layout unchanged.
use crate::rcf::{FlightLevel, Rcf, RcfHeader, HEADER_SPARE_LEN, LEVEL_SPARE_LEN, SMATRIX_LEN};

/// Flight levels used by the CSET campaign RCFs, km.
pub const CSET_FLIGHT_LEVELS: [f64; 13] = [
    13.0, 12.0, 9.5, 8.0, 6.0, 5.0, 3.5, 2.5, 2.0, 1.5, 1.0, 0.5, 0.0,
];

const NUM_LO: usize = 3;
const NUM_EL: usize = 10;
const NUM_RETR_LVLS: usize = 33;

/// Round to single precision.
pub fn single(val: f64) -> f64 {
    f64::from(val as f32)
}

pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
    assert!(eps > 0.0);

    (val1 - val2).abs() < eps
}

pub fn make_header(nlo: usize, nel: usize, nret: usize, zr: &[f64]) -> RcfHeader {
    let mut raob_filename = b"CSET_RAOBs.RAOB2".to_vec();
    raob_filename.resize(80, 0);
    let mut rc_filename = b"NRCTEST1.RCF".to_vec();
    rc_filename.resize(80, b' ');

    RcfHeader {
        rc_format: 2,
        raob_filename,
        rc_filename,
        raob_count: 400,
        lr1: single(-6.5),
        zlrb: single(11.0),
        lr2: single(1.0),
        record_step: 1,
        record_start: 1,
        record_stop: 400,
        raob_min: 10,
        ztop_min: single(20.0),
        ztop_max: single(40.0),
        surface_min: 0.0,
        surface_max: single(0.5),
        nobs: (nlo * nel) as u16,
        dz: (0..nret).map(|l| single(-3.0 + 0.25 * l as f64)).collect(),
        zr: zr.iter().copied().map(single).collect(),
        lo: (0..nlo).map(|i| single(55.51 + 1.5 * i as f64)).collect(),
        el: (0..nel).map(|i| single(80.0 - 160.0 * i as f64 / nel as f64)).collect(),
        if_off: vec![single(0.055), single(0.105), single(0.155)],
        if_wt: vec![single(0.3), single(0.4), single(0.3)],
        tb_bias: 0.0,
        window_loss: single(0.01),
        spare: vec![0.0; HEADER_SPARE_LEN],
        smatrix_n1: (0..SMATRIX_LEN).map(|i| single(i as f64 * 0.001)).collect(),
        smatrix_n2: (0..SMATRIX_LEN).map(|i| single(-(i as f64) * 0.001)).collect(),
        ..RcfHeader::default()
    }
}

/// A flight level record whose values all depend on `seed`.
pub fn make_flight_level(seed: usize, nbrt: usize, nret: usize) -> FlightLevel {
    let s = seed as f64;

    FlightLevel {
        sbp: single(180.0 + 60.0 * s),
        sob_rms: (0..nbrt).map(|j| single(0.5 + 0.05 * j as f64)).collect(),
        sob_av: (0..nbrt)
            .map(|j| single(225.0 + 2.0 * s + 0.75 * (j % 10) as f64 + 0.1 * j as f64))
            .collect(),
        sbp_rl: (0..nret)
            .map(|l| single(1013.0 * (-0.13 * l as f64).exp()))
            .collect(),
        srt_av: (0..nret)
            .map(|l| single(288.0 + 0.5 * s - 2.5 * l as f64))
            .collect(),
        srms_a: vec![5.0; nret],
        srms_e: (0..nret).map(|l| single(1.0 + 0.01 * l as f64)).collect(),
        src: (0..nret * nbrt)
            .map(|i| {
                let (l, j) = (i / nbrt, i % nbrt);
                single(0.001 * (l + 1) as f64 * ((j % 7) as f64 - 3.0) + 0.0001 * s)
            })
            .collect(),
        spare: (0..LEVEL_SPARE_LEN).map(|i| single(0.5 * i as f64)).collect(),
    }
}

/// An RCF with 3 channels, 10 angles and 33 retrieval levels.
///
/// Each flight level is 2 K warmer than the one above it, and each step in `seed` warms every
/// flight level by another 2 K.
pub fn make_rcf(id: &str, zr: &[f64], seed: usize) -> Rcf {
    let header = make_header(NUM_LO, NUM_EL, NUM_RETR_LVLS, zr);
    let levels = (0..zr.len())
        .map(|i| make_flight_level(seed + i, NUM_LO * NUM_EL, NUM_RETR_LVLS))
        .collect();

    Rcf::from_parts(format!("{}.RCF", id), header, levels, None).expect("valid test RCF")
}

/// A scan that matches the template of `rcf` at `altitude_km` offset by `offset` K.
pub fn make_scan(rcf: &Rcf, altitude_km: f64, offset: f64) -> Vec<f64> {
    rcf.weighted(metfor::Km(altitude_km))
        .record
        .sob_av
        .iter()
        .map(|tb| tb + offset)
        .collect()
}

/// A profile with a -6.5 K/km troposphere up to 12 km and an isothermal stratosphere above.
///
/// Returns (altitudes km, temperatures K).
pub fn make_standard_profile() -> (Vec<f64>, Vec<f64>) {
    let altitudes: Vec<f64> = (0..33).map(|i| 0.5 * i as f64).collect();
    let temperatures = altitudes
        .iter()
        .map(|&z| {
            if z <= 12.0 {
                288.15 - 6.5 * z
            } else {
                288.15 - 6.5 * 12.0
            }
        })
        .collect();

    (altitudes, temperatures)
}

/// A profile with two tropopauses.
///
/// Troposphere to 10 km, an isothermal layer from 10 to 12.5 km, a cooling layer from 12.5 to 15
/// km at -5 K/km and then isothermal again.
pub fn make_double_tropopause_profile() -> (Vec<f64>, Vec<f64>) {
    let altitudes: Vec<f64> = (0..41).map(|i| 0.5 * i as f64).collect();
    let temperatures = altitudes
        .iter()
        .map(|&z| {
            let t10 = 288.15 - 6.5 * 10.0;
            if z <= 10.0 {
                288.15 - 6.5 * z
            } else if z <= 12.5 {
                t10
            } else if z <= 15.0 {
                t10 - 5.0 * (z - 12.5)
            } else {
                t10 - 5.0 * 2.5
            }
        })
        .collect();

    (altitudes, temperatures)
}

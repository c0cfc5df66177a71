#![allow(dead_code)]

use metfor::Km;
use mtp_retrieval::{layout, FlightLevel, Rcf, RcfHeader};
use std::{fs, path::Path};
use tempfile::{tempdir, TempDir};

pub const FLIGHT_LEVELS: [f64; 13] = [
    13.0, 12.0, 9.5, 8.0, 6.0, 5.0, 3.5, 2.5, 2.0, 1.5, 1.0, 0.5, 0.0,
];

pub const NUM_LO: usize = 3;
pub const NUM_EL: usize = 10;
pub const NUM_BRT_TEMPS: usize = NUM_LO * NUM_EL;
pub const NUM_RETR_LVLS: usize = 33;

/// Build a synthetic RCF. Larger seeds give warmer templates.
pub fn make_rcf(id: &str, zr: &[f64], seed: usize) -> Rcf {
    let header = RcfHeader {
        rc_format: 2,
        nobs: NUM_BRT_TEMPS as u16,
        dz: (0..NUM_RETR_LVLS).map(|l| -3.0 + 0.25 * l as f64).collect(),
        zr: zr.to_vec(),
        lo: vec![55.51, 56.65, 58.8],
        el: (0..NUM_EL).map(|i| 80.0 - 16.0 * i as f64).collect(),
        if_off: vec![0.055, 0.105, 0.155],
        if_wt: vec![0.3, 0.4, 0.3],
        spare: vec![0.0; layout::HEADER_SPARE_LEN],
        smatrix_n1: vec![0.0; layout::SMATRIX_LEN],
        smatrix_n2: vec![0.0; layout::SMATRIX_LEN],
        ..RcfHeader::default()
    };

    let levels = (0..zr.len())
        .map(|i| make_flight_level(seed + i, seed))
        .collect();

    Rcf::from_parts(format!("{}.RCF", id), header, levels, None).expect("valid test RCF")
}

fn make_flight_level(level_seed: usize, rcf_seed: usize) -> FlightLevel {
    let s = level_seed as f64;
    let r = rcf_seed as f64;

    FlightLevel {
        sbp: 180.0 + 60.0 * s,
        sob_rms: (0..NUM_BRT_TEMPS).map(|j| 0.5 + 0.05 * j as f64).collect(),
        sob_av: (0..NUM_BRT_TEMPS)
            .map(|j| 225.0 + 2.0 * s + 0.75 * (j % NUM_EL) as f64 + 0.5 * (j / NUM_EL) as f64)
            .collect(),
        sbp_rl: (0..NUM_RETR_LVLS)
            .map(|l| 1013.0 * (-0.13 * l as f64).exp())
            .collect(),
        // Troposphere up to level 20, isothermal above.
        srt_av: (0..NUM_RETR_LVLS)
            .map(|l| 288.0 + r - 5.5 * l.min(20) as f64)
            .collect(),
        srms_a: vec![5.0; NUM_RETR_LVLS],
        srms_e: vec![1.0; NUM_RETR_LVLS],
        src: (0..NUM_RETR_LVLS * NUM_BRT_TEMPS)
            .map(|i| 0.001 * ((i % 7) as f64 - 3.0))
            .collect(),
        spare: vec![0.0; layout::LEVEL_SPARE_LEN],
    }
}

/// A scan that exactly matches the template of `rcf` at `altitude_km`.
pub fn make_scan(rcf: &Rcf, altitude_km: f64) -> Vec<f64> {
    rcf.weighted(Km(altitude_km)).record.sob_av
}

/// Write the RCFs into `dir`, named after their ids.
pub fn write_rcfs(dir: &Path, rcfs: &[Rcf]) {
    for rcf in rcfs {
        let path = dir.join(format!("{}.RCF", rcf.id()));
        fs::write(&path, rcf.to_bytes().unwrap()).expect("Error writing test RCF");
    }
}

/// A temporary directory holding three RCFs for the CSET flight levels.
pub fn make_rcf_dir() -> TempDir {
    let dir = tempdir().expect("Error creating temporary directory");
    let rcfs = [
        make_rcf("NRCKA066", &FLIGHT_LEVELS, 0),
        make_rcf("NRCKA067", &FLIGHT_LEVELS, 3),
        make_rcf("NRCKA068", &FLIGHT_LEVELS, 6),
    ];
    write_rcfs(dir.path(), &rcfs);

    dir
}

pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
    assert!(eps > 0.0);

    (val1 - val2).abs() < eps
}

use metfor::Km;
use mtp_retrieval::{layout, FlightLevel, Rcf, RcfHeader, RcfSet};

pub const FLIGHT_LEVELS: [f64; 13] = [
    13.0, 12.0, 9.5, 8.0, 6.0, 5.0, 3.5, 2.5, 2.0, 1.5, 1.0, 0.5, 0.0,
];

const NUM_LO: usize = 3;
const NUM_EL: usize = 10;
const NUM_BRT_TEMPS: usize = NUM_LO * NUM_EL;
const NUM_RETR_LVLS: usize = 33;

/// A set the size of a typical campaign library.
pub fn make_set(num_rcfs: usize) -> RcfSet {
    RcfSet::from_rcfs((0..num_rcfs).map(make_rcf).collect())
}

/// A scan matching the template of the `index`th RCF in the set.
pub fn make_scan(set: &RcfSet, index: usize, altitude_km: f64) -> Vec<f64> {
    set.rcfs()[index].weighted(Km(altitude_km)).record.sob_av
}

fn make_rcf(seed: usize) -> Rcf {
    let header = RcfHeader {
        nobs: NUM_BRT_TEMPS as u16,
        dz: vec![0.0; NUM_RETR_LVLS],
        zr: FLIGHT_LEVELS.to_vec(),
        lo: vec![55.51, 56.65, 58.8],
        el: (0..NUM_EL).map(|i| 80.0 - 16.0 * i as f64).collect(),
        spare: vec![0.0; layout::HEADER_SPARE_LEN],
        smatrix_n1: vec![0.0; layout::SMATRIX_LEN],
        smatrix_n2: vec![0.0; layout::SMATRIX_LEN],
        ..RcfHeader::default()
    };

    let s = seed as f64;
    let levels = (0..FLIGHT_LEVELS.len())
        .map(|i| {
            let z = i as f64;
            FlightLevel {
                sbp: 180.0 + 60.0 * z,
                sob_rms: (0..NUM_BRT_TEMPS).map(|j| 0.5 + 0.05 * j as f64).collect(),
                sob_av: (0..NUM_BRT_TEMPS)
                    .map(|j| 220.0 + 0.5 * s + 2.0 * z + 0.75 * (j % NUM_EL) as f64)
                    .collect(),
                sbp_rl: (0..NUM_RETR_LVLS)
                    .map(|l| 1013.0 * (-0.13 * l as f64).exp())
                    .collect(),
                srt_av: (0..NUM_RETR_LVLS)
                    .map(|l| 288.0 + 0.1 * s - 5.5 * l.min(20) as f64)
                    .collect(),
                srms_a: vec![5.0; NUM_RETR_LVLS],
                srms_e: vec![1.0; NUM_RETR_LVLS],
                src: (0..NUM_RETR_LVLS * NUM_BRT_TEMPS)
                    .map(|k| 0.001 * ((k % 7) as f64 - 3.0))
                    .collect(),
                spare: vec![0.0; layout::LEVEL_SPARE_LEN],
            }
        })
        .collect();

    Rcf::from_parts(format!("NRC{:05}.RCF", seed), header, levels, None)
        .expect("Error building bench RCF")
}

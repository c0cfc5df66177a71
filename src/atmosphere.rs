//! Fixed piecewise model converting pressure to altitude.
//!
//! Each segment is either a constant lapse rate layer, where altitude follows a power law in
//! pressure, or an isothermal layer, where it follows the logarithm of pressure. The segment
//! boundaries follow the standard atmosphere up to the mesosphere and continue with isothermal
//! layers above that. Retrieved profiles are calibrated against exactly these segments.
use metfor::{HectoPascal, Km, Quantity};

/// Gas constant of dry air over gravity, km/K.
const R_OVER_G: f64 = 287.053 / 9.80665 / 1000.0;

/// Pressures at or below zero are clamped to this before conversion, hPa.
const MIN_PRESSURE: f64 = 1.0e-10;

/// One layer of the model.
#[derive(Debug, Clone, Copy)]
struct Segment {
    /// Lowest pressure in the segment, hPa.
    top_pressure: f64,
    /// Pressure at the bottom of the segment, hPa.
    base_pressure: f64,
    /// Altitude at the bottom of the segment, km.
    base_altitude: f64,
    /// Temperature at the bottom of the segment, K.
    base_temperature: f64,
    /// Lapse rate, K/km. Zero for isothermal segments.
    lapse_rate: f64,
}

impl Segment {
    #[inline]
    fn altitude(&self, pressure: f64) -> f64 {
        let Segment {
            base_pressure: pb,
            base_altitude: zb,
            base_temperature: tb,
            lapse_rate: lr,
            ..
        } = *self;

        if lr == 0.0 {
            zb + R_OVER_G * tb * (pb / pressure).ln()
        } else {
            zb + tb / lr * ((pressure / pb).powf(-lr * R_OVER_G) - 1.0)
        }
    }
}

macro_rules! segment {
    ($top:expr, $pb:expr, $zb:expr, $tb:expr, $lr:expr) => {
        Segment {
            top_pressure: $top,
            base_pressure: $pb,
            base_altitude: $zb,
            base_temperature: $tb,
            lapse_rate: $lr,
        }
    };
}

/// Ordered from the surface up.
///
/// The first seven segments are the standard atmosphere up to 0.00146 hPa. The five above that
/// are an extrapolation: isothermal layers at assumed temperatures (187, 195, 215, 250 and
/// 300 K), not taken from any published model, with base altitudes picked only so altitude is
/// continuous across each boundary. Treat altitudes above about 86 km as rough.
const SEGMENTS: [Segment; 12] = [
    segment!(226.3206, 1013.25, 0.0, 288.15, -6.5),
    segment!(54.7489, 226.3206, 11.0, 216.65, 0.0),
    segment!(8.68019, 54.7489, 20.0, 216.65, 1.0),
    segment!(1.10906, 8.68019, 32.0, 228.65, 2.8),
    segment!(0.66939, 1.10906, 47.0, 270.65, 0.0),
    segment!(0.03956, 0.66939, 51.0, 270.65, -2.8),
    segment!(0.00146, 0.03956, 71.0, 214.65, -2.0),
    segment!(0.000587, 0.00146, 89.8511, 187.0, 0.0),
    segment!(0.000241, 0.000587, 94.8386, 195.0, 0.0),
    segment!(0.000103, 0.000241, 99.9199, 215.0, 0.0),
    segment!(0.0000482, 0.000103, 105.2697, 250.0, 0.0),
    segment!(0.0, 0.0000482, 110.8266, 300.0, 0.0),
];

/// Convert a pressure to geometric altitude.
pub fn pressure_to_altitude(pressure: HectoPascal) -> Km {
    let mut p = pressure.unpack();
    if p <= 0.0 {
        p = MIN_PRESSURE;
    }

    let segment = SEGMENTS
        .iter()
        .find(|seg| p >= seg.top_pressure)
        .unwrap_or(&SEGMENTS[SEGMENTS.len() - 1]);

    Km(segment.altitude(p))
}

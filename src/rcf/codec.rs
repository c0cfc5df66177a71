//! Primitive readers and writers for the little-endian RCF layout.
use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_f32, le_u16},
    IResult,
};

pub(crate) type Parsed<'a, T> = IResult<&'a [u8], T>;

/// Read one count.
#[inline]
pub(crate) fn uint(input: &[u8]) -> Parsed<'_, u16> {
    le_u16(input)
}

/// Read one `f32` and widen it.
#[inline]
pub(crate) fn float(input: &[u8]) -> Parsed<'_, f64> {
    le_f32(input).map(|(input, val)| (input, f64::from(val)))
}

/// Read `n` consecutive `f32` values and widen them.
#[inline]
pub(crate) fn floats(input: &[u8], n: usize) -> Parsed<'_, Vec<f64>> {
    count(le_f32, n)(input)
        .map(|(input, vals)| (input, vals.into_iter().map(f64::from).collect()))
}

/// Read a fixed length byte block.
#[inline]
pub(crate) fn block(input: &[u8], n: usize) -> Parsed<'_, &[u8]> {
    take(n)(input)
}

#[inline]
pub(crate) fn put_u16(out: &mut Vec<u8>, val: u16) {
    out.extend_from_slice(&val.to_le_bytes());
}

#[inline]
pub(crate) fn put_float(out: &mut Vec<u8>, val: f64) {
    out.extend_from_slice(&(val as f32).to_le_bytes());
}

/// Write exactly `n` floats, zero filling or truncating `vals` as needed.
pub(crate) fn put_floats(out: &mut Vec<u8>, vals: &[f64], n: usize) {
    vals.iter()
        .copied()
        .chain(std::iter::repeat(0.0))
        .take(n)
        .for_each(|val| put_float(out, val));
}

/// Write exactly `n` bytes, zero padding or truncating `raw` as needed.
pub(crate) fn put_block(out: &mut Vec<u8>, raw: &[u8], n: usize) {
    let used = raw.len().min(n);
    out.extend_from_slice(&raw[..used]);
    out.resize(out.len() + n - used, 0);
}

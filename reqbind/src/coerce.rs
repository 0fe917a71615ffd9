//! Conversion of raw request strings into typed values.

use crate::error::CoerceError;
use crate::value::{Bindable, Scalar, Slot};

/// Populates `target` from the raw `values`.
///
/// Scalars, bytes and custom text decoders use the first value. Sequences
/// get one element per value. Optional storage is allocated before the
/// inner value is decoded.
pub fn coerce(target: &mut dyn Bindable, values: &[String]) -> Result<(), CoerceError> {
    coerce_slot(target.slot(), values)
}

/// Same as [`coerce`] for an already resolved [`Slot`].
pub fn coerce_slot(slot: Slot<'_>, values: &[String]) -> Result<(), CoerceError> {
    match slot {
        Slot::Pointer(pointer) => coerce(pointer.get_or_alloc(), values),
        Slot::Text(text) => text.decode_text(first(values)?).map_err(CoerceError::Text),
        Slot::Scalar(scalar) => parse_scalar(scalar, first(values)?),
        Slot::Bytes(sink) => {
            sink.set_bytes(first(values)?.as_bytes());
            Ok(())
        }
        Slot::Sequence(seq) => seq.replace(values),
        Slot::Record(_) => Err(CoerceError::Unsupported("record")),
    }
}

fn first(values: &[String]) -> Result<&str, CoerceError> {
    values
        .first()
        .map(String::as_str)
        .ok_or(CoerceError::Missing)
}

/// Parses a boolean literal.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their false counterparts.
pub fn parse_bool(value: &str) -> Result<bool, CoerceError> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoerceError::InvalidBool(value.to_string())),
    }
}

fn parse_int<T>(value: &str) -> Result<T, CoerceError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value.parse().map_err(|source| CoerceError::Int {
        value: value.to_string(),
        source,
    })
}

fn parse_float<T>(value: &str) -> Result<T, CoerceError>
where
    T: std::str::FromStr<Err = std::num::ParseFloatError>,
{
    value.parse().map_err(|source| CoerceError::Float {
        value: value.to_string(),
        source,
    })
}

fn parse_scalar(scalar: Scalar<'_>, value: &str) -> Result<(), CoerceError> {
    match scalar {
        Scalar::Bool(v) => *v = parse_bool(value)?,
        Scalar::Char(v) => {
            *v = value.parse().map_err(|source| CoerceError::Char {
                value: value.to_string(),
                source,
            })?
        }
        Scalar::Str(v) => *v = value.to_string(),
        Scalar::U8(v) => *v = parse_int(value)?,
        Scalar::U16(v) => *v = parse_int(value)?,
        Scalar::U32(v) => *v = parse_int(value)?,
        Scalar::U64(v) => *v = parse_int(value)?,
        Scalar::U128(v) => *v = parse_int(value)?,
        Scalar::Usize(v) => *v = parse_int(value)?,
        Scalar::I8(v) => *v = parse_int(value)?,
        Scalar::I16(v) => *v = parse_int(value)?,
        Scalar::I32(v) => *v = parse_int(value)?,
        Scalar::I64(v) => *v = parse_int(value)?,
        Scalar::I128(v) => *v = parse_int(value)?,
        Scalar::Isize(v) => *v = parse_int(value)?,
        Scalar::F32(v) => *v = parse_float(value)?,
        Scalar::F64(v) => *v = parse_float(value)?,
    }
    Ok(())
}

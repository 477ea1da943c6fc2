//! Scalar wire types and their text and binary codecs.
//!
//! PLY knows eight numeric wire types. [`ScalarKind`] names them,
//! [`Scalar`] holds one typed value, and [`ScalarType`] links each kind to
//! the Rust primitive that stores it in memory.
//!
//! | Kind | Token | Width | Rust type |
//! |------|-------|-------|-----------|
//! | `Float64` | `double` | 8 | `f64` |
//! | `Float32` | `float` | 4 | `f32` |
//! | `UInt8` | `uchar` | 1 | `u8` |
//! | `Int8` | `char` | 1 | `i8` |
//! | `UInt16` | `ushort` | 2 | `u16` |
//! | `Int16` | `short` | 2 | `i16` |
//! | `UInt32` | `uint` | 4 | `u32` |
//! | `Int32` | `int` | 4 | `i32` |
//!
//! ## 64-bit integers
//!
//! PLY has no 64-bit integer type. `u64` and `i64` values are narrowed to
//! `UInt32` and `Int32` with [`Scalar::narrow_u64`] and [`Scalar::narrow_i64`].
//! The narrowing wraps values outside the 32-bit range.
//!
//! ```rust
//! use plyformat::{Scalar, ScalarKind};
//!
//! assert_eq!(ScalarKind::from_token("ushort"), Some(ScalarKind::UInt16));
//! assert_eq!(ScalarKind::Float32.byte_width(), 4);
//! assert_eq!(Scalar::narrow_i64(-7), Scalar::Int32(-7));
//! assert_eq!(Scalar::from(3u64).kind(), ScalarKind::UInt32);
//! ```

use byteorder::ByteOrder;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// One of the eight canonical PLY scalar types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    Float64,
    Float32,
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
}

impl ScalarKind {
    /// Every kind, in the order of the header type table.
    pub const ALL: [ScalarKind; 8] = [
        ScalarKind::Float64,
        ScalarKind::Float32,
        ScalarKind::UInt8,
        ScalarKind::Int8,
        ScalarKind::UInt16,
        ScalarKind::Int16,
        ScalarKind::UInt32,
        ScalarKind::Int32,
    ];

    /// Returns the header token for this kind.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            ScalarKind::Float64 => "double",
            ScalarKind::Float32 => "float",
            ScalarKind::UInt8 => "uchar",
            ScalarKind::Int8 => "char",
            ScalarKind::UInt16 => "ushort",
            ScalarKind::Int16 => "short",
            ScalarKind::UInt32 => "uint",
            ScalarKind::Int32 => "int",
        }
    }

    /// Looks up a header token. Returns `None` for anything but the eight canonical tokens.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        ScalarKind::ALL.into_iter().find(|kind| kind.token() == token)
    }

    /// Size of one value on the binary wire.
    #[must_use]
    pub const fn byte_width(self) -> usize {
        match self {
            ScalarKind::Float64 => 8,
            ScalarKind::Float32 | ScalarKind::UInt32 | ScalarKind::Int32 => 4,
            ScalarKind::UInt16 | ScalarKind::Int16 => 2,
            ScalarKind::UInt8 | ScalarKind::Int8 => 1,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, ScalarKind::Float64 | ScalarKind::Float32)
    }

    /// Returns `true` for the kinds allowed as list counts.
    #[inline]
    #[must_use]
    pub const fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            ScalarKind::UInt8 | ScalarKind::UInt16 | ScalarKind::UInt32
        )
    }

    /// Parses one ascii token as a value of this kind.
    ///
    /// Integer kinds only accept integer literals that fit the type, with an
    /// optional `-` but no `+`; nothing is truncated or clamped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plyformat::{Scalar, ScalarKind};
    ///
    /// assert_eq!(ScalarKind::UInt8.parse_ascii("255"), Some(Scalar::UInt8(255)));
    /// assert_eq!(ScalarKind::UInt8.parse_ascii("256"), None);
    /// assert_eq!(ScalarKind::Int32.parse_ascii("1.5"), None);
    /// assert_eq!(ScalarKind::Float32.parse_ascii("1.5"), Some(Scalar::Float32(1.5)));
    /// ```
    #[must_use]
    pub fn parse_ascii(self, text: &str) -> Option<Scalar> {
        if !self.is_float() && text.starts_with('+') {
            return None;
        }
        match self {
            ScalarKind::Float64 => text.parse().ok().map(Scalar::Float64),
            ScalarKind::Float32 => text.parse().ok().map(Scalar::Float32),
            ScalarKind::UInt8 => text.parse().ok().map(Scalar::UInt8),
            ScalarKind::Int8 => text.parse().ok().map(Scalar::Int8),
            ScalarKind::UInt16 => text.parse().ok().map(Scalar::UInt16),
            ScalarKind::Int16 => text.parse().ok().map(Scalar::Int16),
            ScalarKind::UInt32 => text.parse().ok().map(Scalar::UInt32),
            ScalarKind::Int32 => text.parse().ok().map(Scalar::Int32),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A single typed PLY value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Float64(f64),
    Float32(f32),
    UInt8(u8),
    Int8(i8),
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
}

impl Scalar {
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Float64(_) => ScalarKind::Float64,
            Scalar::Float32(_) => ScalarKind::Float32,
            Scalar::UInt8(_) => ScalarKind::UInt8,
            Scalar::Int8(_) => ScalarKind::Int8,
            Scalar::UInt16(_) => ScalarKind::UInt16,
            Scalar::Int16(_) => ScalarKind::Int16,
            Scalar::UInt32(_) => ScalarKind::UInt32,
            Scalar::Int32(_) => ScalarKind::Int32,
        }
    }

    /// Narrows a `u64` to `UInt32`. Values above `u32::MAX` wrap.
    #[must_use]
    pub const fn narrow_u64(value: u64) -> Self {
        Scalar::UInt32(value as u32)
    }

    /// Narrows an `i64` to `Int32`. Values outside the `i32` range wrap.
    #[must_use]
    pub const fn narrow_i64(value: i64) -> Self {
        Scalar::Int32(value as i32)
    }

    /// Converts to `f64`. Exact for every kind.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::Float64(v) => v,
            Scalar::Float32(v) => f64::from(v),
            Scalar::UInt8(v) => f64::from(v),
            Scalar::Int8(v) => f64::from(v),
            Scalar::UInt16(v) => f64::from(v),
            Scalar::Int16(v) => f64::from(v),
            Scalar::UInt32(v) => f64::from(v),
            Scalar::Int32(v) => f64::from(v),
        }
    }

    /// Builds a list count of the given kind, or `None` if `count` does not fit.
    #[must_use]
    pub fn from_count(kind: ScalarKind, count: usize) -> Option<Self> {
        match kind {
            ScalarKind::UInt8 => u8::try_from(count).ok().map(Scalar::UInt8),
            ScalarKind::UInt16 => u16::try_from(count).ok().map(Scalar::UInt16),
            ScalarKind::UInt32 => u32::try_from(count).ok().map(Scalar::UInt32),
            _ => None,
        }
    }

    /// Interprets an unsigned integer value as a list count.
    #[must_use]
    pub fn to_count(&self) -> Option<usize> {
        match *self {
            Scalar::UInt8(v) => Some(usize::from(v)),
            Scalar::UInt16(v) => Some(usize::from(v)),
            Scalar::UInt32(v) => usize::try_from(v).ok(),
            _ => None,
        }
    }

    /// Appends the binary encoding of this value to `buf`.
    pub fn pack<B: ByteOrder>(&self, buf: &mut Vec<u8>) {
        match *self {
            Scalar::UInt8(v) => buf.push(v),
            Scalar::Int8(v) => buf.push(v as u8),
            Scalar::UInt16(v) => {
                let mut bytes = [0u8; 2];
                B::write_u16(&mut bytes, v);
                buf.extend_from_slice(&bytes);
            }
            Scalar::Int16(v) => {
                let mut bytes = [0u8; 2];
                B::write_i16(&mut bytes, v);
                buf.extend_from_slice(&bytes);
            }
            Scalar::UInt32(v) => {
                let mut bytes = [0u8; 4];
                B::write_u32(&mut bytes, v);
                buf.extend_from_slice(&bytes);
            }
            Scalar::Int32(v) => {
                let mut bytes = [0u8; 4];
                B::write_i32(&mut bytes, v);
                buf.extend_from_slice(&bytes);
            }
            Scalar::Float32(v) => {
                let mut bytes = [0u8; 4];
                B::write_f32(&mut bytes, v);
                buf.extend_from_slice(&bytes);
            }
            Scalar::Float64(v) => {
                let mut bytes = [0u8; 8];
                B::write_f64(&mut bytes, v);
                buf.extend_from_slice(&bytes);
            }
        }
    }

    /// Decodes one value of `kind` from the front of `bytes`.
    ///
    /// `bytes` must hold at least `kind.byte_width()` bytes.
    #[must_use]
    pub fn unpack<B: ByteOrder>(kind: ScalarKind, bytes: &[u8]) -> Self {
        match kind {
            ScalarKind::UInt8 => Scalar::UInt8(bytes[0]),
            ScalarKind::Int8 => Scalar::Int8(bytes[0] as i8),
            ScalarKind::UInt16 => Scalar::UInt16(B::read_u16(bytes)),
            ScalarKind::Int16 => Scalar::Int16(B::read_i16(bytes)),
            ScalarKind::UInt32 => Scalar::UInt32(B::read_u32(bytes)),
            ScalarKind::Int32 => Scalar::Int32(B::read_i32(bytes)),
            ScalarKind::Float32 => Scalar::Float32(B::read_f32(bytes)),
            ScalarKind::Float64 => Scalar::Float64(B::read_f64(bytes)),
        }
    }

    /// Appends the ascii token for this value to `out`.
    ///
    /// Floats use a `%g`-style general format with `precision` significant
    /// digits, or the shortest round-trip representation when `precision` is
    /// `None`. Integers are written in plain decimal.
    pub fn write_ascii(&self, out: &mut String, precision: Option<usize>) {
        // Writing into a String cannot fail.
        let _ = match (*self, precision) {
            (Scalar::Float64(v), Some(p)) => {
                write_general(out, v, p);
                Ok(())
            }
            (Scalar::Float32(v), Some(p)) => {
                write_general(out, f64::from(v), p);
                Ok(())
            }
            (Scalar::Float64(v), None) => write!(out, "{}", v),
            (Scalar::Float32(v), None) => write!(out, "{}", v),
            (Scalar::UInt8(v), _) => write!(out, "{}", v),
            (Scalar::Int8(v), _) => write!(out, "{}", v),
            (Scalar::UInt16(v), _) => write!(out, "{}", v),
            (Scalar::Int16(v), _) => write!(out, "{}", v),
            (Scalar::UInt32(v), _) => write!(out, "{}", v),
            (Scalar::Int32(v), _) => write!(out, "{}", v),
        };
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut token = String::new();
        self.write_ascii(&mut token, None);
        f.write_str(&token)
    }
}

/// Significant digits that identify every `f64`; larger precisions are clamped.
pub(crate) const MAX_SIGNIFICANT_DIGITS: usize = 17;

/// Writes `value` like C's `%.{precision}g`.
fn write_general(out: &mut String, value: f64, precision: usize) {
    if value.is_nan() {
        out.push_str("nan");
        return;
    }
    if value.is_infinite() {
        out.push_str(if value < 0.0 { "-inf" } else { "inf" });
        return;
    }
    if value == 0.0 {
        out.push_str(if value.is_sign_negative() { "-0" } else { "0" });
        return;
    }

    let precision = precision.clamp(1, MAX_SIGNIFICANT_DIGITS);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        out.push_str(&scientific);
        return;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        out.push_str(trim_fraction(mantissa));
        let sign = if exponent < 0 { '-' } else { '+' };
        let _ = write!(out, "e{}{:02}", sign, exponent.unsigned_abs());
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, value);
        out.push_str(trim_fraction(&fixed));
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// A Rust primitive that maps onto a PLY scalar kind.
///
/// Implemented for the eight native types plus `u64`/`i64`, which narrow to
/// their 32-bit counterparts on the way in.
pub trait ScalarType: Copy {
    /// The wire kind values of this type are written as.
    const KIND: ScalarKind;

    fn into_scalar(self) -> Scalar;

    /// Extracts a value of this type. Returns `None` when the kinds differ.
    fn from_scalar(scalar: Scalar) -> Option<Self>;
}

macro_rules! impl_scalar_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ScalarType for $ty {
                const KIND: ScalarKind = ScalarKind::$variant;

                #[inline]
                fn into_scalar(self) -> Scalar {
                    Scalar::$variant(self)
                }

                #[inline]
                fn from_scalar(scalar: Scalar) -> Option<Self> {
                    match scalar {
                        Scalar::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value)
                }
            }
        )*
    };
}

impl_scalar_type! {
    f64 => Float64,
    f32 => Float32,
    u8 => UInt8,
    i8 => Int8,
    u16 => UInt16,
    i16 => Int16,
    u32 => UInt32,
    i32 => Int32,
}

impl ScalarType for u64 {
    const KIND: ScalarKind = ScalarKind::UInt32;

    fn into_scalar(self) -> Scalar {
        Scalar::narrow_u64(self)
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::UInt32(v) => Some(u64::from(v)),
            _ => None,
        }
    }
}

impl ScalarType for i64 {
    const KIND: ScalarKind = ScalarKind::Int32;

    fn into_scalar(self) -> Scalar {
        Scalar::narrow_i64(self)
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Int32(v) => Some(i64::from(v)),
            _ => None,
        }
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::narrow_u64(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::narrow_i64(value)
    }
}

/// How element data follows the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl Encoding {
    /// Returns the token used on the `format` header line.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::BinaryLittleEndian => "binary_little_endian",
            Encoding::BinaryBigEndian => "binary_big_endian",
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ascii" => Some(Encoding::Ascii),
            "binary_little_endian" => Some(Encoding::BinaryLittleEndian),
            "binary_big_endian" => Some(Encoding::BinaryBigEndian),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_binary(self) -> bool {
        !matches!(self, Encoding::Ascii)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

//! Fixed-width two's-complement codes.
//!
//! A `Code` is the terminal form of every feature value: `resolution` bits,
//! written as a binary literal tagged with a leading `b` (e.g. `b01111111`).
//!
//! ```text
//! level ≥ 0 :  bits = level & mask
//! level < 0 :  bits = ((|level| XOR mask) + 1) & mask      mask = 2^resolution - 1
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Widest code the encoder accepts.
pub const MAX_RESOLUTION: u32 = 32;

/// A `resolution`-bit two's-complement bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code {
    bits: u64,
    resolution: u32,
}

impl Code {
    /// Two's-complement encoding of an integer level.
    ///
    /// Fails with `ShapeError` unless `resolution` lies in
    /// `1..=MAX_RESOLUTION`, and with `RangeError` when `level` needs more
    /// than `resolution` bits (below `-2^(r-1)` or above `2^r - 1`).
    pub fn encode(level: i64, resolution: u32) -> Result<Self> {
        check_resolution(resolution)?;
        let min = -(1i64 << (resolution - 1));
        let max = (1i64 << resolution) - 1;
        if level < min || level > max {
            return Err(Error::RangeError {
                value: level as f64,
                resolution,
                sign: level < 0,
            });
        }

        let mask = Self::mask(resolution);
        let bits = if level >= 0 {
            level as u64
        } else {
            ((level.unsigned_abs() ^ mask) + 1) & mask
        };
        Ok(Self { bits, resolution })
    }

    fn mask(resolution: u32) -> u64 {
        (1u64 << resolution) - 1
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Interpret the bits as a signed two's-complement integer.
    pub fn to_signed(&self) -> i64 {
        let sign_bit = 1u64 << (self.resolution - 1);
        if self.bits & sign_bit != 0 {
            self.bits as i64 - (1i64 << self.resolution)
        } else {
            self.bits as i64
        }
    }

    /// Interpret the bits as an unsigned integer.
    pub fn to_unsigned(&self) -> u64 {
        self.bits
    }
}

fn check_resolution(resolution: u32) -> Result<()> {
    if resolution == 0 || resolution > MAX_RESOLUTION {
        return Err(Error::ShapeError(format!(
            "resolution {resolution} outside 1..={MAX_RESOLUTION}"
        )));
    }
    Ok(())
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{:0width$b}", self.bits, width = self.resolution as usize)
    }
}

impl FromStr for Code {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix('b')
            .ok_or_else(|| Error::ShapeError(format!("code {s:?} lacks the 'b' prefix")))?;
        let resolution = digits.len() as u32;
        check_resolution(resolution).map_err(|_| {
            Error::ShapeError(format!(
                "code {s:?} has {resolution} bits, expected 1..={MAX_RESOLUTION}"
            ))
        })?;
        let bits = u64::from_str_radix(digits, 2)
            .map_err(|e| Error::ShapeError(format!("code {s:?}: {e}")))?;
        Ok(Self { bits, resolution })
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

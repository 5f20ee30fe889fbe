use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

lazy_static! {
    static ref LENGTH_LITERAL: Regex =
        Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)(in|cm|px)$")
            .expect("length literal regex is valid");
}

const CM_PER_INCH: f64 = 2.54;

/// A unit a length can be written in, or converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    /// `in`
    Inches,
    /// `cm`
    Centimetres,
    /// `px`; only meaningful together with a pixels-per-inch resolution
    Pixels,
}

impl LengthUnit {
    fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Inches => "in",
            LengthUnit::Centimetres => "cm",
            LengthUnit::Pixels => "px",
        }
    }
}

/// Problems reading or converting a length literal
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidLengthError {
    /// not of the form `<number><unit>`; the unit is mandatory
    #[error("invalid length `{0}`: expected a number followed by `in`, `cm` or `px`")]
    Malformed(String),
    /// a `px` literal which is not a whole number of pixels
    #[error("invalid length `{0}`: pixel lengths must be whole numbers")]
    FractionalPixels(String),
    /// the conversion needed a resolution, and the one supplied was not positive
    #[error("cannot convert `{literal}` at {px_per_in} pixels per inch")]
    NonPositiveResolution {
        /// the literal being converted
        literal: String,
        /// the unusable resolution
        px_per_in: f64,
    },
}

/// A parsed length literal such as `0.125in`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    /// the numeric part of the literal
    pub value: f64,
    /// the unit suffix of the literal
    pub unit: LengthUnit,
}

impl FromStr for Length {
    type Err = InvalidLengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = LENGTH_LITERAL
            .captures(s)
            .ok_or_else(|| InvalidLengthError::Malformed(s.to_string()))?;
        let value = captures[1]
            .parse::<f64>()
            .map_err(|_| InvalidLengthError::Malformed(s.to_string()))?;
        if !value.is_finite() {
            return Err(InvalidLengthError::Malformed(s.to_string()));
        }
        let unit = match &captures[2] {
            "in" => LengthUnit::Inches,
            "cm" => LengthUnit::Centimetres,
            _ => LengthUnit::Pixels,
        };
        Ok(Length { value, unit })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl Length {
    fn checked_resolution(&self, px_per_in: f64) -> Result<f64, InvalidLengthError> {
        if px_per_in.is_finite() && px_per_in > 0.0 {
            Ok(px_per_in)
        } else {
            Err(InvalidLengthError::NonPositiveResolution {
                literal: self.to_string(),
                px_per_in,
            })
        }
    }

    /// this length in inches; `px_per_in` is only consulted for pixel lengths
    pub fn to_inches(&self, px_per_in: f64) -> Result<f64, InvalidLengthError> {
        match self.unit {
            LengthUnit::Inches => Ok(self.value),
            LengthUnit::Centimetres => Ok(self.value / CM_PER_INCH),
            LengthUnit::Pixels => Ok(self.value / self.checked_resolution(px_per_in)?),
        }
    }

    /// this length as a whole number of pixels.
    ///
    /// Physical lengths are scaled by `px_per_in` and rounded to the nearest pixel
    /// (ties to even); a `px` literal must already be whole.
    pub fn to_pixels(&self, px_per_in: f64) -> Result<i64, InvalidLengthError> {
        match self.unit {
            LengthUnit::Pixels => {
                if self.value.fract() != 0.0 {
                    Err(InvalidLengthError::FractionalPixels(self.to_string()))
                } else {
                    Ok(self.value as i64)
                }
            }
            _ => {
                let px_per_in = self.checked_resolution(px_per_in)?;
                let inches = self.to_inches(px_per_in)?;
                Ok((inches * px_per_in).round_ties_even() as i64)
            }
        }
    }
}

/// Resolve a length literal to `target` units.
///
/// `px_per_in` is the resolution of the image the length describes; it is only
/// used when a conversion crosses between pixels and physical units.
///
/// ```
/// use canvas_geometry::{resolve, LengthUnit};
/// assert_eq!(resolve("2.54cm", LengthUnit::Inches, 300.0), Ok(1.0));
/// assert_eq!(resolve("300px", LengthUnit::Inches, 300.0), Ok(1.0));
/// assert_eq!(resolve("0.5in", LengthUnit::Pixels, 300.0), Ok(150.0));
/// assert!(resolve("2.5px", LengthUnit::Pixels, 300.0).is_err());
/// assert!(resolve("12", LengthUnit::Inches, 300.0).is_err());
/// ```
pub fn resolve(literal: &str, target: LengthUnit, px_per_in: f64) -> Result<f64, InvalidLengthError> {
    let length = literal.parse::<Length>()?;
    match target {
        LengthUnit::Inches => length.to_inches(px_per_in),
        LengthUnit::Centimetres => Ok(length.to_inches(px_per_in)? * CM_PER_INCH),
        LengthUnit::Pixels => length.to_pixels(px_per_in).map(|px| px as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(
            "0.125in".parse::<Length>(),
            Ok(Length {
                value: 0.125,
                unit: LengthUnit::Inches
            })
        );
        assert_eq!("3cm".parse::<Length>().unwrap().unit, LengthUnit::Centimetres);
        assert_eq!("-12px".parse::<Length>().unwrap().value, -12.0);
        assert_eq!(".5in".parse::<Length>().unwrap().value, 0.5);
    }

    #[test]
    fn rejects_malformed_literals() {
        for literal in ["12", "in", "3 cm", " 3cm", "3mm", "3CM", "", "1.2.3in", "3cm "] {
            assert_eq!(
                resolve(literal, LengthUnit::Inches, 300.0),
                Err(InvalidLengthError::Malformed(literal.to_string())),
                "{}",
                literal
            );
        }
    }

    #[test]
    fn converts_to_inches() {
        assert_eq!(resolve("2.54cm", LengthUnit::Inches, 300.0), Ok(1.0));
        assert_eq!(resolve("300px", LengthUnit::Inches, 300.0), Ok(1.0));
        assert_eq!(resolve("8.25in", LengthUnit::Inches, 0.0), Ok(8.25));
    }

    #[test]
    fn converts_to_pixels_rounding_to_nearest() {
        assert_eq!(resolve("1in", LengthUnit::Pixels, 300.0), Ok(300.0));
        assert_eq!(resolve("1cm", LengthUnit::Pixels, 254.0), Ok(100.0));
        // 0.0025in * 300 = 0.75
        assert_eq!(resolve("0.0025in", LengthUnit::Pixels, 300.0), Ok(1.0));
        assert_eq!(resolve("-0.1in", LengthUnit::Pixels, 100.0), Ok(-10.0));
        assert_eq!(resolve("12px", LengthUnit::Pixels, 0.0), Ok(12.0));
    }

    #[test]
    fn fractional_pixels_are_rejected() {
        assert_eq!(
            resolve("2.5px", LengthUnit::Pixels, 300.0),
            Err(InvalidLengthError::FractionalPixels("2.5px".to_string()))
        );
    }

    #[test]
    fn pixel_conversions_need_a_resolution() {
        assert!(matches!(
            resolve("300px", LengthUnit::Inches, 0.0),
            Err(InvalidLengthError::NonPositiveResolution { .. })
        ));
        assert!(matches!(
            resolve("1in", LengthUnit::Pixels, -3.0),
            Err(InvalidLengthError::NonPositiveResolution { .. })
        ));
    }
}

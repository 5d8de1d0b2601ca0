//! Textual layouts for exported vectors.
//!
//! | Format | Header | Entry | Positions |
//! |--------|--------|-------|-----------|
//! | [`Plain`][ExportFormat::Plain] | `N M` | `p v` | 0-based |
//! | [`Matlab`][ExportFormat::Matlab] | `name = sparse(N,1);` | `name(p)=v;` | 1-based |
//! | [`Mrmc`][ExportFormat::Mrmc] | none | `p v` | 1-based |
//!
//! `N` is the number of positions and `M` the number of non-zero entries the
//! diagram represents. Values are printed like C's `%.12g`, see [`format_value`].

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use num_bigint::BigUint;

use crate::export::ExportError;

/// Significant digits of exported values.
pub const PRECISION: usize = 12;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ExportFormat {
    /// `position value` lines after a `positions nonzeros` header.
    #[default]
    Plain,
    /// A MATLAB script filling a sparse column vector.
    Matlab,
    /// MRMC-style `position value` lines with 1-based positions.
    Mrmc,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Plain, ExportFormat::Matlab, ExportFormat::Mrmc];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Plain => "plain",
            ExportFormat::Matlab => "matlab",
            ExportFormat::Mrmc => "mrmc",
        }
    }

    /// Does the header carry the non-zero count?
    pub fn needs_nonzero_count(self) -> bool {
        matches!(self, ExportFormat::Plain)
    }

    /// Writes the header line, if the format has one.
    ///
    /// `nonzeros` is only read by formats for which
    /// [`needs_nonzero_count`][Self::needs_nonzero_count] holds.
    pub fn write_header<W: Write>(
        self,
        out: &mut W,
        name: &str,
        positions: u64,
        nonzeros: Option<&BigUint>,
    ) -> io::Result<()> {
        match self {
            ExportFormat::Plain => {
                let zero = BigUint::ZERO;
                writeln!(out, "{} {}", positions, nonzeros.unwrap_or(&zero))
            }
            ExportFormat::Matlab => writeln!(out, "{} = sparse({},1);", name, positions),
            ExportFormat::Mrmc => Ok(()),
        }
    }

    /// Writes one entry line for the 0-based `position`.
    pub fn write_entry<W: Write>(self, out: &mut W, name: &str, position: u64, value: f64) -> io::Result<()> {
        match self {
            ExportFormat::Plain => writeln!(out, "{} {}", position, format_value(value)),
            ExportFormat::Matlab => writeln!(out, "{}({})={};", name, position + 1, format_value(value)),
            ExportFormat::Mrmc => writeln!(out, "{} {}", position + 1, format_value(value)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ExportError::Config(format!(
                    "unknown export format '{}' (expected one of: plain, matlab, mrmc)",
                    s
                ))
            })
    }
}

/// Formats `value` with [`PRECISION`] significant digits, like C's `%.12g`.
///
/// Trailing zeros are dropped. Exponent notation is used when the decimal
/// exponent is below -4 or at least the precision.
///
/// ```
/// use mtbdd_export::format::format_value;
///
/// assert_eq!(format_value(3.5), "3.5");
/// assert_eq!(format_value(1.0 / 3.0), "0.333333333333");
/// assert_eq!(format_value(1e-5), "1e-05");
/// assert_eq!(format_value(2.5e12), "2.5e+12");
/// ```
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return String::from(if value > 0.0 { "inf" } else { "-inf" });
    }
    if value == 0.0 {
        return String::from(if value.is_sign_negative() { "-0" } else { "0" });
    }

    // Rounding to the precision first fixes the exponent the C rules look at.
    let sci = format!("{:.*e}", PRECISION - 1, value);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.unsigned_abs())
    } else {
        let decimals = (PRECISION as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_entry(format: ExportFormat, position: u64, value: f64) -> String {
        let mut out = Vec::new();
        format.write_entry(&mut out, "v", position, value).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn render_header(format: ExportFormat, positions: u64, nonzeros: u32) -> String {
        let mut out = Vec::new();
        format
            .write_header(&mut out, "v", positions, Some(&BigUint::from(nonzeros)))
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("plain".parse::<ExportFormat>().unwrap(), ExportFormat::Plain);
        assert_eq!("MATLAB".parse::<ExportFormat>().unwrap(), ExportFormat::Matlab);
        assert_eq!(" mrmc ".parse::<ExportFormat>().unwrap(), ExportFormat::Mrmc);
        for format in ExportFormat::ALL {
            assert_eq!(format.to_string().parse::<ExportFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_parse_unknown_format() {
        let err = "csv".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
        assert!(err.to_string().contains("csv"));
    }

    #[test]
    fn test_headers() {
        assert_eq!(render_header(ExportFormat::Plain, 4, 1), "4 1\n");
        assert_eq!(render_header(ExportFormat::Matlab, 4, 1), "v = sparse(4,1);\n");
        assert_eq!(render_header(ExportFormat::Mrmc, 4, 1), "");
    }

    #[test]
    fn test_plain_header_with_huge_count() {
        let mut out = Vec::new();
        let count = BigUint::from(1u32) << 80;
        ExportFormat::Plain.write_header(&mut out, "v", 7, Some(&count)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "7 1208925819614629174706176\n");
    }

    #[test]
    fn test_entries() {
        assert_eq!(render_entry(ExportFormat::Plain, 2, 3.5), "2 3.5\n");
        assert_eq!(render_entry(ExportFormat::Matlab, 2, 3.5), "v(3)=3.5;\n");
        assert_eq!(render_entry(ExportFormat::Mrmc, 2, 3.5), "3 3.5\n");
    }

    #[test]
    fn test_format_value_fixed() {
        assert_eq!(format_value(1.0), "1");
        assert_eq!(format_value(-2.0), "-2");
        assert_eq!(format_value(0.1), "0.1");
        assert_eq!(format_value(100.0), "100");
        assert_eq!(format_value(0.0001), "0.0001");
        assert_eq!(format_value(123456.789), "123456.789");
        assert_eq!(format_value(2.0 / 3.0), "0.666666666667");
        assert_eq!(format_value(999999999999.0), "999999999999");
    }

    #[test]
    fn test_format_value_exponent() {
        assert_eq!(format_value(0.00001), "1e-05");
        assert_eq!(format_value(1e12), "1e+12");
        assert_eq!(format_value(-1.5e-7), "-1.5e-07");
        assert_eq!(format_value(6.02214076e23), "6.02214076e+23");
        assert_eq!(format_value(1e100), "1e+100");
    }

    #[test]
    fn test_format_value_rounding_carries_exponent() {
        // Rounds up to 1e+12, which must switch to exponent notation.
        assert_eq!(format_value(999999999999.9), "1e+12");
        assert_eq!(format_value(9.99999999999951), "10");
    }

    #[test]
    fn test_format_value_special() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(-0.0), "-0");
        assert_eq!(format_value(f64::INFINITY), "inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_value(f64::NAN), "nan");
    }

    #[test]
    fn test_format_value_round_trips_within_precision() {
        for &value in &[std::f64::consts::PI, 1.0 / 7.0, -12345.678901234, 3.3e-9] {
            let parsed: f64 = format_value(value).parse().unwrap();
            assert!((parsed - value).abs() <= value.abs() * 1e-11, "{} vs {}", parsed, value);
        }
    }
}

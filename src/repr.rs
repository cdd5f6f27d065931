//! Verbose textual representation of primitive values.
//!
//! Integers, floats and complex numbers have no bespoke fast path in the
//! encoder; they all go through the rules in this module:
//!
//! * signed integers in decimal, unsigned integers as `0x` + lowercase hex
//! * floats with their shortest round-trip digits, switching to exponent form
//!   (`1e+06`) when the decimal exponent is below -4 or at least 6
//! * complex numbers as `(re+imi)` with the imaginary sign always shown
//! * durations in unit-suffixed form (`250ms`, `1m30s`)

use std::fmt::Write;
use std::time::Duration;

/// Width of the elapsed-time column in characters.
pub const ELAPSED_WIDTH: usize = 13;

const NANOS_PER_SEC: u128 = 1_000_000_000;

pub fn signed(v: i64) -> String {
    v.to_string()
}

pub fn unsigned(v: u64) -> String {
    format!("{:#x}", v)
}

pub fn float64(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    from_scientific(&format!("{:e}", v))
}

pub fn float32(v: f32) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    from_scientific(&format!("{:e}", v))
}

pub fn complex128(re: f64, im: f64) -> String {
    format!("({}{}i)", float64(re), with_sign(float64(im)))
}

pub fn complex64(re: f32, im: f32) -> String {
    format!("({}{}i)", float32(re), with_sign(float32(im)))
}

fn with_sign(s: String) -> String {
    if s.starts_with('-') || s.starts_with('+') {
        s
    } else {
        format!("+{}", s)
    }
}

// `sci` is Rust's shortest `{:e}` output, e.g. "-1.2345e6", "1e-7", "0e0".
fn from_scientific(sci: &str) -> String {
    let (negative, rest) = match sci.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, sci),
    };
    let (mantissa, exp) = rest.split_once('e').unwrap_or((rest, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }
    if exp < -4 || exp >= 6 {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        let _ = write!(out, "{:02}", exp.unsigned_abs());
    } else if exp >= 0 {
        let int_len = exp as usize + 1;
        if digits.len() <= int_len {
            out.push_str(&digits);
            out.extend(std::iter::repeat('0').take(int_len - digits.len()));
        } else {
            out.push_str(&digits[..int_len]);
            out.push('.');
            out.push_str(&digits[int_len..]);
        }
    } else {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-exp - 1) as usize));
        out.push_str(&digits);
    }
    out
}

/// Unit-suffixed duration: `0s`, `850ns`, `1.5µs`, `250ms`, `1m30s`, `2h0m0.5s`.
pub fn duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    let mut out = String::with_capacity(16);
    if nanos < NANOS_PER_SEC {
        let (unit, precision) = if nanos < 1_000 {
            ("ns", 0)
        } else if nanos < 1_000_000 {
            ("µs", 3)
        } else {
            ("ms", 6)
        };
        let scale = 10u128.pow(precision);
        let _ = write!(out, "{}", nanos / scale);
        push_fraction(&mut out, nanos % scale, precision as usize);
        out.push_str(unit);
        return out;
    }

    let secs = nanos / NANOS_PER_SEC;
    let minutes = secs / 60;
    let hours = minutes / 60;
    if hours > 0 {
        let _ = write!(out, "{}h{}m", hours, minutes % 60);
    } else if minutes > 0 {
        let _ = write!(out, "{}m", minutes);
    }
    let _ = write!(out, "{}", secs % 60);
    push_fraction(&mut out, nanos % NANOS_PER_SEC, 9);
    out.push('s');
    out
}

// Fraction digits without trailing zeros; nothing at all when zero.
fn push_fraction(out: &mut String, frac: u128, precision: usize) {
    if frac == 0 || precision == 0 {
        return;
    }
    let digits = format!("{:0width$}", frac, width = precision);
    out.push('.');
    out.push_str(digits.trim_end_matches('0'));
}

/// Right-aligns `s` in a column of `width` characters.
pub fn pad_left(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let mut out = String::with_capacity(s.len() + width.saturating_sub(len));
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    out.push_str(s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(signed(10), "10");
        assert_eq!(signed(-42), "-42");
        assert_eq!(unsigned(100), "0x64");
        assert_eq!(unsigned(0), "0x0");
        assert_eq!(unsigned(u64::MAX), "0xffffffffffffffff");
    }

    #[test]
    fn test_float_plain_range() {
        assert_eq!(float64(0.0), "0");
        assert_eq!(float64(3.0), "3");
        assert_eq!(float64(10.0), "10");
        assert_eq!(float64(1.5), "1.5");
        assert_eq!(float64(-2.25), "-2.25");
        assert_eq!(float64(123456.0), "123456");
        assert_eq!(float64(0.0001), "0.0001");
        assert_eq!(float32(1.1), "1.1");
    }

    #[test]
    fn test_float_exponent_range() {
        assert_eq!(float64(1e6), "1e+06");
        assert_eq!(float64(1234567.0), "1.234567e+06");
        assert_eq!(float64(0.00001), "1e-05");
        assert_eq!(float64(-2.5e-10), "-2.5e-10");
        assert_eq!(float64(1e100), "1e+100");
    }

    #[test]
    fn test_float_specials() {
        assert_eq!(float64(f64::NAN), "NaN");
        assert_eq!(float64(f64::INFINITY), "+Inf");
        assert_eq!(float64(f64::NEG_INFINITY), "-Inf");
        assert_eq!(float32(f32::INFINITY), "+Inf");
    }

    #[test]
    fn test_complex() {
        assert_eq!(complex128(1.0, 2.0), "(1+2i)");
        assert_eq!(complex128(1.5, -0.5), "(1.5-0.5i)");
        assert_eq!(complex64(0.0, 1.1), "(0+1.1i)");
        assert_eq!(complex128(0.0, f64::INFINITY), "(0+Infi)");
    }

    #[test]
    fn test_duration_sub_second() {
        assert_eq!(duration(Duration::ZERO), "0s");
        assert_eq!(duration(Duration::from_nanos(850)), "850ns");
        assert_eq!(duration(Duration::from_nanos(1_500)), "1.5µs");
        assert_eq!(duration(Duration::from_micros(12)), "12µs");
        assert_eq!(duration(Duration::from_millis(250)), "250ms");
        assert_eq!(duration(Duration::from_nanos(1_234_567)), "1.234567ms");
    }

    #[test]
    fn test_duration_seconds_and_up() {
        assert_eq!(duration(Duration::from_secs(1)), "1s");
        assert_eq!(duration(Duration::from_millis(1_500)), "1.5s");
        assert_eq!(duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(duration(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(duration(Duration::from_millis(7_200_500)), "2h0m0.5s");
    }

    #[test]
    fn test_pad_counts_characters() {
        assert_eq!(pad_left("1s", 5), "   1s");
        assert_eq!(pad_left("1.5µs", 7), "  1.5µs");
        assert_eq!(pad_left("toolongvalue", 4), "toolongvalue");
    }
}

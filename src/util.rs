// Parsing and number helpers.
//
// All the forgiving CSV coercion lives here so the loader and the aggregator
// can work with plain typed values.
use num_format::{Locale, ToFormattedString};

/// Parse the leading integer of a string-like value, returning 0 when there
/// is none.
///
/// - Leading whitespace is skipped.
/// - An optional `+`/`-` sign is honoured.
/// - Parsing stops at the first non-digit, so `"2020 "` and `"12abc"` both
///   yield their numeric prefix.
/// - Missing, empty, non-numeric or overflowing values become 0.
pub fn parse_int_or_zero(s: Option<&str>) -> i64 {
    let Some(s) = s else { return 0 };
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return 0;
    }
    match rest[..digits_len].parse::<i64>() {
        Ok(v) if negative => -v,
        Ok(v) => v,
        Err(_) => 0,
    }
}

/// Same as [`parse_int_or_zero`] but for fields that can't be negative.
pub fn parse_u32_or_zero(s: Option<&str>) -> u32 {
    u32::try_from(parse_int_or_zero(s)).unwrap_or(0)
}

pub fn parse_u64_or_zero(s: Option<&str>) -> u64 {
    u64::try_from(parse_int_or_zero(s)).unwrap_or(0)
}

/// Owned, trimmed text for an optional column; missing becomes empty.
pub fn text(s: Option<String>) -> String {
    s.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Round to one decimal place, the precision every dashboard figure uses.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// `part / total * 100`, one decimal place. A zero total yields 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 / total as f64 * 100.0)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `1,234,567.8` style grouping of the integer part.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_integer_parse() {
        assert_eq!(parse_int_or_zero(Some("2020")), 2020);
        assert_eq!(parse_int_or_zero(Some("  2020 ")), 2020);
        assert_eq!(parse_int_or_zero(Some("12abc")), 12);
        assert_eq!(parse_int_or_zero(Some("-7")), -7);
        assert_eq!(parse_int_or_zero(Some("+7")), 7);
    }

    #[test]
    fn non_numeric_becomes_zero() {
        assert_eq!(parse_int_or_zero(None), 0);
        assert_eq!(parse_int_or_zero(Some("")), 0);
        assert_eq!(parse_int_or_zero(Some("abc")), 0);
        assert_eq!(parse_int_or_zero(Some("-")), 0);
        assert_eq!(parse_int_or_zero(Some("99999999999999999999999")), 0);
    }

    #[test]
    fn unsigned_parse_clamps_negative() {
        assert_eq!(parse_u32_or_zero(Some("-40")), 0);
        assert_eq!(parse_u32_or_zero(Some("215")), 215);
        assert_eq!(parse_u64_or_zero(Some("69900")), 69_900);
    }

    #[test]
    fn percentage_of_empty_total_is_zero() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(4, 4), 100.0);
    }

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_number(1234567.891, 1), "1,234,567.9");
        assert_eq!(format_number(-1500.0, 2), "-1,500.00");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(9855usize), "9,855");
    }
}

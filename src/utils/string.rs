//! String utility functions for text processing

/// Check whether a character is an INI blank (space or tab)
///
/// Newlines are not blanks: they terminate tokens.
pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Remove trailing spaces and tabs
///
/// # Arguments
///
/// * `s` - The string to trim
///
/// # Returns
///
/// The string without trailing blanks
pub fn trim_blanks_end(s: &str) -> &str {
    s.trim_end_matches(is_blank)
}

/// Compare two strings ignoring ASCII case, like `strcasecmp`
///
/// # Arguments
///
/// * `a` - The first string
/// * `b` - The second string
///
/// # Returns
///
/// True if both strings are equal ignoring case, false otherwise
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Parse the leading integer of a string, like C's `atoi`
///
/// Leading whitespace and a sign are accepted, parsing stops at the first
/// non-digit, and anything unparsable yields 0. Out-of-range values are
/// clamped.
pub fn parse_leading_int(s: &str) -> i32 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Parse the leading floating point number of a string, like C's `atof`
pub fn parse_leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        let frac_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        mantissa_digits += end - frac_start;
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    // Exponent only counts when it has digits of its own
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(0.0)
}

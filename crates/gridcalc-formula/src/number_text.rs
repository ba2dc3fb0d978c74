//! Rendering numbers as text the way Excel's "General" format does
//!
//! Numbers are rounded to 15 significant digits. Scientific notation is used
//! when the plain rendering of a small number would exceed 20 characters, or
//! when the decimal exponent of a large number exceeds 19.

/// Maximum length of a plain rendering before switching to scientific notation
const MAX_TEXT_LEN: usize = 20;

/// Number of significant decimal digits Excel keeps
pub const SIGNIFICANT_DIGITS: usize = 15;

/// Convert a number to its display text
///
/// # Examples
/// ```
/// use gridcalc_formula::number_text::to_text;
///
/// assert_eq!(to_text(0.05), "0.05");
/// assert_eq!(to_text(1e20), "1E+20");
/// assert_eq!(to_text(-0.0), "-0");
/// ```
pub fn to_text(value: f64) -> String {
    if value.is_nan() || value.is_infinite() {
        return "#NUM!".to_string();
    }

    let mut out = String::new();
    if value.is_sign_negative() {
        out.push('-');
    }
    let value = value.abs();

    // Zero and subnormals have no exponent bits
    if value == 0.0 || value.is_subnormal() {
        out.push('0');
        return out;
    }

    let (digits, exponent) = decimal_digits(value);
    if exponent < 0 {
        format_less_than_one(&mut out, &digits, exponent);
    } else {
        format_greater_than_one(&mut out, &digits, exponent);
    }
    out
}

/// Round a number to the given count of significant decimal digits
pub fn round_significant(value: f64, digits: usize) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }
    format!("{:.*e}", digits - 1, value)
        .parse()
        .unwrap_or(value)
}

/// Significant digits (trailing zeros removed) and decimal exponent of a positive number
fn decimal_digits(value: f64) -> (String, i32) {
    let rendered = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((&rendered, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mut digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    (digits, exponent)
}

fn format_less_than_one(out: &mut String, digits: &str, exponent: i32) {
    let leading_zeros = (-exponent - 1) as usize;
    let normal_length = 2 + leading_zeros + digits.len();
    if normal_length > MAX_TEXT_LEN {
        push_scientific(out, digits, "E-", -exponent);
        return;
    }
    out.push_str("0.");
    out.extend(std::iter::repeat('0').take(leading_zeros));
    out.push_str(digits);
}

fn format_greater_than_one(out: &mut String, digits: &str, exponent: i32) {
    if exponent > 19 {
        push_scientific(out, digits, "E+", exponent);
        return;
    }
    let int_len = exponent as usize + 1;
    if digits.len() > int_len {
        out.push_str(&digits[..int_len]);
        out.push('.');
        out.push_str(&digits[int_len..]);
    } else {
        out.push_str(digits);
        out.extend(std::iter::repeat('0').take(int_len - digits.len()));
    }
}

fn push_scientific(out: &mut String, digits: &str, marker: &str, exponent: i32) {
    out.push_str(&digits[..1]);
    if digits.len() > 1 {
        out.push('.');
        out.push_str(&digits[1..]);
    }
    out.push_str(marker);
    if exponent < 10 {
        out.push('0');
    }
    out.push_str(&exponent.to_string());
}

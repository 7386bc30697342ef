//! Text form of SQL values, as SQLite itself renders them

/// Significant digits SQLite keeps when turning a REAL into TEXT
const REAL_DIGITS: usize = 15;

/// Render a REAL the way `CAST(x AS TEXT)` does (printf `%!.15g`).
///
/// Fifteen significant digits with trailing zeros dropped, a `.0` kept on
/// whole numbers, and a two-digit signed exponent once the decimal exponent
/// leaves `-4..15`.
pub fn real_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-Inf" } else { "Inf" }.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let scientific = format!("{:.*e}", REAL_DIGITS - 1, value.abs());
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => (scientific.as_str(), "0"),
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let mut digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }

    if exponent < -4 || exponent >= REAL_DIGITS as i32 {
        let (first, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}{}.{}e{}{:02}", sign, first, rest, exp_sign, exponent.abs());
    }

    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("{}0.{}{}", sign, zeros, digits);
    }

    let whole_len = exponent as usize + 1;
    if digits.len() <= whole_len {
        let padding = "0".repeat(whole_len - digits.len());
        format!("{}{}{}.0", sign, digits, padding)
    } else {
        let (whole, fraction) = digits.split_at(whole_len);
        format!("{}{}.{}", sign, whole, fraction)
    }
}

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_signed_decimal, r"[-+]?[0-9]+(?:\.[0-9]+)?");

/// Coerce a consumption-like value to a number.
///
/// Numbers pass through. Text has commas and whitespace stripped, then the
/// first signed decimal in it is parsed. Anything else degrades to `0.0`.
pub fn parse_quantity(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_quantity_str(s).unwrap_or_else(|| {
            tracing::debug!(raw = %s, "Unparseable quantity, using 0");
            0.0
        }),
        other => {
            tracing::debug!(raw = %other, "Non-scalar quantity, using 0");
            0.0
        }
    }
}

/// The textual half of [`parse_quantity`]; `None` when no number is present.
///
/// Full-width digits, signs, points and commas are folded to ASCII first.
pub fn parse_quantity_str(s: &str) -> Option<f64> {
    let clean: String = s
        .chars()
        .map(to_ascii_width)
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let m = re_signed_decimal().find(&clean)?;
    m.as_str().parse::<f64>().ok()
}

fn to_ascii_width(c: char) -> char {
    match c {
        '０'..='９' | '＋' | '－' | '．' | '，' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn thousands_separator_and_unit() {
        assert_eq!(parse_quantity(&json!("1,234.5 kWh")), 1234.5);
    }

    #[test]
    fn dash_degrades_to_zero() {
        assert_eq!(parse_quantity(&json!("—")), 0.0);
        assert_eq!(parse_quantity(&json!("")), 0.0);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(parse_quantity(&json!(42)), 42.0);
        assert_eq!(parse_quantity(&json!(-3.25)), -3.25);
    }

    #[test]
    fn non_latin_labels_around_number() {
        assert_eq!(parse_quantity(&json!("用電量 2,345 度")), 2345.0);
        assert_eq!(parse_quantity(&json!("１２ kWh 7")), 12.0);
    }

    #[test]
    fn full_width_digits_are_read() {
        assert_eq!(parse_quantity(&json!("１２３４ 度")), 1234.0);
        assert_eq!(parse_quantity(&json!("１，２３４．５ kWh")), 1234.5);
        assert_eq!(parse_quantity(&json!("－３")), -3.0);
    }

    #[test]
    fn whitespace_inside_number_is_removed() {
        assert_eq!(parse_quantity(&json!(" 1 234 . 5 ")), 1234.5);
    }

    #[test]
    fn first_number_wins_and_sign_is_kept() {
        assert_eq!(parse_quantity(&json!("-12.5 then 99")), -12.5);
        assert_eq!(parse_quantity(&json!("+7kWh")), 7.0);
    }

    #[test]
    fn other_json_types_are_zero() {
        assert_eq!(parse_quantity(&json!(null)), 0.0);
        assert_eq!(parse_quantity(&json!(true)), 0.0);
        assert_eq!(parse_quantity(&json!({"valueNumber": 3})), 0.0);
    }

    #[test]
    fn str_variant_reports_absence() {
        assert_eq!(parse_quantity_str("n/a"), None);
        assert_eq!(parse_quantity_str("1,000"), Some(1000.0));
    }
}

//! Tolerant conversions for spreadsheet and form input.
//!
//! Every parser returns `None` for empty or malformed tokens; nothing here errors.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::IgnoredAny;
use time::{macros::format_description, Date};

const PRICE_NOISE: [&str; 5] = ["auction", "guide", "prior", "offers", "tba"];

static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(mil|m|k)?").expect("price pattern compiles")
});

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern compiles"));

pub fn parse_real(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses as a real number and truncates toward zero.
pub fn parse_int(token: &str) -> Option<i64> {
    parse_real(token)
        .map(f64::trunc)
        .filter(|value| value.abs() < i64::MAX as f64)
        .map(|value| value as i64)
}

/// Room and year counts: integers that must not be negative.
pub fn parse_count(token: &str) -> Option<u32> {
    parse_int(token).and_then(|value| u32::try_from(value).ok())
}

/// Reads asking/sold prices such as `$1.2m`, `850k`, `Auction guide $900,000+`.
///
/// Without a suffix, numbers below 10 are read as millions and numbers below
/// 10,000 as thousands.
pub fn parse_price(token: &str) -> Option<u64> {
    let mut cleaned = token.trim().to_lowercase().replace(['$', ',', '+'], "");
    for word in PRICE_NOISE {
        cleaned = cleaned.replace(word, "");
    }

    let captures = PRICE_PATTERN.captures(&cleaned)?;
    let number: f64 = captures.get(1)?.as_str().parse().ok()?;

    let value = match captures.get(2).map(|suffix| suffix.as_str()) {
        Some("m") | Some("mil") => number * 1_000_000.0,
        Some("k") => number * 1_000.0,
        _ if number < 10.0 => number * 1_000_000.0,
        _ if number < 10_000.0 => number * 1_000.0,
        _ => number,
    };

    Some(value.round().max(0.0) as u64)
}

/// First number in the token, in square metres. Units are ignored.
pub fn parse_land_size(token: &str) -> Option<f64> {
    let cleaned = token.replace(',', "");
    NUMBER_PATTERN
        .find(&cleaned)
        .and_then(|found| found.as_str().parse::<f64>().ok())
}

/// Tries, in order: `2024-03-05`, `05/03/2024`, `05-03-2024`, `05-Mar-24`, `05-Mar-2024`.
pub fn parse_date(token: &str) -> Option<Date> {
    let value = token.trim();
    if value.is_empty() {
        return None;
    }

    let numeric = [
        format_description!("[year]-[month padding:none]-[day padding:none]"),
        format_description!("[day padding:none]/[month padding:none]/[year]"),
        format_description!("[day padding:none]-[month padding:none]-[year]"),
    ];
    if let Some(date) = numeric
        .into_iter()
        .find_map(|format| Date::parse(value, format).ok())
    {
        return Some(date);
    }

    let abbreviated =
        format_description!("[day padding:none]-[month repr:short case_sensitive:false]-[year]");
    if let Some(expanded) = expand_two_digit_year(value) {
        if let Ok(date) = Date::parse(&expanded, abbreviated) {
            return Some(date);
        }
    }
    Date::parse(value, abbreviated).ok()
}

/// `05-Mar-24` -> `05-Mar-2024`; 00-68 map to 20xx, 69-99 to 19xx.
fn expand_two_digit_year(value: &str) -> Option<String> {
    let (head, year) = value.rsplit_once('-')?;
    if year.len() != 2 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !head.bytes().any(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let short: i32 = year.parse().ok()?;
    let full = if short < 69 { 2000 + short } else { 1900 + short };
    Some(format!("{head}-{full}"))
}

/// Accepts a JSON string, number, bool or null and yields its text form.
/// Objects and arrays are skipped and read as absent.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct TextOrNumber;

    impl<'de> serde::de::Visitor<'de> for TextOrNumber {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string, number, null or any skipped value")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(TextOrNumber)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(TextOrNumber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    fn date(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).unwrap()
    }

    #[test]
    fn real_and_int_parsers() {
        assert_eq!(parse_real(" 3.5 "), Some(3.5));
        assert_eq!(parse_real(""), None);
        assert_eq!(parse_real("three"), None);
        assert_eq!(parse_real("NaN"), None);
        assert_eq!(parse_int("3.9"), Some(3));
        assert_eq!(parse_int("-2.7"), Some(-2));
        assert_eq!(parse_int("n/a"), None);
        assert_eq!(parse_count("4"), Some(4));
        assert_eq!(parse_count("-1"), None);
    }

    #[test]
    fn price_with_separators() {
        assert_eq!(parse_price("$1,250,000"), Some(1_250_000));
    }

    #[test]
    fn price_with_suffixes() {
        assert_eq!(parse_price("850k"), Some(850_000));
        assert_eq!(parse_price("$1.2m"), Some(1_200_000));
        assert_eq!(parse_price("1.35 mil"), Some(1_350_000));
        assert_eq!(parse_price("2 million"), Some(2_000_000));
        assert_eq!(parse_price("720K"), Some(720_000));
    }

    #[test]
    fn price_without_digits_is_absent() {
        assert_eq!(parse_price("Auction"), None);
        assert_eq!(parse_price("TBA"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn price_noise_words_are_ignored() {
        assert_eq!(parse_price("Auction guide $900,000+"), Some(900_000));
        assert_eq!(parse_price("Offers over $749,000"), Some(749_000));
        assert_eq!(parse_price("Sold prior 1.1m"), Some(1_100_000));
    }

    #[test]
    fn price_magnitude_inference_without_suffix() {
        assert_eq!(parse_price("1.2"), Some(1_200_000));
        assert_eq!(parse_price("9"), Some(9_000_000));
        assert_eq!(parse_price("850"), Some(850_000));
        assert_eq!(parse_price("9999"), Some(9_999_000));
        assert_eq!(parse_price("10000"), Some(10_000));
    }

    #[test]
    fn land_size_ignores_units() {
        assert_eq!(parse_land_size("1,012 m2"), Some(1012.0));
        assert_eq!(parse_land_size("650.5sqm"), Some(650.5));
        assert_eq!(parse_land_size("approx. 700"), Some(700.0));
        assert_eq!(parse_land_size("unit"), None);
    }

    #[test]
    fn date_formats_in_order() {
        let expected = date(2024, Month::March, 5);
        assert_eq!(parse_date("2024-03-05"), Some(expected));
        assert_eq!(parse_date("05/03/2024"), Some(expected));
        assert_eq!(parse_date("5/3/2024"), Some(expected));
        assert_eq!(parse_date("05-03-2024"), Some(expected));
        assert_eq!(parse_date("05-Mar-24"), Some(expected));
        assert_eq!(parse_date("05-mar-2024"), Some(expected));
    }

    #[test]
    fn two_digit_years_pivot() {
        assert_eq!(parse_date("01-Jan-99"), Some(date(1999, Month::January, 1)));
        assert_eq!(parse_date("01-Jan-68"), Some(date(2068, Month::January, 1)));
    }

    #[derive(serde::Deserialize)]
    struct Cell {
        #[serde(default, deserialize_with = "lenient_text")]
        value: Option<String>,
    }

    fn cell(json: &str) -> Option<String> {
        serde_json::from_str::<Cell>(json).unwrap().value
    }

    #[test]
    fn lenient_text_reads_scalars_as_text() {
        assert_eq!(cell(r#"{"value": "3"}"#).as_deref(), Some("3"));
        assert_eq!(cell(r#"{"value": 650000}"#).as_deref(), Some("650000"));
        assert_eq!(cell(r#"{"value": -2}"#).as_deref(), Some("-2"));
        assert_eq!(cell(r#"{"value": true}"#).as_deref(), Some("true"));
        assert_eq!(cell(r#"{"value": null}"#), None);
        assert_eq!(cell("{}"), None);
    }

    #[test]
    fn lenient_text_skips_objects_and_arrays() {
        assert_eq!(cell(r#"{"value": {"amount": 700000, "nested": [1, {"a": 2}]}}"#), None);
        assert_eq!(cell(r#"{"value": [650000, "k"]}"#), None);
    }

    #[test]
    fn unparsable_dates_are_absent() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("March 2024"), None);
        assert_eq!(parse_date("31/02/2024"), None);
    }
}

//! Conversion of test case marks into flags and counts

use regex::Regex;
use std::sync::LazyLock;

static TRUE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:[tyj]|1|yes|ja|si|true|ok)$").expect("Hardcode regex pattern"));

static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("Hardcode regex pattern"));

/// Returns true for the tokens `t y j 1 yes ja si true ok` in any case.
pub fn get_boolean(value: Option<&str>) -> bool {
    value.map(|value| TRUE_VALUE.is_match(value)).unwrap_or(false)
}

/// Reads the leading integer of a value, `1` when there is none or it is not positive.
pub fn get_multiplicity_from_value(value: Option<&str>) -> usize {
    value
        .and_then(|value| LEADING_INTEGER.captures(value))
        .and_then(|captures| captures[1].parse::<i64>().ok())
        .filter(|multiplicity| *multiplicity > 0)
        .and_then(|multiplicity| usize::try_from(multiplicity).ok())
        .unwrap_or(1)
}

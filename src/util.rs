// Utility helpers for parsing, ordering and number formatting.
//
// This module centralizes all the "dirty" value handling so the rest of the
// code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};
use serde_json::Value;
use std::cmp::Ordering;

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace and an optional `Rp` prefix.
/// - Rejects values that still contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    let s = s.strip_prefix("Rp").unwrap_or(s).trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric view of a JSON cell; strings go through [`parse_f64_safe`].
pub fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_f64_safe(Some(s.as_str())),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Text view of a JSON cell, trimmed. Numbers keep their JSON spelling so a
/// year sent as `2024` reads the same as `"2024"`.
pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn next_chunk(s: &str) -> Option<(&str, &str)> {
    let first = s.chars().next()?;
    let digit = first.is_ascii_digit();
    let end = s
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() != digit)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn compare_chunk(a: &str, b: &str) -> Ordering {
    let a_digit = a.starts_with(|c: char| c.is_ascii_digit());
    let b_digit = b.starts_with(|c: char| c.is_ascii_digit());
    match (a_digit, b_digit) {
        (true, true) => {
            let ta = a.trim_start_matches('0');
            let tb = b.trim_start_matches('0');
            ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let fa = a.chars().flat_map(char::to_lowercase);
            let fb = b.chars().flat_map(char::to_lowercase);
            fa.cmp(fb)
        }
    }
}

/// Locale-style ordering with numeric awareness: case-insensitive text runs,
/// digit runs compared by value, so `"RW 2"` sorts before `"RW 10"`.
///
/// Values that only differ in case or leading zeros fall back to byte order,
/// which keeps this a total order usable with `sort_by`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut ra, mut rb) = (a, b);
    loop {
        match (next_chunk(ra), next_chunk(rb)) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((ca, na)), Some((cb, nb))) => {
                let ord = compare_chunk(ca, cb);
                if ord != Ordering::Equal {
                    return ord;
                }
                ra = na;
                rb = nb;
            }
        }
    }
    a.cmp(b)
}

/// Collect, drop blanks, sort with [`natural_cmp`] and de-duplicate.
pub fn sorted_unique<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    out.sort_by(|a, b| natural_cmp(a, b));
    out.dedup();
    out
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with `1,234,567.89` style grouping.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let (Some(frac), true) = (frac_part, decimals > 0) {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Whole-rupiah amount with Indonesian grouping, e.g. `Rp 14.673.664.072.956`.
pub fn format_rupiah(n: f64) -> String {
    let rounded = n.round();
    let abs = rounded.abs() as i64;
    let body = abs.to_formatted_string(&Locale::id);
    if rounded < 0.0 {
        format!("-Rp {}", body)
    } else {
        format!("Rp {}", body)
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

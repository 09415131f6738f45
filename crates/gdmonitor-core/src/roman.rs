//! Roman-numeral month tokens for Hungarian legal citations.
//!
//! Government resolutions are dated inside their citation header as
//! `(V. 15.)`: the month is a Roman numeral, the day a decimal ordinal.
//!
//! # Conventions
//!
//! - Months run from `I` (January) to `XII` (December)
//! - Tokens are case-insensitive (`v.` and `V.` both mean May)
//! - Anything else (`XIII`, `IIII`, `MCM`) is not a month and maps to `0`

const MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// Map a Roman month token to its month number.
///
/// Input: `"V"`, `"xii"`, `" IX "`
/// Output: `5`, `12`, `9`
///
/// Unmapped tokens yield the sentinel `0`, which is never a valid calendar
/// month; callers composing a date must treat it as a failure.
pub fn month_from_roman(token: &str) -> u32 {
    let upper = token.trim().to_ascii_uppercase();
    MONTHS
        .iter()
        .position(|m| *m == upper)
        .map(|i| i as u32 + 1)
        .unwrap_or(0)
}

/// Canonical upper-case Roman token for a month number (1-12).
pub fn roman_month(month: u32) -> Option<&'static str> {
    let idx = month.checked_sub(1)? as usize;
    MONTHS.get(idx).copied()
}

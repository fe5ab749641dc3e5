//! Display dates and their sortable keys.
//!
//! Signals carry a display date (`DD/MM/YYYY`), works an ISO date. Sorting
//! compares `YYYY-MM-DD` strings derived from either.

use chrono::{Local, NaiveDate};

/// Display form used when publishing stamps a date.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Today's display date in local time.
pub fn today_display() -> String {
    display_date(Local::now().date_naive())
}

/// Sortable `YYYY-MM-DD` key for a stored date string.
///
/// ISO values pass through; day-first values separated by `/`, `-` or `.`
/// are reversed. Anything else yields an empty key, which sorts last when
/// ordering newest first.
pub fn sort_key(date: &str) -> String {
    let date = date.trim();

    if let Some(prefix) = date.get(..10) {
        if NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok() {
            return prefix.to_string();
        }
    }

    let parts: Vec<&str> = date.split(['/', '-', '.']).map(str::trim).collect();
    if let [day, month, year] = parts.as_slice() {
        if let (Ok(d), Ok(m), Ok(y)) = (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>()) {
            if year.len() == 4 {
                if let Some(parsed) = NaiveDate::from_ymd_opt(y, m, d) {
                    return parsed.format("%Y-%m-%d").to_string();
                }
            }
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_passes_through() {
        assert_eq!(sort_key("2024-03-12"), "2024-03-12");
        assert_eq!(sort_key("2024-03-12T10:00:00Z"), "2024-03-12");
    }

    #[test]
    fn test_day_first_is_reversed() {
        assert_eq!(sort_key("05/02/2025"), "2025-02-05");
        assert_eq!(sort_key("5/2/2025"), "2025-02-05");
        assert_eq!(sort_key("31.12.2024"), "2024-12-31");
        assert_eq!(sort_key("01-06-2023"), "2023-06-01");
    }

    #[test]
    fn test_garbage_yields_empty_key() {
        assert_eq!(sort_key(""), "");
        assert_eq!(sort_key("ontem"), "");
        assert_eq!(sort_key("32/01/2024"), "");
        assert_eq!(sort_key("01/02/24"), "");
    }

    #[test]
    fn test_display_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(display_date(date), "19/10/2026");
        assert_eq!(sort_key(&display_date(date)), "2026-10-19");
    }
}

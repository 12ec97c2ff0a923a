//! Menu text and parsing of what the user types.

use crate::error::{CliError, Result};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use std::io::{self, Write};
use tradebook::TradeId;
use tradebook_core::queries::TradeQueryKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
    Exit,
    Generate,
    Inventory,
    UserAccounts,
    AccountPositions,
    Trades,
}

impl MainChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "0" => Some(MainChoice::Exit),
            "1" => Some(MainChoice::Generate),
            "2" => Some(MainChoice::Inventory),
            "3" => Some(MainChoice::UserAccounts),
            "4" => Some(MainChoice::AccountPositions),
            "5" => Some(MainChoice::Trades),
            _ => None,
        }
    }
}

/// Submenu entry: cancel, or one of the trade searches.
pub fn parse_trade_choice(input: &str) -> Option<Option<TradeQueryKind>> {
    match input.trim() {
        "0" => Some(None),
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| TradeQueryKind::ALL.get(i).copied())
            .map(Some),
    }
}

pub fn write_main_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== Tradebook ===")?;
    writeln!(out, "1. Generate random data")?;
    writeln!(out, "2. Database inventory")?;
    writeln!(out, "3. Random user's accounts")?;
    writeln!(out, "4. Random account's positions")?;
    writeln!(out, "5. Trade queries")?;
    writeln!(out, "0. Exit")?;
    write!(out, "Choice: ")?;
    out.flush()
}

pub fn write_trade_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "--- Trade queries ---")?;
    for (i, kind) in TradeQueryKind::ALL.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, kind)?;
    }
    writeln!(out, "0. Cancel")?;
    write!(out, "Choice: ")?;
    out.flush()
}

/// Reads a count, or `default` when the input is blank.
pub fn parse_count(input: &str, default: u32) -> Result<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(default);
    }
    input
        .parse::<u32>()
        .map_err(|_| CliError::Input(format!("'{}' is not a whole number", input)))
}

fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::Input(format!("'{}' is not a YYYY-MM-DD date", input.trim())))
}

fn midnight(day: NaiveDate) -> TradeId {
    TradeId::from_datetime(day.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// First trade id of a day.
pub fn day_start(input: &str) -> Result<TradeId> {
    parse_day(input).map(midnight)
}

/// First trade id after a day, so the whole day is included.
pub fn day_end(input: &str) -> Result<TradeId> {
    let day = parse_day(input)?;
    day.checked_add_days(Days::new(1))
        .map(midnight)
        .ok_or_else(|| CliError::Input(format!("'{}' is out of range", input.trim())))
}

/// The last month up to `now`.
pub fn default_range(now: DateTime<Utc>) -> (TradeId, TradeId) {
    let from = now.checked_sub_months(Months::new(1)).unwrap_or(now);
    (TradeId::from_datetime(from), TradeId::from_datetime(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_main_choices() {
        assert_eq!(MainChoice::parse(" 0\n"), Some(MainChoice::Exit));
        assert_eq!(MainChoice::parse("5"), Some(MainChoice::Trades));
        assert_eq!(MainChoice::parse("6"), None);
        assert_eq!(MainChoice::parse("abc"), None);
    }

    #[test]
    fn test_trade_choices() {
        assert_eq!(parse_trade_choice("0"), Some(None));
        assert_eq!(parse_trade_choice("1"), Some(Some(TradeQueryKind::All)));
        assert_eq!(
            parse_trade_choice("5"),
            Some(Some(TradeQueryKind::DateRangeSymbol))
        );
        assert_eq!(parse_trade_choice("6"), None);
        assert_eq!(parse_trade_choice("-1"), None);
    }

    #[test]
    fn test_days_cover_whole_day() {
        let start = day_start("2024-02-28").unwrap();
        let end = day_end("2024-02-28").unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap();
        assert_eq!(start, TradeId::from_datetime(expected));
        assert_eq!(end.as_micros() - start.as_micros(), 86_400_000_000);
        assert!(day_start("28/02/2024").is_err());
    }

    #[test]
    fn test_default_range_is_one_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let (from, to) = default_range(now);
        assert_eq!(
            from,
            TradeId::from_datetime(Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap())
        );
        assert_eq!(to, TradeId::from_datetime(now));
    }

    #[test]
    fn test_counts() {
        assert_eq!(parse_count("", 4).unwrap(), 4);
        assert_eq!(parse_count(" 12 ", 4).unwrap(), 12);
        assert!(parse_count("-3", 4).is_err());
    }
}

//! Dosing-frequency parsing.
//!
//! Prescribers write frequencies three ways:
//! - slot patterns: `1-0-1` (morning-afternoon-night), also `1/0/1`, `½-0-½`, `0.5-0-0.5`
//! - mnemonics: `OD`, `BD`, `TDS`, `QID`, `HS`, `SOS`, `PRN`, `STAT` and their aliases
//! - a plain count: `3`, `3x`, `3 times a day`
//!
//! [`Frequency::suggested_quantity`] turns a parsed frequency and a duration into the
//! quantity pre-filled on a dispense or prescription line. It is only a suggestion.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// Once daily.
    Od,
    /// Twice daily.
    Bd,
    /// Three times daily.
    Tds,
    /// Four times daily.
    Qid,
    /// At bedtime.
    Hs,
    /// As needed.
    Sos,
    /// As needed.
    Prn,
    /// Once, immediately.
    Stat,
}

impl Mnemonic {
    pub fn from_code(code: &str) -> Option<Self> {
        let mnemonic = match code {
            "OD" | "QD" | "ONCE" | "DAILY" => Mnemonic::Od,
            "BD" | "BID" => Mnemonic::Bd,
            "TDS" | "TID" => Mnemonic::Tds,
            "QID" | "QDS" => Mnemonic::Qid,
            "HS" | "NOCTE" => Mnemonic::Hs,
            "SOS" => Mnemonic::Sos,
            "PRN" => Mnemonic::Prn,
            "STAT" => Mnemonic::Stat,
            _ => return None,
        };
        Some(mnemonic)
    }

    /// Administrations per day; `None` for as-needed and one-off codes.
    pub fn doses_per_day(&self) -> Option<u32> {
        match self {
            Mnemonic::Od | Mnemonic::Hs => Some(1),
            Mnemonic::Bd => Some(2),
            Mnemonic::Tds => Some(3),
            Mnemonic::Qid => Some(4),
            Mnemonic::Sos | Mnemonic::Prn | Mnemonic::Stat => None,
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Mnemonic::Od => "OD",
            Mnemonic::Bd => "BD",
            Mnemonic::Tds => "TDS",
            Mnemonic::Qid => "QID",
            Mnemonic::Hs => "HS",
            Mnemonic::Sos => "SOS",
            Mnemonic::Prn => "PRN",
            Mnemonic::Stat => "STAT",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frequency {
    FixedSlots { morning: f64, afternoon: f64, night: f64 },
    Mnemonic(Mnemonic),
    TimesPerDay(u32),
    Unparseable,
}

impl Frequency {
    pub fn parse(input: &str) -> Self {
        let text = input.trim().to_ascii_uppercase();
        if text.is_empty() {
            return Frequency::Unparseable;
        }

        if let Some(slots) = parse_slots(&text) {
            return slots;
        }

        let compact: String = text.chars().filter(|c| !matches!(c, '.' | ' ')).collect();
        if let Some(mnemonic) = Mnemonic::from_code(&compact) {
            return Frequency::Mnemonic(mnemonic);
        }

        parse_times_per_day(&text).unwrap_or(Frequency::Unparseable)
    }

    /// Units per day, when the frequency implies a regular schedule.
    pub fn daily_units(&self) -> Option<f64> {
        match self {
            Frequency::FixedSlots {
                morning,
                afternoon,
                night,
            } => Some(morning + afternoon + night),
            Frequency::Mnemonic(m) => m.doses_per_day().map(f64::from),
            Frequency::TimesPerDay(n) => Some(f64::from(*n)),
            Frequency::Unparseable => None,
        }
    }

    /// Suggested total for `duration_days`.
    ///
    /// `STAT` is always one unit. As-needed codes, unparseable input, a zero total and a
    /// missing or zero duration give no suggestion. Fractional totals round up.
    pub fn suggested_quantity(&self, duration_days: Option<u32>) -> Option<u32> {
        if let Frequency::Mnemonic(Mnemonic::Stat) = self {
            return Some(1);
        }
        let days = duration_days.filter(|d| *d > 0)?;
        let per_day = self.daily_units().filter(|u| *u > 0.0)?;
        Some((per_day * f64::from(days)).ceil() as u32)
    }
}

fn parse_slots(text: &str) -> Option<Frequency> {
    let separator = if text.contains('-') {
        '-'
    } else if text.contains('/') {
        '/'
    } else {
        return None;
    };

    let parts: Vec<&str> = text.split(separator).map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let mut slots = [0.0_f64; 3];
    for (slot, part) in slots.iter_mut().zip(&parts) {
        *slot = parse_slot(part)?;
    }
    Some(Frequency::FixedSlots {
        morning: slots[0],
        afternoon: slots[1],
        night: slots[2],
    })
}

fn parse_slot(part: &str) -> Option<f64> {
    match part {
        "½" => Some(0.5),
        "¼" => Some(0.25),
        "¾" => Some(0.75),
        _ => part.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0),
    }
}

fn parse_times_per_day(text: &str) -> Option<Frequency> {
    let digits: String = text
        .trim_start_matches('X')
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    let rest = text.trim_start_matches('X').trim_start()[digits.len()..].trim();
    let recognised_suffix = rest.is_empty()
        || rest.starts_with('X')
        || rest.starts_with("TIMES")
        || rest.starts_with("/DAY")
        || rest.starts_with("PER DAY");
    if !recognised_suffix {
        return None;
    }
    digits.parse::<u32>().ok().map(Frequency::TimesPerDay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_pattern_over_five_days() {
        let freq = Frequency::parse("1-0-1");
        assert_eq!(
            freq,
            Frequency::FixedSlots {
                morning: 1.0,
                afternoon: 0.0,
                night: 1.0
            }
        );
        assert_eq!(freq.suggested_quantity(Some(5)), Some(10));
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Frequency::parse("BD").suggested_quantity(Some(5)), Some(10));
        assert_eq!(Frequency::parse("bid").suggested_quantity(Some(5)), Some(10));
        assert_eq!(Frequency::parse("T.D.S").suggested_quantity(Some(3)), Some(9));
        assert_eq!(Frequency::parse("HS").suggested_quantity(Some(7)), Some(7));
    }

    #[test]
    fn test_as_needed_gives_no_suggestion() {
        assert_eq!(Frequency::parse("SOS").suggested_quantity(Some(5)), None);
        assert_eq!(Frequency::parse("SOS").suggested_quantity(Some(30)), None);
        assert_eq!(Frequency::parse("prn").suggested_quantity(Some(5)), None);
    }

    #[test]
    fn test_stat_is_one_regardless_of_days() {
        assert_eq!(Frequency::parse("STAT").suggested_quantity(Some(5)), Some(1));
        assert_eq!(Frequency::parse("stat").suggested_quantity(None), Some(1));
        assert_eq!(Frequency::parse("STAT").suggested_quantity(Some(0)), Some(1));
    }

    #[test]
    fn test_times_per_day_fallback() {
        assert_eq!(Frequency::parse("3"), Frequency::TimesPerDay(3));
        assert_eq!(Frequency::parse("2x"), Frequency::TimesPerDay(2));
        assert_eq!(Frequency::parse("x2"), Frequency::TimesPerDay(2));
        assert_eq!(Frequency::parse("3 times a day"), Frequency::TimesPerDay(3));
        assert_eq!(Frequency::parse("4 times").suggested_quantity(Some(2)), Some(8));
    }

    #[test]
    fn test_fractional_slots_round_up() {
        let freq = Frequency::parse("0.5-0-0.5");
        assert_eq!(freq.daily_units(), Some(1.0));
        assert_eq!(Frequency::parse("½-0-0").suggested_quantity(Some(3)), Some(2));
        assert_eq!(Frequency::parse("1/1/1").suggested_quantity(Some(2)), Some(6));
    }

    #[test]
    fn test_unparseable_and_missing_duration() {
        assert_eq!(Frequency::parse("after meals"), Frequency::Unparseable);
        assert_eq!(Frequency::parse(""), Frequency::Unparseable);
        assert_eq!(Frequency::parse("1-0"), Frequency::Unparseable);
        assert_eq!(Frequency::parse("a-b-c"), Frequency::Unparseable);
        assert_eq!(Frequency::parse("1-0-1").suggested_quantity(None), None);
        assert_eq!(Frequency::parse("0-0-0").suggested_quantity(Some(5)), None);
    }
}

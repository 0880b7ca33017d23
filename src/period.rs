use chrono::{Datelike, NaiveDate};

use crate::score::EngineError;

/// An inclusive scoring window plus the one or two calendar years it spans.
///
/// Academic years run July through June in this deployment, so a window
/// covers two calendar years; a plain calendar year repeats the same value.
/// The engine only ever sees the resolved bounds and never re-derives them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub years: [i32; 2],
    pub label: String,
}

impl ScoringPeriod {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        years: [i32; 2],
        label: impl Into<String>,
    ) -> Result<Self, EngineError> {
        if end < start {
            return Err(EngineError::InvalidInput(format!(
                "period ends {end} before it starts {start}"
            )));
        }
        Ok(Self {
            start,
            end,
            years,
            label: label.into(),
        })
    }

    /// July 1 of `start_year` through June 30 of the following year.
    pub fn academic_year(start_year: i32) -> Result<Self, EngineError> {
        let start = date(start_year, 7, 1)?;
        let end = date(start_year + 1, 6, 30)?;
        Self::new(
            start,
            end,
            [start_year, start_year + 1],
            format!("{}-{:02}", start_year, (start_year + 1).rem_euclid(100)),
        )
    }

    /// January 1 through December 31 of one calendar year.
    pub fn calendar_year(year: i32) -> Result<Self, EngineError> {
        let start = date(year, 1, 1)?;
        let end = date(year, 12, 31)?;
        Self::new(start, end, [year, year], year.to_string())
    }

    /// Resolve a year label: `2024-25` and `2024-2025` select the academic
    /// year starting in 2024, a bare `2024` selects the calendar year.
    pub fn parse(label: &str) -> Result<Self, EngineError> {
        let label = label.trim();
        match label.split_once('-') {
            Some((first, second)) => {
                let start_year: i32 = first.parse().map_err(|_| bad_label(label))?;
                let next: i32 = second.parse().map_err(|_| bad_label(label))?;
                if next != start_year + 1 && next != (start_year + 1).rem_euclid(100) {
                    return Err(bad_label(label));
                }
                Self::academic_year(start_year)
            }
            None => {
                let year: i32 = label.parse().map_err(|_| bad_label(label))?;
                Self::calendar_year(year)
            }
        }
    }

    /// The academic year containing `today`: July or later belongs to the
    /// year that just started, earlier months to the one that started last
    /// July.
    pub fn current_academic_year(today: NaiveDate) -> Result<Self, EngineError> {
        let start_year = if today.month() >= 7 {
            today.year()
        } else {
            today.year() - 1
        };
        Self::academic_year(start_year)
    }
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, EngineError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| EngineError::InvalidInput(format!("year {year} is out of range")))
}

fn bad_label(label: &str) -> EngineError {
    EngineError::InvalidInput(format!(
        "cannot parse year label {label:?}; expected e.g. 2024-25 or 2024"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn academic_year_spans_july_to_june() {
        let period = ScoringPeriod::academic_year(2024).unwrap();
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
        assert_eq!(period.years, [2024, 2025]);
        assert_eq!(period.label, "2024-25");
    }

    #[test]
    fn calendar_year_repeats_its_year() {
        let period = ScoringPeriod::calendar_year(2024).unwrap();
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(period.years, [2024, 2024]);
    }

    #[test]
    fn parse_accepts_both_label_styles() {
        let short = ScoringPeriod::parse("2024-25").unwrap();
        let long = ScoringPeriod::parse("2024-2025").unwrap();
        assert_eq!(short, long);
        assert_eq!(short.years, [2024, 2025]);

        let calendar = ScoringPeriod::parse("2023").unwrap();
        assert_eq!(calendar.years, [2023, 2023]);
    }

    #[test]
    fn parse_rejects_malformed_labels() {
        assert!(ScoringPeriod::parse("next year").is_err());
        assert!(ScoringPeriod::parse("2024-23").is_err());
        assert!(ScoringPeriod::parse("2024-26").is_err());
    }

    #[test]
    fn current_academic_year_rolls_over_in_july() {
        let june = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let july = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(
            ScoringPeriod::current_academic_year(june).unwrap().label,
            "2023-24"
        );
        assert_eq!(
            ScoringPeriod::current_academic_year(july).unwrap().label,
            "2024-25"
        );
    }

    #[test]
    fn rejects_window_ending_before_it_starts() {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let err = ScoringPeriod::new(start, end, [2024, 2024], "bad").unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}

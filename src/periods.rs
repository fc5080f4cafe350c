//! Reporting periods: presets, navigation and labels for report filters.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeriodType {
    Month,
    Quarter,
    Year,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodPreset {
    ThisMonth,
    LastMonth,
    ThisQuarter,
    LastQuarter,
    ThisYear,
    LastYear,
}

impl FromStr for PeriodPreset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "this_month" => Ok(Self::ThisMonth),
            "last_month" => Ok(Self::LastMonth),
            "this_quarter" => Ok(Self::ThisQuarter),
            "last_quarter" => Ok(Self::LastQuarter),
            "this_year" => Ok(Self::ThisYear),
            "last_year" => Ok(Self::LastYear),
            _ => Err(()),
        }
    }
}

impl PeriodPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::ThisQuarter => "this_quarter",
            Self::LastQuarter => "last_quarter",
            Self::ThisYear => "this_year",
            Self::LastYear => "last_year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ThisMonth => "This Month",
            Self::LastMonth => "Last Month",
            Self::ThisQuarter => "This Quarter",
            Self::LastQuarter => "Last Quarter",
            Self::ThisYear => "This Year",
            Self::LastYear => "Last Year",
        }
    }

    pub fn all() -> &'static [PeriodPreset] {
        &[
            Self::ThisMonth,
            Self::LastMonth,
            Self::ThisQuarter,
            Self::LastQuarter,
            Self::ThisYear,
            Self::LastYear,
        ]
    }
}

/// Inclusive date range covered by a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub preset: Option<PeriodPreset>,
}

impl DateRange {
    pub fn from_preset_at(preset: PeriodPreset, today: NaiveDate) -> Self {
        let (from, to) = match preset {
            PeriodPreset::ThisMonth => (month_start(today), month_end(today)),
            PeriodPreset::LastMonth => {
                let last = month_start(today) - Duration::days(1);
                (month_start(last), month_end(last))
            }
            PeriodPreset::ThisQuarter => (quarter_start(today), quarter_end(today)),
            PeriodPreset::LastQuarter => {
                let last = quarter_start(today) - Duration::days(1);
                (quarter_start(last), quarter_end(last))
            }
            PeriodPreset::ThisYear => (year_start(today), year_end(today)),
            PeriodPreset::LastYear => {
                let last = year_start(today) - Duration::days(1);
                (year_start(last), year_end(last))
            }
        };
        Self {
            from,
            to,
            preset: Some(preset),
        }
    }

    /// Custom range; swapped when given backwards.
    pub fn from_dates(from: NaiveDate, to: NaiveDate, today: NaiveDate) -> Self {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let preset = PeriodPreset::all()
            .iter()
            .copied()
            .find(|p| {
                let r = Self::from_preset_at(*p, today);
                r.from == from && r.to == to
            });
        Self { from, to, preset }
    }

    fn period_type(&self) -> PeriodType {
        if self.from == month_start(self.from) && self.to == month_end(self.from) {
            PeriodType::Month
        } else if self.from == quarter_start(self.from) && self.to == quarter_end(self.from) {
            PeriodType::Quarter
        } else if self.from == year_start(self.from) && self.to == year_end(self.from) {
            PeriodType::Year
        } else {
            PeriodType::Custom
        }
    }

    pub fn prev(&self, today: NaiveDate) -> Self {
        let (from, to) = shift(self.from, self.to, self.period_type(), -1);
        Self::from_dates(from, to, today)
    }

    pub fn next(&self, today: NaiveDate) -> Self {
        let (from, to) = shift(self.from, self.to, self.period_type(), 1);
        Self::from_dates(from, to, today)
    }

    /// "March 2025", "Q1 2025", "2025", or "Jan 5 - Feb 20, 2025".
    pub fn display_label(&self) -> String {
        match self.period_type() {
            PeriodType::Month => self.from.format("%B %Y").to_string(),
            PeriodType::Quarter => {
                format!("Q{} {}", (self.from.month() - 1) / 3 + 1, self.from.year())
            }
            PeriodType::Year => self.from.format("%Y").to_string(),
            PeriodType::Custom if self.from.year() == self.to.year() => format!(
                "{} - {}",
                self.from.format("%b %-d"),
                self.to.format("%b %-d, %Y")
            ),
            PeriodType::Custom => format!(
                "{} - {}",
                self.from.format("%b %-d, %Y"),
                self.to.format("%b %-d, %Y")
            ),
        }
    }

    pub fn from_iso(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    pub fn to_iso(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }

    pub fn is_preset(&self, preset: &PeriodPreset) -> bool {
        self.preset == Some(*preset)
    }

    pub fn query_string(&self) -> String {
        format!("from={}&to={}", self.from_iso(), self.to_iso())
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let start = month_start(date);
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    next.map(|n| n - Duration::days(1)).unwrap_or(date)
}

fn quarter_start(date: NaiveDate) -> NaiveDate {
    let start_month = (date.month() - 1) / 3 * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), start_month, 1).unwrap_or(date)
}

fn quarter_end(date: NaiveDate) -> NaiveDate {
    let last_month_of_quarter = quarter_start(date) + Duration::days(62);
    month_end(last_month_of_quarter)
}

fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

fn year_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

fn shift(
    from: NaiveDate,
    to: NaiveDate,
    period: PeriodType,
    direction: i32,
) -> (NaiveDate, NaiveDate) {
    match period {
        PeriodType::Month => {
            let new_from = shift_months(from, direction);
            (new_from, month_end(new_from))
        }
        PeriodType::Quarter => {
            let new_from = shift_months(from, direction * 3);
            (new_from, quarter_end(new_from))
        }
        PeriodType::Year => {
            let new_from = shift_months(from, direction * 12);
            (new_from, year_end(new_from))
        }
        PeriodType::Custom => {
            let span = to - from + Duration::days(1);
            let delta = if direction > 0 { span } else { -span };
            // Past the calendar limits the range stays where it is.
            match (from.checked_add_signed(delta), to.checked_add_signed(delta)) {
                (Some(new_from), Some(new_to)) => (new_from, new_to),
                _ => (from, to),
            }
        }
    }
}

fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_presets() {
        let today = d(2025, 5, 14);
        let r = DateRange::from_preset_at(PeriodPreset::LastMonth, today);
        assert_eq!((r.from, r.to), (d(2025, 4, 1), d(2025, 4, 30)));
        let r = DateRange::from_preset_at(PeriodPreset::ThisQuarter, today);
        assert_eq!((r.from, r.to), (d(2025, 4, 1), d(2025, 6, 30)));
        let r = DateRange::from_preset_at(PeriodPreset::LastQuarter, today);
        assert_eq!((r.from, r.to), (d(2025, 1, 1), d(2025, 3, 31)));
        let r = DateRange::from_preset_at(PeriodPreset::LastYear, today);
        assert_eq!((r.from, r.to), (d(2024, 1, 1), d(2024, 12, 31)));
    }

    #[test]
    fn test_last_month_across_year_boundary() {
        let r = DateRange::from_preset_at(PeriodPreset::LastMonth, d(2025, 1, 31));
        assert_eq!((r.from, r.to), (d(2024, 12, 1), d(2024, 12, 31)));
    }

    #[test]
    fn test_navigation_keeps_period_shape() {
        let today = d(2025, 5, 14);
        let feb = DateRange::from_dates(d(2024, 2, 1), d(2024, 2, 29), today);
        let mar = feb.next(today);
        assert_eq!((mar.from, mar.to), (d(2024, 3, 1), d(2024, 3, 31)));
        let q4 = DateRange::from_dates(d(2024, 10, 1), d(2024, 12, 31), today).next(today);
        assert_eq!((q4.from, q4.to), (d(2025, 1, 1), d(2025, 3, 31)));
        assert_eq!(q4.preset, Some(PeriodPreset::LastQuarter));
    }

    #[test]
    fn test_custom_range_shifts_by_span() {
        let today = d(2025, 5, 14);
        let r = DateRange::from_dates(d(2025, 1, 10), d(2025, 1, 19), today).prev(today);
        assert_eq!((r.from, r.to), (d(2024, 12, 31), d(2025, 1, 9)));
    }

    #[test]
    fn test_custom_range_at_calendar_limit_stays_put() {
        let today = d(2025, 5, 14);
        let from = NaiveDate::MAX - Duration::days(11);
        let to = NaiveDate::MAX - Duration::days(1);
        let r = DateRange::from_dates(from, to, today).next(today);
        assert_eq!((r.from, r.to), (from, to));

        let from = NaiveDate::MIN + Duration::days(1);
        let to = NaiveDate::MIN + Duration::days(11);
        let r = DateRange::from_dates(from, to, today).prev(today);
        assert_eq!((r.from, r.to), (from, to));
    }

    #[test]
    fn test_is_preset() {
        let today = d(2025, 5, 14);
        let r = DateRange::from_preset_at(PeriodPreset::ThisMonth, today);
        assert!(r.is_preset(&PeriodPreset::ThisMonth));
        assert!(!r.is_preset(&PeriodPreset::LastMonth));
    }

    #[test]
    fn test_labels() {
        let today = d(2025, 5, 14);
        assert_eq!(
            DateRange::from_dates(d(2025, 3, 1), d(2025, 3, 31), today).display_label(),
            "March 2025"
        );
        assert_eq!(
            DateRange::from_dates(d(2025, 1, 1), d(2025, 3, 31), today).display_label(),
            "Q1 2025"
        );
        assert_eq!(
            DateRange::from_dates(d(2025, 2, 20), d(2025, 1, 5), today).display_label(),
            "Jan 5 - Feb 20, 2025"
        );
    }
}

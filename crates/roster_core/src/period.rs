use std::fmt;

/// Target year/month of the roster to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetPeriod {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("year {0} is out of range (1-9999)")]
    YearOutOfRange(i32),
    #[error("month {0} is out of range (1-12)")]
    MonthOutOfRange(u32),
}

impl TargetPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=9999).contains(&year) {
            return Err(PeriodError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn with_year(self, year: i32) -> Result<Self, PeriodError> {
        Self::new(year, self.month)
    }

    pub fn with_month(self, month: u32) -> Result<Self, PeriodError> {
        Self::new(self.year, month)
    }
}

impl fmt::Display for TargetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// One selectable entry of the period picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodOption {
    pub period: TargetPeriod,
    /// `YYYY-MM`
    pub value: String,
    /// `YYYY年M月`
    pub label: String,
}

/// Periods offered for selection: previous year through the year after next.
pub fn period_options(current_year: i32) -> Vec<PeriodOption> {
    (current_year - 1..=current_year + 2)
        .flat_map(|year| (1..=12).map(move |month| (year, month)))
        .filter_map(|(year, month)| TargetPeriod::new(year, month).ok())
        .map(|period| PeriodOption {
            value: period.to_string(),
            label: format!("{}年{}月", period.year(), period.month()),
            period,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(TargetPeriod::new(2025, 0), Err(PeriodError::MonthOutOfRange(0)));
        assert_eq!(TargetPeriod::new(2025, 13), Err(PeriodError::MonthOutOfRange(13)));
        assert_eq!(TargetPeriod::new(0, 5), Err(PeriodError::YearOutOfRange(0)));
        let period = TargetPeriod::new(2025, 3).unwrap();
        assert_eq!(period.to_string(), "2025-03");
        assert_eq!(period.with_month(12).unwrap().month(), 12);
    }

    #[test]
    fn options_span_four_years() {
        let options = period_options(2025);
        assert_eq!(options.len(), 48);
        assert_eq!(options[0].value, "2024-01");
        assert_eq!(options[0].label, "2024年1月");
        assert_eq!(options[47].value, "2027-12");
    }
}

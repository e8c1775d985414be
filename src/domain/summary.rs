//! Per-country aggregate rows for the summary table

use crate::domain::filter::{CaseType, DateRange};
use crate::domain::panel::{EmptyReason, PanelState};
use crate::domain::types::CountryName;
use serde::{Deserialize, Serialize};

/// Parameters of a single summary request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryQuery {
    pub country: CountryName,
    pub range: DateRange,
    pub case_type: CaseType,
}

impl SummaryQuery {
    pub fn new(country: CountryName, range: DateRange, case_type: CaseType) -> Self {
        Self {
            country,
            range,
            case_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub country: CountryName,
    pub case_type: CaseType,
    pub range: DateRange,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Rows with a non-finite value are dropped along with failed ones
    pub fn assemble(rows: impl IntoIterator<Item = SummaryRow>) -> PanelState<Self> {
        let rows: Vec<SummaryRow> = rows.into_iter().filter(|row| row.value.is_finite()).collect();
        if rows.is_empty() {
            PanelState::Empty(EmptyReason::NoSummaryRows)
        } else {
            PanelState::Populated(Self { rows })
        }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.value).sum()
    }

    pub fn row_for(&self, country: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.country.matches(country))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(country: &str, value: f64) -> SummaryRow {
        let from = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        SummaryRow {
            country: CountryName::parse(country).unwrap(),
            case_type: CaseType::Confirmed,
            range: DateRange::new(from, to).unwrap(),
            value,
        }
    }

    #[test]
    fn test_no_rows_is_empty_state() {
        assert_eq!(
            SummaryTable::assemble(Vec::new()),
            PanelState::Empty(EmptyReason::NoSummaryRows)
        );
    }

    #[test]
    fn test_non_finite_rows_are_dropped() {
        let state = SummaryTable::assemble(vec![row("Germany", 10.0), row("France", f64::NAN)]);
        let table = state.populated().unwrap();
        assert_eq!(table.rows().len(), 1);
        assert!(table.row_for("germany").is_some());
        assert!(table.row_for("France").is_none());
        assert_eq!(table.total(), 10.0);
    }
}

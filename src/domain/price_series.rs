//! Aligned two-asset daily price table.

use chrono::NaiveDate;

use super::error::PairfolioError;

/// A single close from the data provider, before alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// One aligned row: both instruments closed on this trading date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub close_a: f64,
    pub close_b: f64,
}

/// Immutable, gap-free price table with strictly increasing dates.
///
/// Construction validates ordering; lookups by date use binary search on
/// the sorted rows.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    rows: Vec<PriceRow>,
}

impl PriceSeries {
    /// Build from pre-aligned rows. Rejects out-of-order or duplicate dates.
    pub fn new(rows: Vec<PriceRow>) -> Result<Self, PairfolioError> {
        for pair in rows.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(PairfolioError::invalid_input(format!(
                    "price series dates must be strictly increasing: {} then {}",
                    pair[0].date, pair[1].date
                )));
            }
        }
        Ok(Self { rows })
    }

    /// Inner-join two provider series on date. Dates present on only one
    /// side are dropped, matching the source table's row filtering.
    pub fn inner_join(a: &[DailyClose], b: &[DailyClose]) -> Result<Self, PairfolioError> {
        let mut rows = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].date.cmp(&b[j].date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    rows.push(PriceRow {
                        date: a[i].date,
                        close_a: a[i].close,
                        close_b: b[j].close,
                    });
                    i += 1;
                    j += 1;
                }
            }
        }
        Self::new(rows)
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn row(&self, date: NaiveDate) -> Option<&PriceRow> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// First trading date strictly after `date`, if any.
    pub fn next_trading_date_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        let idx = self.rows.partition_point(|r| r.date <= date);
        self.rows.get(idx).map(|r| r.date)
    }

    /// Restrict to `[start, end]` (inclusive on both ends when given).
    pub fn clamp_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|r| start.is_none_or(|s| r.date >= s) && end.is_none_or(|e| r.date <= e))
            .copied()
            .collect();
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(date: &str, a: f64, b: f64) -> PriceRow {
        PriceRow {
            date: d(date),
            close_a: a,
            close_b: b,
        }
    }

    #[test]
    fn new_accepts_ordered_rows() {
        let series = PriceSeries::new(vec![
            row("2024-01-02", 10.0, 20.0),
            row("2024-01-03", 11.0, 19.0),
        ])
        .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(d("2024-01-02")));
        assert_eq!(series.last_date(), Some(d("2024-01-03")));
    }

    #[test]
    fn new_rejects_duplicate_dates() {
        let result = PriceSeries::new(vec![
            row("2024-01-02", 10.0, 20.0),
            row("2024-01-02", 11.0, 19.0),
        ]);
        assert!(matches!(result, Err(PairfolioError::InvalidInput { .. })));
    }

    #[test]
    fn new_rejects_out_of_order_dates() {
        let result = PriceSeries::new(vec![
            row("2024-01-03", 10.0, 20.0),
            row("2024-01-02", 11.0, 19.0),
        ]);
        assert!(matches!(result, Err(PairfolioError::InvalidInput { .. })));
    }

    #[test]
    fn inner_join_drops_unmatched_dates() {
        let a = vec![
            DailyClose { date: d("2024-01-02"), close: 10.0 },
            DailyClose { date: d("2024-01-03"), close: 11.0 },
            DailyClose { date: d("2024-01-04"), close: 12.0 },
        ];
        let b = vec![
            DailyClose { date: d("2024-01-02"), close: 20.0 },
            DailyClose { date: d("2024-01-04"), close: 18.0 },
        ];

        let series = PriceSeries::inner_join(&a, &b).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.rows()[0], row("2024-01-02", 10.0, 20.0));
        assert_eq!(series.rows()[1], row("2024-01-04", 12.0, 18.0));
    }

    #[test]
    fn inner_join_empty_when_no_overlap() {
        let a = vec![DailyClose { date: d("2024-01-02"), close: 10.0 }];
        let b = vec![DailyClose { date: d("2024-01-03"), close: 20.0 }];
        let series = PriceSeries::inner_join(&a, &b).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn row_lookup() {
        let series = PriceSeries::new(vec![
            row("2024-01-02", 10.0, 20.0),
            row("2024-01-05", 11.0, 19.0),
        ])
        .unwrap();

        assert!(series.row(d("2024-01-05")).is_some());
        assert!(series.row(d("2024-01-04")).is_none());
    }

    #[test]
    fn next_trading_date_after_skips_to_next_row() {
        let series = PriceSeries::new(vec![
            row("2024-01-02", 10.0, 20.0),
            row("2024-01-05", 11.0, 19.0),
            row("2024-01-08", 12.0, 18.0),
        ])
        .unwrap();

        assert_eq!(series.next_trading_date_after(d("2024-01-02")), Some(d("2024-01-05")));
        assert_eq!(series.next_trading_date_after(d("2024-01-03")), Some(d("2024-01-05")));
        assert_eq!(series.next_trading_date_after(d("2024-01-08")), None);
        assert_eq!(series.next_trading_date_after(d("2024-01-01")), Some(d("2024-01-02")));
    }

    #[test]
    fn clamp_range_filters_both_ends() {
        let series = PriceSeries::new(vec![
            row("2024-01-02", 10.0, 20.0),
            row("2024-01-03", 11.0, 19.0),
            row("2024-01-04", 12.0, 18.0),
            row("2024-01-05", 13.0, 17.0),
        ])
        .unwrap();

        let clamped = series.clamp_range(Some(d("2024-01-03")), Some(d("2024-01-04")));
        assert_eq!(clamped.len(), 2);
        assert_eq!(clamped.first_date(), Some(d("2024-01-03")));

        let open_ended = series.clamp_range(None, None);
        assert_eq!(open_ended.len(), 4);
    }
}

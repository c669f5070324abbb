//! Data access port trait.

use chrono::NaiveDate;

use crate::domain::error::PairfolioError;
use crate::domain::price_series::DailyClose;

pub trait DataPort {
    /// Daily closes for one symbol, date-ordered, restricted to
    /// `[start_date, end_date]` when given.
    fn fetch_daily_closes(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<DailyClose>, PairfolioError>;

    /// `(first_date, last_date, row_count)` for a symbol, `None` when the
    /// symbol has no data.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PairfolioError>;
}

//! CSV file data adapter.
//!
//! One `<SYMBOL>.csv` per instrument in a base directory, columns
//! `date,close` with dates formatted `YYYY-MM-DD`. Rows are sorted on load;
//! the provider file need not be ordered.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::domain::error::PairfolioError;
use crate::domain::price_series::DailyClose;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<DailyClose>, PairfolioError> {
        let path = self.csv_path(symbol);
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| PairfolioError::Data {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let mut closes = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| PairfolioError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| PairfolioError::Data {
                reason: format!("missing date column in {}", path.display()),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                PairfolioError::Data {
                    reason: format!("invalid date {date_str:?} in {}: {}", path.display(), e),
                }
            })?;

            let close: f64 = record
                .get(1)
                .ok_or_else(|| PairfolioError::Data {
                    reason: format!("missing close column in {}", path.display()),
                })?
                .parse()
                .map_err(|e| PairfolioError::Data {
                    reason: format!("invalid close value on {date}: {e}"),
                })?;

            closes.push(DailyClose { date, close });
        }

        closes.sort_by_key(|c| c.date);
        Ok(closes)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_daily_closes(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<DailyClose>, PairfolioError> {
        let closes = self
            .read_all(symbol)?
            .into_iter()
            .filter(|c| {
                start_date.is_none_or(|s| c.date >= s) && end_date.is_none_or(|e| c.date <= e)
            })
            .collect();
        Ok(closes)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PairfolioError> {
        let closes = self.read_all(symbol)?;
        match (closes.first(), closes.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, closes.len()))),
            _ => Ok(None),
        }
    }
}

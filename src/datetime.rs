use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// 日付の外部表現フォーマット。
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// 開始時刻の外部表現フォーマット。
pub const START_TIME_FORMAT: &str = "%H:%M:%S";

#[cfg(not(test))]
/// 現在のローカル時間を取得する。
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// 指定日を含む月の初日と末日を返す。
pub fn month_bounds(date: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let start = date.with_day(1).context("Failed to set day")?;
    let next_month = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    }
    .context("Failed to set month")?;
    let end = next_month.pred_opt().context("Failed to set day")?;

    Ok((start, end))
}


#[cfg(test)]
pub use mock_datetime::now;

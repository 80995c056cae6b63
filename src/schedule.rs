use chrono::NaiveDate;

use crate::tempo::{ScheduleEntity, WorklogEntity};

/// 1日分のログ済み時間と必要時間の照合結果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleDetails {
    pub logged_seconds: i64,
    pub required_seconds: i64,
}

/// 対象日のスケジュール照合結果を組み立てる。
///
/// worklogとスケジュールは対象日を含む期間分を受け取り、対象日かつ対象ユーザーの
/// 分だけを合算する。
pub fn create_schedule_details(
    worklogs: &[WorklogEntity],
    schedule: &[ScheduleEntity],
    date: NaiveDate,
    account_id: &str,
) -> ScheduleDetails {
    let logged_seconds = worklogs
        .iter()
        .filter(|worklog| worklog.author.account_id == account_id && worklog.start_date == date)
        .map(|worklog| worklog.time_spent_seconds)
        .sum();
    let required_seconds = schedule
        .iter()
        .filter(|entry| entry.date == date)
        .map(|entry| entry.required_seconds)
        .sum();

    ScheduleDetails {
        logged_seconds,
        required_seconds,
    }
}

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::datetime;
use crate::report::{self, EmptyRangeError};
use crate::tempo::TempoRepository;
use crate::worklog::UserTotals;

/// 期間レポートを出力するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct ReportArgs {
    #[clap(
        short = 's',
        long = "start",
        help = "Start date in the yyyy-MM-dd format, defaulted to the first recorded worklog",
        parse(try_from_str = parse_date),
    )]
    pub start: Option<NaiveDate>,

    #[clap(
        short = 'e',
        long = "end",
        help = "End date in the yyyy-MM-dd format, defaulted to today",
        parse(try_from_str = parse_date),
    )]
    pub end: Option<NaiveDate>,

    #[clap(
        short = 'p',
        long = "project",
        help = "Project key the breakdown is limited to, eg KEY covers KEY-1 but not KEYX-1"
    )]
    pub project: Option<String>,

    #[clap(
        short = 'v',
        long = "verbose",
        help = "Show the logged time per issue under each project"
    )]
    pub verbose: bool,
}

pub struct ReportCommand<'a, T: TempoRepository> {
    tempo: &'a T,
}

impl<'a, T: TempoRepository> ReportCommand<'a, T> {
    /// 新しい`ReportCommand`を返す。
    ///
    /// # Arguments
    /// * `tempo` - Tempo APIと通信するためのリポジトリ
    pub fn new(tempo: &'a T) -> Self {
        Self { tempo }
    }

    /// `report`サブコマンドの処理を行う。
    ///
    /// 期間内のworklogを取得して集計し、スケジュール上の必要時間と突き合わせる。
    /// スケジュールは最初のworklogの日から終了日までの期間を、worklogの取得後に取得する。
    /// 終了日の既定値はここで一度だけ解決し、結果の`date_to`として返す。
    ///
    /// # Arguments
    ///
    /// * `report` - `report`サブコマンドの引数
    pub async fn run(&self, report: ReportArgs) -> Result<UserTotals> {
        let date_from = match report.start {
            Some(start) => start,
            None => NaiveDate::from_ymd_opt(1970, 1, 1)
                .context("Failed to build the default start date")?,
        };
        let date_to = report.end.unwrap_or_else(|| datetime::now().date());

        let worklogs = self
            .tempo
            .search_worklogs(date_from, date_to)
            .await
            .context("Failed to retrieve worklogs")?;
        info!(
            "number of worklogs in {} ~ {}: {}",
            date_from,
            date_to,
            worklogs.len()
        );
        let first_worklog_date = report::first_worklog_date(&worklogs).ok_or(EmptyRangeError {
            from: date_from,
            to: date_to,
        })?;

        let schedule_entries = self
            .tempo
            .user_schedule(first_worklog_date, date_to)
            .await
            .context("Failed to retrieve the user schedule")?;
        let required = schedule_entries
            .iter()
            .map(|entry| entry.required_seconds)
            .sum();

        Ok(report::user_totals(
            &worklogs,
            report.project.as_deref(),
            first_worklog_date,
            date_to,
            required,
        ))
    }
}

/// 日付をパースする。
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, datetime::DATE_FORMAT)
        .with_context(|| format!("Failed to parse date: {}", s))
}

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use log::{info, warn};

use crate::config::Config;
use crate::datetime::{self, START_TIME_FORMAT};
use crate::tempo::{NewWorklog, TempoRepository};
use crate::time_parser::{self, ParseResult};
use crate::when;
use crate::worklog::Worklog;

/// worklogを1件記録するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct LogArgs {
    #[clap(help = "Issue key or configured alias, eg PRJ-1")]
    issue: String,

    #[clap(help = "Time to log as a duration (1h30m) or an interval (11:00-12:30)")]
    duration: String,

    #[clap(help = "Date to log on: y, yesterday, t+-N or yyyy-MM-dd, defaulted to today")]
    when: Option<String>,

    #[clap(short = 'd', long = "description", help = "Description of the worklog")]
    description: Option<String>,

    #[clap(
        short = 's',
        long = "start",
        help = "Start time in the HH:mm format, ignored when an interval is used"
    )]
    start: Option<String>,

    #[clap(
        short = 'r',
        long = "remaining-estimate",
        help = "Remaining estimate for the issue, eg 1h"
    )]
    remaining_estimate: Option<String>,
}

pub struct LogCommand<'a, T: TempoRepository> {
    tempo: &'a T,
    config: &'a Config,
    account_id: &'a str,
}

impl<'a, T: TempoRepository> LogCommand<'a, T> {
    /// 新しい`LogCommand`を返す。
    ///
    /// # Arguments
    /// * `tempo` - Tempo APIと通信するためのリポジトリ
    /// * `config` - エイリアスの解決に利用する設定
    /// * `account_id` - worklogの記録先のアカウントID
    pub fn new(tempo: &'a T, config: &'a Config, account_id: &'a str) -> Self {
        Self {
            tempo,
            config,
            account_id,
        }
    }

    /// `log`サブコマンドの処理を行う。
    ///
    /// whenトークンで決めた日付に対して時間表現をパースし、worklogを作成する。
    /// 日付が指定されていない場合は今日の日付と現在時刻を基準にする。
    ///
    /// # Arguments
    ///
    /// * `log` - `log`サブコマンドの引数
    pub async fn run(&self, log: LogArgs) -> Result<Worklog> {
        let reference_date = when::resolve(datetime::now(), log.when.as_deref())?;
        let parse_result = time_parser::parse(&log.duration).with_context(|| {
            format!(
                "Cannot parse \"{}\" to logged time. Try something like 1h30m or 11:00-12:30. See tempor log --help for more examples.",
                log.duration
            )
        })?;
        if parse_result.seconds <= 0 {
            bail!("Logged time must be larger than 0.");
        }

        let issue_key = self.config.resolve_issue_key(&log.issue);
        let start_time = start_time(&parse_result, log.start.as_deref(), reference_date)?;
        let new_worklog = NewWorklog {
            issue_key,
            time_spent_seconds: parse_result.seconds,
            start_date: reference_date.date(),
            start_time,
            author_account_id: self.account_id.to_string(),
            description: log.description,
            remaining_estimate_seconds: remaining_estimate_seconds(
                log.remaining_estimate.as_deref(),
            )?,
        };
        let entity = self
            .tempo
            .create_worklog(&new_worklog)
            .await
            .context("Failed to create the worklog")?;
        info!("Worklog created successfully.");

        Ok(Worklog::from_entity(&entity))
    }
}

/// worklogの開始時刻を決める。
///
/// インターバル形式の開始時刻が最優先で、次に`--start`フラグ、どちらもなければ
/// 基準日時の時刻を使う。
fn start_time(
    parse_result: &ParseResult,
    input_start: Option<&str>,
    reference_date: NaiveDateTime,
) -> Result<String> {
    if let Some(start) = parse_result.start_time {
        if input_start.is_some() {
            warn!(
                "Start time param is ignored, {} is used instead.",
                start.format(START_TIME_FORMAT)
            );
        }
        return Ok(start.format(START_TIME_FORMAT).to_string());
    }
    if let Some(input_start) = input_start {
        let parsed = time_parser::parse_time(input_start).with_context(|| {
            format!(
                "Cannot parse \"{}\" to a valid start time. Try to use the HH:mm format. See tempor log --help for more examples.",
                input_start
            )
        })?;
        return Ok(parsed.format(START_TIME_FORMAT).to_string());
    }

    Ok(reference_date.time().format(START_TIME_FORMAT).to_string())
}

/// `--remaining-estimate`フラグをパースして秒数に変換する。
fn remaining_estimate_seconds(remaining_estimate: Option<&str>) -> Result<Option<i64>> {
    remaining_estimate
        .map(|expression| {
            time_parser::parse(expression)
                .map(|parse_result| parse_result.seconds)
                .with_context(|| {
                    format!(
                        "Cannot parse \"{}\" to a remaining estimate. Try something like 1h. See tempor log --help for more examples.",
                        expression
                    )
                })
        })
        .transpose()
}

use anyhow::{Context, Result};
use log::info;

use crate::datetime;
use crate::schedule;
use crate::tempo::TempoRepository;
use crate::when;
use crate::worklog::{UserWorklogs, Worklog};

/// 1日分のworklogを表示するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct ListArgs {
    #[clap(help = "Date to list: y, yesterday, t+-N or yyyy-MM-dd, defaulted to today")]
    when: Option<String>,
}

pub struct ListCommand<'a, T: TempoRepository> {
    tempo: &'a T,
    account_id: &'a str,
}

impl<'a, T: TempoRepository> ListCommand<'a, T> {
    /// 新しい`ListCommand`を返す。
    ///
    /// # Arguments
    /// * `tempo` - Tempo APIと通信するためのリポジトリ
    /// * `account_id` - 表示対象のアカウントID
    pub fn new(tempo: &'a T, account_id: &'a str) -> Self {
        Self { tempo, account_id }
    }

    /// `list`サブコマンドの処理を行う。
    ///
    /// 対象日を含む月のworklogとスケジュールを並行して取得し、対象日の分だけを
    /// 表示用に変換する。スケジュール照合も同じ月単位のレスポンスから行う。
    ///
    /// # Arguments
    ///
    /// * `list` - `list`サブコマンドの引数
    pub async fn run(&self, list: ListArgs) -> Result<UserWorklogs> {
        let date = when::resolve(datetime::now(), list.when.as_deref())?.date();
        let (month_start, month_end) = datetime::month_bounds(date)?;
        let (worklogs, schedule_entries) = tokio::try_join!(
            self.tempo.search_worklogs(month_start, month_end),
            self.tempo.user_schedule(month_start, month_end),
        )
        .context("Failed to retrieve worklogs and schedule")?;
        info!(
            "number of worklogs in {} ~ {}: {}",
            month_start,
            month_end,
            worklogs.len()
        );

        let day_worklogs: Vec<Worklog> = worklogs
            .iter()
            .filter(|worklog| {
                worklog.author.account_id == self.account_id && worklog.start_date == date
            })
            .map(Worklog::from_entity)
            .collect();
        let schedule_details =
            schedule::create_schedule_details(&worklogs, &schedule_entries, date, self.account_id);

        Ok(UserWorklogs {
            worklogs: day_worklogs,
            date,
            schedule_details,
        })
    }
}

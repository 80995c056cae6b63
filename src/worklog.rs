use chrono::NaiveDate;

use crate::schedule::ScheduleDetails;
use crate::tempo::{IssueEntity, WorklogEntity};
use crate::time_parser::{self, Interval};

/// 1件のworklogの表示用の形。
#[derive(Clone, Debug)]
pub struct Worklog {
    pub id: i64,
    pub interval: Option<Interval>,
    pub issue_key: String,
    pub duration: String,
    pub description: String,
    pub link: String,
}

/// 集計結果の1行。キーはissueキーまたはプロジェクトキー。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportLine {
    pub key: String,
    pub time: i64,
}

/// レポート期間全体の集計結果。期間は最初のworklogの日から`date_to`まで。
#[derive(Clone, Debug)]
pub struct UserTotals {
    pub total: i64,
    pub required: i64,
    pub first_worklog_date: NaiveDate,
    pub date_to: NaiveDate,
    pub times_per_issue: Vec<ReportLine>,
    pub times_per_project: Vec<ReportLine>,
}

/// 1日分のworklogとスケジュールの照合結果。
#[derive(Clone, Debug)]
pub struct UserWorklogs {
    pub worklogs: Vec<Worklog>,
    pub date: NaiveDate,
    pub schedule_details: ScheduleDetails,
}

impl Worklog {
    /// APIのエンティティから表示用のworklogを作る。
    ///
    /// インターバルは開始時刻から再構成できた場合のみ設定し、経過時間の形式に
    /// 戻せない秒数は`unknown`と表示する。
    pub fn from_entity(entity: &WorklogEntity) -> Self {
        Self {
            id: entity.tempo_worklog_id,
            interval: time_parser::to_interval(
                entity.time_spent_seconds,
                Some(entity.start_time.as_str()),
            ),
            issue_key: entity.issue.key.clone(),
            duration: time_parser::to_duration(entity.time_spent_seconds)
                .unwrap_or_else(|| "unknown".to_string()),
            description: entity.description.clone(),
            link: browse_link(&entity.issue),
        }
    }
}

/// issueのブラウズ用リンクを組み立てる。
///
/// API URLのホスト名が取れない場合はAPI URLをそのまま使う。
fn browse_link(issue: &IssueEntity) -> String {
    reqwest::Url::parse(&issue.self_url)
        .ok()
        .and_then(|url| {
            url.host_str()
                .map(|host| format!("https://{}/browse/{}", host, issue.key))
        })
        .unwrap_or_else(|| issue.self_url.clone())
}

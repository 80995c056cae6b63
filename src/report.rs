use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::tempo::WorklogEntity;
use crate::worklog::{ReportLine, UserTotals};

/// 指定範囲にworklogが1件もなかった場合のエラー。
#[derive(Debug, Error, PartialEq, Eq)]
#[error("No worklogs found between {from} and {to}.")]
pub struct EmptyRangeError {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// issueキーからプロジェクトキーを取り出す。
///
/// 最初の`-`より前をプロジェクトキーとし、`-`がない場合はキー全体を返す。
pub fn project_key(issue_key: &str) -> &str {
    match issue_key.find('-') {
        Some(index) => &issue_key[..index],
        None => issue_key,
    }
}

/// 時系列で最初のworklogの開始日を返す。
pub fn first_worklog_date(worklogs: &[WorklogEntity]) -> Option<NaiveDate> {
    worklogs.iter().map(|worklog| worklog.start_date).min()
}

/// 取得済みのworklog一式からユーザーの合計を組み立てる。
///
/// 内訳はプロジェクトスコープで絞った集合から計算する。`total`はスコープに
/// 関係なく取得した全件を合計した値で、内訳の総和より大きくなることがある。
pub fn user_totals(
    fetched: &[WorklogEntity],
    project: Option<&str>,
    first_worklog_date: NaiveDate,
    date_to: NaiveDate,
    required: i64,
) -> UserTotals {
    let relevant: Vec<WorklogEntity> = match project {
        Some(project) => {
            let prefix = format!("{}-", project);
            fetched
                .iter()
                .filter(|worklog| worklog.issue.key.starts_with(&prefix))
                .cloned()
                .collect()
        }
        None => fetched.to_vec(),
    };
    let per_project = times_per_project(&relevant);
    let per_issue = times_per_issue(&relevant, &per_project);
    let total = fetched
        .iter()
        .map(|worklog| worklog.time_spent_seconds)
        .sum();

    UserTotals {
        total,
        required,
        first_worklog_date,
        date_to,
        times_per_issue: per_issue,
        times_per_project: per_project,
    }
}

/// プロジェクトごとの合計を集計する。
///
/// 合計時間の降順で並べ、同率はプロジェクトキーの昇順で並べる。
pub fn times_per_project(worklogs: &[WorklogEntity]) -> Vec<ReportLine> {
    let mut lines = group_times_by(worklogs, |worklog| {
        project_key(&worklog.issue.key).to_string()
    });
    lines.sort_by(|a, b| b.time.cmp(&a.time).then_with(|| a.key.cmp(&b.key)));

    lines
}

/// issueごとの合計を集計する。
///
/// プロジェクト一覧での順位を第一キー、時間の降順を第二キーとして、
/// 同じプロジェクトのissueが固まって並ぶようにする。
pub fn times_per_issue(
    worklogs: &[WorklogEntity],
    times_per_project: &[ReportLine],
) -> Vec<ReportLine> {
    let ranks: HashMap<&str, usize> = times_per_project
        .iter()
        .enumerate()
        .map(|(rank, line)| (line.key.as_str(), rank))
        .collect();
    let mut lines = group_times_by(worklogs, |worklog| worklog.issue.key.clone());
    lines.sort_by(|a, b| {
        let rank_a = ranks.get(project_key(&a.key)).copied().unwrap_or(usize::MAX);
        let rank_b = ranks.get(project_key(&b.key)).copied().unwrap_or(usize::MAX);
        rank_a.cmp(&rank_b).then_with(|| b.time.cmp(&a.time))
    });

    lines
}

/// worklogをキーごとに合計する汎用の畳み込み。
///
/// 並び順は後段のソートで決めるため、ここでは初出順を保つ。
fn group_times_by<F>(worklogs: &[WorklogEntity], key_fn: F) -> Vec<ReportLine>
where
    F: Fn(&WorklogEntity) -> String,
{
    let mut lines: Vec<ReportLine> = Vec::new();
    let mut indexes: HashMap<String, usize> = HashMap::new();
    for worklog in worklogs {
        let key = key_fn(worklog);
        match indexes.get(&key) {
            Some(&index) => lines[index].time += worklog.time_spent_seconds,
            None => {
                indexes.insert(key.clone(), lines.len());
                lines.push(ReportLine {
                    key,
                    time: worklog.time_spent_seconds,
                });
            }
        }
    }

    lines
}

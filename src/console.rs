use std::io::Write;

use anyhow::{Context, Result};

use crate::datetime::DATE_FORMAT;
use crate::report;
use crate::worklog::{ReportLine, UserTotals, UserWorklogs, Worklog};

/// Consoleに結果を表示するためのtrait。
pub trait ConsolePresenter {
    /// 1件のworklogを表示する。作成と削除の結果確認用。
    fn show_worklog(&mut self, worklog: &Worklog) -> Result<()>;

    /// 1日分のworklogとスケジュールの照合結果を表示する。
    ///
    /// # Arguments
    ///
    /// * `user_worklogs` - 表示する1日分のworklog
    fn show_user_worklogs(&mut self, user_worklogs: &UserWorklogs) -> Result<()>;

    /// 期間レポートを表示する。
    ///
    /// `verbose`が真の場合はプロジェクトの下にissueごとの行も表示する。
    fn show_report(&mut self, totals: &UserTotals, verbose: bool) -> Result<()>;
}

/// 結果をMarkdownのlist形式で表示する。
pub struct ConsoleMarkdownList<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdownList<'a, W> {
    /// 新しい`ConsoleMarkdownList`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }

    // worklogを1行のlist項目として表示する。
    fn write_worklog_line(&mut self, worklog: &Worklog) -> Result<()> {
        let interval_str = worklog
            .interval
            .map(|interval| {
                format!(
                    "{} ~ {}",
                    interval.start.format("%H:%M"),
                    interval.end.format("%H:%M")
                )
            })
            .unwrap_or_else(|| "--:-- ~ --:--".to_string());
        writeln!(
            self.writer,
            "- {}  {}  {}  {} (id {})",
            interval_str, worklog.issue_key, worklog.duration, worklog.description, worklog.id
        )
        .with_context(|| format!("Failed to write worklog: {:?}", worklog))?;

        Ok(())
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownList<'a, W> {
    fn show_worklog(&mut self, worklog: &Worklog) -> Result<()> {
        self.write_worklog_line(worklog)?;
        writeln!(self.writer, "  {}", worklog.link)
            .with_context(|| format!("Failed to write worklog: {:?}", worklog))?;

        Ok(())
    }

    fn show_user_worklogs(&mut self, user_worklogs: &UserWorklogs) -> Result<()> {
        writeln!(
            self.writer,
            "## Worklogs for {}",
            user_worklogs.date.format(DATE_FORMAT)
        )
        .context("Failed to write the header")?;
        for worklog in &user_worklogs.worklogs {
            self.write_worklog_line(worklog)?;
        }
        let details = &user_worklogs.schedule_details;
        writeln!(
            self.writer,
            "Logged {} of {} required.",
            to_hours(details.logged_seconds),
            to_hours(details.required_seconds)
        )
        .context("Failed to write the schedule summary")?;

        Ok(())
    }

    fn show_report(&mut self, totals: &UserTotals, verbose: bool) -> Result<()> {
        writeln!(
            self.writer,
            "## Report {} to {}",
            totals.first_worklog_date.format(DATE_FORMAT),
            totals.date_to.format(DATE_FORMAT)
        )
        .context("Failed to write the header")?;
        writeln!(
            self.writer,
            "Logged {} of {} required.",
            to_hours(totals.total),
            to_hours(totals.required)
        )
        .context("Failed to write the totals")?;
        for project_line in &totals.times_per_project {
            writeln!(
                self.writer,
                "- {}: {}",
                project_line.key,
                to_hours(project_line.time)
            )
            .with_context(|| format!("Failed to write report line: {:?}", project_line))?;
            if !verbose {
                continue;
            }
            for issue_line in issues_of_project(&totals.times_per_issue, &project_line.key) {
                writeln!(
                    self.writer,
                    "  - {}: {}",
                    issue_line.key,
                    to_hours(issue_line.time)
                )
                .with_context(|| format!("Failed to write report line: {:?}", issue_line))?;
            }
        }

        Ok(())
    }
}

/// 指定プロジェクトに属するissueの行を抜き出す。
fn issues_of_project<'a>(times_per_issue: &'a [ReportLine], project: &str) -> Vec<&'a ReportLine> {
    times_per_issue
        .iter()
        .filter(|line| report::project_key(&line.key) == project)
        .collect()
}

/// 秒数を時間単位の文字列へ変換する。
fn to_hours(seconds: i64) -> String {
    format!("{}h", seconds as f64 / 3600.0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use rstest::rstest;

    use super::ConsoleMarkdownList;
    use super::ConsolePresenter;
    use crate::schedule::ScheduleDetails;
    use crate::time_parser::Interval;
    use crate::worklog::{ReportLine, UserTotals, UserWorklogs, Worklog};

    fn date(text: &str) -> chrono::NaiveDate {
        chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    fn time(text: &str) -> NaiveTime {
        NaiveTime::parse_from_str(text, "%H:%M").unwrap()
    }

    /// テスト用にダミーのWorklogを作成する。
    fn dummy_worklog(pattern: u8) -> Worklog {
        match pattern {
            1 => Worklog {
                id: 123,
                interval: Some(Interval {
                    start: time("11:00"),
                    end: time("12:30"),
                }),
                issue_key: "PRJ-1".to_string(),
                duration: "1h30m".to_string(),
                description: "Writing docs".to_string(),
                link: "https://example.atlassian.net/browse/PRJ-1".to_string(),
            },
            2 => Worklog {
                id: 456,
                interval: None,
                issue_key: "PRJ-2".to_string(),
                duration: "unknown".to_string(),
                description: "Code review".to_string(),
                link: "https://example.atlassian.net/browse/PRJ-2".to_string(),
            },
            _ => panic!("Invalid pattern: {}", pattern),
        }
    }

    fn totals() -> UserTotals {
        UserTotals {
            total: 27000,
            required: 57600,
            first_worklog_date: date("2020-06-01"),
            date_to: date("2020-06-30"),
            times_per_issue: vec![
                ReportLine {
                    key: "KEY-1".to_string(),
                    time: 16200,
                },
                ReportLine {
                    key: "KEY-2".to_string(),
                    time: 5400,
                },
                ReportLine {
                    key: "OTH-3".to_string(),
                    time: 5400,
                },
            ],
            times_per_project: vec![
                ReportLine {
                    key: "KEY".to_string(),
                    time: 21600,
                },
                ReportLine {
                    key: "OTH".to_string(),
                    time: 5400,
                },
            ],
        }
    }

    /// worklogが間隔とリンク付きで表示されることを確認する。
    #[test]
    fn test_show_worklog() {
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        presenter.show_worklog(&dummy_worklog(1)).unwrap();

        assert_eq!(
            String::from_utf8(writer).unwrap(),
            "- 11:00 ~ 12:30  PRJ-1  1h30m  Writing docs (id 123)\n  https://example.atlassian.net/browse/PRJ-1\n"
        );
    }

    /// 1日分の表示を確認する。間隔が再構成できないworklogはプレースホルダになる。
    #[test]
    fn test_show_user_worklogs() {
        let user_worklogs = UserWorklogs {
            worklogs: vec![dummy_worklog(1), dummy_worklog(2)],
            date: date("2020-06-15"),
            schedule_details: ScheduleDetails {
                logged_seconds: 9000,
                required_seconds: 28800,
            },
        };
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        presenter.show_user_worklogs(&user_worklogs).unwrap();

        assert_eq!(
            String::from_utf8(writer).unwrap(),
            [
                "## Worklogs for 2020-06-15\n",
                "- 11:00 ~ 12:30  PRJ-1  1h30m  Writing docs (id 123)\n",
                "- --:-- ~ --:--  PRJ-2  unknown  Code review (id 456)\n",
                "Logged 2.5h of 8h required.\n",
            ]
            .join("")
        );
    }

    /// worklogがない日の表示を確認する。
    #[test]
    fn test_show_user_worklogs_without_worklogs() {
        let user_worklogs = UserWorklogs {
            worklogs: vec![],
            date: date("2020-06-15"),
            schedule_details: ScheduleDetails {
                logged_seconds: 0,
                required_seconds: 28800,
            },
        };
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        presenter.show_user_worklogs(&user_worklogs).unwrap();

        assert_eq!(
            String::from_utf8(writer).unwrap(),
            "## Worklogs for 2020-06-15\nLogged 0h of 8h required.\n"
        );
    }

    /// レポートの表示を確認する。verboseの場合のみissueごとの行が出る。
    #[rstest]
    #[case::compact(
        false,
        &[
            "## Report 2020-06-01 to 2020-06-30\n",
            "Logged 7.5h of 16h required.\n",
            "- KEY: 6h\n",
            "- OTH: 1.5h\n",
        ],
    )]
    #[case::verbose(
        true,
        &[
            "## Report 2020-06-01 to 2020-06-30\n",
            "Logged 7.5h of 16h required.\n",
            "- KEY: 6h\n",
            "  - KEY-1: 4.5h\n",
            "  - KEY-2: 1.5h\n",
            "- OTH: 1.5h\n",
            "  - OTH-3: 1.5h\n",
        ],
    )]
    fn test_show_report(#[case] verbose: bool, #[case] expected: &[&str]) {
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer);

        presenter.show_report(&totals(), verbose).unwrap();

        assert_eq!(String::from_utf8(writer).unwrap(), expected.join(""));
    }
}

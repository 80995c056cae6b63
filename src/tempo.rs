use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::info;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};

use crate::config::Credentials;
use crate::datetime::DATE_FORMAT;

/// Tempo APIのデフォルトのエンドポイント。
const DEFAULT_API_URL: &str = "https://api.tempo.io/core/3";
/// 1回の検索で取得する最大件数。
const SEARCH_LIMIT: u32 = 1000;

/// Tempo APIのworklogをデシリアライズするための構造体。
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogEntity {
    pub tempo_worklog_id: i64,
    pub issue: IssueEntity,
    pub time_spent_seconds: i64,
    pub start_date: NaiveDate,
    pub start_time: String,
    #[serde(default)]
    pub description: String,
    pub author: AuthorEntity,
}

/// worklogに紐づくissueの情報。
#[derive(Clone, Debug, Deserialize)]
pub struct IssueEntity {
    #[serde(rename = "self")]
    pub self_url: String,
    pub key: String,
}

/// worklogを記録したユーザーの情報。
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorEntity {
    pub account_id: String,
}

/// スケジュール上の1日分の情報。
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntity {
    pub date: NaiveDate,
    pub required_seconds: i64,
}

/// worklog作成リクエストの本文。
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorklog {
    pub issue_key: String,
    pub time_spent_seconds: i64,
    pub start_date: NaiveDate,
    pub start_time: String,
    pub author_account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_estimate_seconds: Option<i64>,
}

/// 検索系エンドポイントの共通のレスポンス形式。
#[derive(Debug, Deserialize)]
struct ResultsResponse<T> {
    results: Vec<T>,
}

/// Tempo APIとの通信を抽象化するリポジトリ。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TempoRepository {
    /// 期間内のユーザーのworklogを取得する。
    async fn search_worklogs(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<WorklogEntity>>;

    /// worklogを作成し、作成されたworklogを返す。
    async fn create_worklog(&self, new_worklog: &NewWorklog) -> Result<WorklogEntity>;

    /// worklogを1件取得する。
    async fn get_worklog(&self, worklog_id: i64) -> Result<WorklogEntity>;

    /// worklogを1件削除する。
    async fn delete_worklog(&self, worklog_id: i64) -> Result<()>;

    /// 期間内のユーザーのスケジュールを取得する。
    async fn user_schedule(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ScheduleEntity>>;
}

/// Tempo APIと通信するためのクライアント。
///
/// # Examples
///
/// ```
/// let client = TempoClient::new(&credentials);
/// let worklogs = client.search_worklogs(from, to).await.unwrap();
/// ```
pub struct TempoClient {
    client: Client,
    api_url: String,
    api_token: String,
    account_id: String,
}

impl TempoClient {
    /// 新しい`TempoClient`を返す。
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_api_url(credentials, DEFAULT_API_URL)
    }

    /// エンドポイントを指定して`TempoClient`を返す。テストで利用する。
    ///
    /// # Arguments
    ///
    /// * `credentials` - APIトークンとアカウントID
    /// * `api_url` - Tempo APIのベースURL
    pub fn with_api_url(credentials: &Credentials, api_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token: credentials.api_token.clone(),
            account_id: credentials.account_id.clone(),
        }
    }
}

#[async_trait]
impl TempoRepository for TempoClient {
    async fn search_worklogs(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<WorklogEntity>> {
        let response = self
            .client
            .get(format!("{}/worklogs/user/{}", self.api_url, self.account_id))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .query(&[
                ("from", from.format(DATE_FORMAT).to_string()),
                ("to", to.format(DATE_FORMAT).to_string()),
                ("limit", SEARCH_LIMIT.to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to Tempo API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<ResultsResponse<WorklogEntity>>()
            .await
            .context("Failed to deserialize response")?;
        info!("number of worklogs: {}", response.results.len());

        Ok(response.results)
    }

    async fn create_worklog(&self, new_worklog: &NewWorklog) -> Result<WorklogEntity> {
        let worklog = self
            .client
            .post(format!("{}/worklogs", self.api_url))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .json(new_worklog)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Tempo API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<WorklogEntity>()
            .await
            .context("Failed to deserialize response")?;

        Ok(worklog)
    }

    async fn get_worklog(&self, worklog_id: i64) -> Result<WorklogEntity> {
        let worklog = self
            .client
            .get(format!("{}/worklogs/{}", self.api_url, worklog_id))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to Tempo API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<WorklogEntity>()
            .await
            .context("Failed to deserialize response")?;

        Ok(worklog)
    }

    async fn delete_worklog(&self, worklog_id: i64) -> Result<()> {
        self.client
            .delete(format!("{}/worklogs/{}", self.api_url, worklog_id))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to Tempo API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?;

        Ok(())
    }

    async fn user_schedule(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ScheduleEntity>> {
        let response = self
            .client
            .get(format!("{}/user-schedule", self.api_url))
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .query(&[
                ("from", from.format(DATE_FORMAT).to_string()),
                ("to", to.format(DATE_FORMAT).to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to Tempo API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<ResultsResponse<ScheduleEntity>>()
            .await
            .context("Failed to deserialize response")?;

        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            api_token: "test-token".to_string(),
            account_id: "account-1".to_string(),
        }
    }

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    /// worklogの検索リクエストを組み立ててレスポンスを変換できることを確認する。
    #[tokio::test]
    async fn test_search_worklogs() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/worklogs/user/account-1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".into(), "2020-06-01".into()),
                Matcher::UrlEncoded("to".into(), "2020-06-30".into()),
                Matcher::UrlEncoded("limit".into(), "1000".into()),
            ]))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(
                json!({
                    "results": [{
                        "tempoWorklogId": 123,
                        "issue": {
                            "self": "https://example.atlassian.net/rest/api/2/issue/PRJ-1",
                            "key": "PRJ-1"
                        },
                        "timeSpentSeconds": 5400,
                        "startDate": "2020-06-15",
                        "startTime": "11:00:00",
                        "description": "Writing docs",
                        "author": {"accountId": "account-1"}
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let client = TempoClient::with_api_url(&credentials(), &server.url());

        let worklogs = client
            .search_worklogs(date("2020-06-01"), date("2020-06-30"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(worklogs.len(), 1);
        assert_eq!(worklogs[0].tempo_worklog_id, 123);
        assert_eq!(worklogs[0].issue.key, "PRJ-1");
        assert_eq!(worklogs[0].time_spent_seconds, 5400);
        assert_eq!(worklogs[0].start_date, date("2020-06-15"));
        assert_eq!(worklogs[0].author.account_id, "account-1");
    }

    /// descriptionが欠けていてもデシリアライズできることを確認する。
    #[tokio::test]
    async fn test_search_worklogs_without_description() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/worklogs/user/account-1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "results": [{
                        "tempoWorklogId": 1,
                        "issue": {
                            "self": "https://example.atlassian.net/rest/api/2/issue/PRJ-1",
                            "key": "PRJ-1"
                        },
                        "timeSpentSeconds": 3600,
                        "startDate": "2020-06-15",
                        "startTime": "09:00:00",
                        "author": {"accountId": "account-1"}
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let client = TempoClient::with_api_url(&credentials(), &server.url());

        let worklogs = client
            .search_worklogs(date("2020-06-01"), date("2020-06-30"))
            .await
            .unwrap();

        assert_eq!(worklogs[0].description, "");
    }

    /// エラーステータスがエラーになることを確認する。
    #[tokio::test]
    async fn test_search_worklogs_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/worklogs/user/account-1")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;
        let client = TempoClient::with_api_url(&credentials(), &server.url());

        let result = client
            .search_worklogs(date("2020-06-01"), date("2020-06-30"))
            .await;

        assert!(result.is_err());
    }

    /// worklogの作成リクエストを組み立てられることを確認する。
    #[tokio::test]
    async fn test_create_worklog() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/worklogs")
            .match_body(Matcher::PartialJson(json!({
                "issueKey": "PRJ-1",
                "timeSpentSeconds": 5400,
                "startDate": "2020-06-15",
                "startTime": "11:00:00",
                "authorAccountId": "account-1"
            })))
            .with_status(200)
            .with_body(
                json!({
                    "tempoWorklogId": 456,
                    "issue": {
                        "self": "https://example.atlassian.net/rest/api/2/issue/PRJ-1",
                        "key": "PRJ-1"
                    },
                    "timeSpentSeconds": 5400,
                    "startDate": "2020-06-15",
                    "startTime": "11:00:00",
                    "description": "Writing docs",
                    "author": {"accountId": "account-1"}
                })
                .to_string(),
            )
            .create_async()
            .await;
        let client = TempoClient::with_api_url(&credentials(), &server.url());
        let new_worklog = NewWorklog {
            issue_key: "PRJ-1".to_string(),
            time_spent_seconds: 5400,
            start_date: date("2020-06-15"),
            start_time: "11:00:00".to_string(),
            author_account_id: "account-1".to_string(),
            description: Some("Writing docs".to_string()),
            remaining_estimate_seconds: None,
        };

        let worklog = client.create_worklog(&new_worklog).await.unwrap();

        mock.assert_async().await;
        assert_eq!(worklog.tempo_worklog_id, 456);
    }

    /// 未設定のOption項目がリクエスト本文に含まれないことを確認する。
    #[test]
    fn test_new_worklog_skips_empty_options() {
        let new_worklog = NewWorklog {
            issue_key: "PRJ-1".to_string(),
            time_spent_seconds: 3600,
            start_date: date("2020-06-15"),
            start_time: "09:00:00".to_string(),
            author_account_id: "account-1".to_string(),
            description: None,
            remaining_estimate_seconds: None,
        };

        let body = serde_json::to_value(&new_worklog).unwrap();

        assert!(body.get("description").is_none());
        assert!(body.get("remainingEstimateSeconds").is_none());
    }

    /// worklogを1件取得して削除できることを確認する。
    #[tokio::test]
    async fn test_get_and_delete_worklog() {
        let mut server = mockito::Server::new_async().await;
        let get_mock = server
            .mock("GET", "/worklogs/123")
            .with_status(200)
            .with_body(
                json!({
                    "tempoWorklogId": 123,
                    "issue": {
                        "self": "https://example.atlassian.net/rest/api/2/issue/PRJ-1",
                        "key": "PRJ-1"
                    },
                    "timeSpentSeconds": 3600,
                    "startDate": "2020-06-15",
                    "startTime": "09:00:00",
                    "description": "dev",
                    "author": {"accountId": "account-1"}
                })
                .to_string(),
            )
            .create_async()
            .await;
        let delete_mock = server
            .mock("DELETE", "/worklogs/123")
            .with_status(204)
            .create_async()
            .await;
        let client = TempoClient::with_api_url(&credentials(), &server.url());

        let worklog = client.get_worklog(123).await.unwrap();
        client.delete_worklog(123).await.unwrap();

        get_mock.assert_async().await;
        delete_mock.assert_async().await;
        assert_eq!(worklog.tempo_worklog_id, 123);
    }

    /// スケジュールの取得リクエストを組み立てられることを確認する。
    #[tokio::test]
    async fn test_user_schedule() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/user-schedule")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".into(), "2020-06-15".into()),
                Matcher::UrlEncoded("to".into(), "2020-06-16".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "results": [
                        {"date": "2020-06-15", "requiredSeconds": 28800},
                        {"date": "2020-06-16", "requiredSeconds": 28800}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let client = TempoClient::with_api_url(&credentials(), &server.url());

        let schedule = client
            .user_schedule(date("2020-06-15"), date("2020-06-16"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].date, date("2020-06-15"));
        assert_eq!(schedule[0].required_seconds, 28800);
    }
}

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::datetime::DATE_FORMAT;

/// 昨日を表すリテラル。
const YESTERDAY_LITERALS: [&str; 2] = ["y", "yesterday"];
/// 今日を表すリテラル。`t+1`のような日数オフセットの前置にも使う。
const TODAY_LITERALS: [&str; 2] = ["t", "today"];

/// 日付指定をパースできなかった場合のエラー。
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Cannot parse \"{token}\" to a valid date. Try to use the yyyy-MM-dd format, y, yesterday or t+-N. See tempor --help for more examples.")]
pub struct DateParseError {
    pub token: String,
}

/// whenトークンを具体的な日時に解決する。
///
/// 未指定、昨日リテラル、今日±N日、`yyyy-MM-dd`形式の順に解釈する。
/// 相対指定と明示的な日付は時刻を00:00:00に落とし、未指定の場合のみ`now`の時刻を保つ。
pub fn resolve(now: NaiveDateTime, token: Option<&str>) -> Result<NaiveDateTime, DateParseError> {
    let token = match token {
        Some(token) => token,
        None => return Ok(now),
    };
    let midnight = now.date().and_time(NaiveTime::MIN);

    if YESTERDAY_LITERALS.contains(&token) {
        return Ok(midnight - Duration::days(1));
    }
    if let Some(offset) = parse_today_offset(token) {
        // 表現できないほど大きなオフセットもパース不能として扱う
        return Duration::try_days(offset)
            .and_then(|days| midnight.checked_add_signed(days))
            .ok_or_else(|| DateParseError {
                token: token.to_string(),
            });
    }

    match NaiveDate::parse_from_str(token, DATE_FORMAT) {
        Ok(date) => Ok(date.and_time(NaiveTime::MIN)),
        Err(_) => Err(DateParseError {
            token: token.to_string(),
        }),
    }
}

/// `t+N`や`today-N`の形式から符号付きの日数オフセットを取り出す。
///
/// リテラル単体はオフセット指定とはみなさない。
fn parse_today_offset(token: &str) -> Option<i64> {
    TODAY_LITERALS.iter().find_map(|literal| {
        let rest = token.strip_prefix(literal)?;
        parse_signed_days(rest)
    })
}

/// `+N`または`-N`を符号付きの日数としてパースする。
fn parse_signed_days(rest: &str) -> Option<i64> {
    let sign = match rest.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits = &rest[1..];
    if digits.is_empty() || !digits.chars().all(|character| character.is_ascii_digit()) {
        return None;
    }
    let days: i64 = digits.parse().ok()?;

    Some(sign * days)
}

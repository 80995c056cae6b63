use chrono::{Duration, NaiveTime};

use crate::datetime::START_TIME_FORMAT;

/// 時間表現のパース結果。
///
/// `start_time`はインターバル形式で開始時刻が明示された場合のみ設定される。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseResult {
    pub seconds: i64,
    pub start_time: Option<NaiveTime>,
}

/// 表示用に再構成した開始時刻と終了時刻のペア。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// 時間表現をパースする。
///
/// `1h30m`のような経過時間形式と、`11:00-12:30`のようなインターバル形式を受け付ける。
/// どちらの文法にも一致しない場合は`None`を返し、エラーにするかどうかは呼び出し側が決める。
///
/// # Examples
///
/// ```
/// let result = parse("1h30m").unwrap();
/// assert_eq!(result.seconds, 5400);
/// ```
pub fn parse(expression: &str) -> Option<ParseResult> {
    let expression = expression.trim();
    if let Some(seconds) = parse_duration(expression) {
        return Some(ParseResult {
            seconds,
            start_time: None,
        });
    }

    parse_interval(expression)
}

/// 単独の時刻文字列をパースする。
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    parse_clock(text.trim())
}

/// 保存済みの秒数と開始時刻の文字列から表示用のインターバルを再構成する。
///
/// 開始時刻がない、またはパースできない場合は`None`を返す。
pub fn to_interval(seconds: i64, start_time: Option<&str>) -> Option<Interval> {
    let start = NaiveTime::parse_from_str(start_time?, START_TIME_FORMAT).ok()?;
    // NaiveTimeの加算は深夜をまたぐと折り返す
    let end = start + Duration::seconds(seconds);

    Some(Interval { start, end })
}

/// 秒数を経過時間形式の文字列に戻す。
///
/// 正の分単位で表現できない値は`None`を返す。
pub fn to_duration(seconds: i64) -> Option<String> {
    if seconds <= 0 || seconds % 60 != 0 {
        return None;
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let mut rendered = String::new();
    if hours > 0 {
        rendered.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        rendered.push_str(&format!("{}m", minutes));
    }

    Some(rendered)
}

/// `<数値><単位>`の繰り返しとして経過時間をパースする。単位はhとmのみ。
///
/// 単位のない数値が残った場合や、数値のない単位はエラーとする。
fn parse_duration(expression: &str) -> Option<i64> {
    let mut seconds = 0i64;
    let mut digits = String::new();
    let mut found_token = false;
    for character in expression.chars() {
        if character.is_ascii_digit() {
            digits.push(character);
            continue;
        }
        if digits.is_empty() {
            return None;
        }
        let magnitude: i64 = digits.parse().ok()?;
        digits.clear();
        // 表現できないほど大きな値もパース不能として扱う
        let token_seconds = match character {
            'h' => magnitude.checked_mul(3600)?,
            'm' => magnitude.checked_mul(60)?,
            _ => return None,
        };
        seconds = seconds.checked_add(token_seconds)?;
        found_token = true;
    }
    if !digits.is_empty() || !found_token {
        return None;
    }

    Some(seconds)
}

/// `<時刻>-<時刻>`としてインターバルをパースする。
///
/// 終了が開始以前の場合は失敗とし、日をまたぐ解釈はしない。
fn parse_interval(expression: &str) -> Option<ParseResult> {
    let (left, right) = expression.split_once('-')?;
    let start = parse_clock(left)?;
    let end = parse_clock(right)?;
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return None;
    }

    Some(ParseResult {
        seconds,
        start_time: Some(start),
    })
}

/// 時刻を`HH:mm`、`HHmm`、`H`のいずれかの形式としてパースする。
fn parse_clock(text: &str) -> Option<NaiveTime> {
    if text.is_empty() || !text.chars().all(|character| character.is_ascii_digit() || character == ':') {
        return None;
    }

    let (hour_part, minute_part) = match text.split_once(':') {
        Some((hour_part, minute_part)) => {
            if minute_part.len() != 2 {
                return None;
            }
            (hour_part, minute_part)
        }
        None => match text.len() {
            1 | 2 => (text, "0"),
            4 => text.split_at(2),
            _ => return None,
        },
    };
    if hour_part.is_empty() || hour_part.len() > 2 {
        return None;
    }
    let hour: u32 = hour_part.parse().ok()?;
    let minute: u32 = minute_part.parse().ok()?;

    NaiveTime::from_hms_opt(hour, minute, 0)
}

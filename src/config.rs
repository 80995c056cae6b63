use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// APIトークンを上書きする環境変数。
const API_TOKEN_ENV: &str = "TEMPO_API_TOKEN";
/// アカウントIDを上書きする環境変数。
const ACCOUNT_ID_ENV: &str = "TEMPO_ACCOUNT_ID";
/// 設定ファイルの名前。ホームディレクトリ直下に置く。
const CONFIG_FILE_NAME: &str = ".tempor.json";

/// 設定ファイルの内容。
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    pub api_token: Option<String>,
    pub account_id: Option<String>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

/// API呼び出しに必要な認証情報。
#[derive(Clone, Debug)]
pub struct Credentials {
    pub api_token: String,
    pub account_id: String,
}

impl Config {
    /// 設定ファイルを読み込む。ファイルがない場合は空の設定を返す。
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    /// 設定ファイルへ書き込む。
    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file at {}", path.display()))
    }

    /// 環境変数を優先して認証情報を解決する。
    ///
    /// トークンまたはアカウントIDが見つからない場合は`tempor setup`への誘導を
    /// 含むエラーを返す。
    pub fn credentials(&self) -> Result<Credentials> {
        let api_token = env_value(API_TOKEN_ENV)
            .or_else(|| self.api_token.clone())
            .context("Tempo API token is not set. Run `tempor setup` first.")?;
        let account_id = env_value(ACCOUNT_ID_ENV)
            .or_else(|| self.account_id.clone())
            .context("Tempo account id is not set. Run `tempor setup` first.")?;

        Ok(Credentials {
            api_token,
            account_id,
        })
    }

    /// エイリアスをissueキーに解決する。未登録の場合は入力をそのまま返す。
    pub fn resolve_issue_key(&self, key_or_alias: &str) -> String {
        self.aliases
            .get(key_or_alias)
            .cloned()
            .unwrap_or_else(|| key_or_alias.to_string())
    }
}

/// 空でない環境変数の値を返す。
fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// 設定ファイルのパスを返す。
fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to resolve home directory")?;

    Ok(home.join(CONFIG_FILE_NAME))
}

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use crate::config::Config;

/// 認証情報を保存するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct SetupArgs {
    #[clap(long = "token", help = "Tempo API token, prompted for when omitted")]
    token: Option<String>,

    #[clap(
        long = "account-id",
        help = "Atlassian account id, prompted for when omitted"
    )]
    account_id: Option<String>,
}

/// `setup`サブコマンドの処理を行う。
///
/// フラグで渡されなかった項目を標準入力から読み、設定に反映する。
/// 保存は呼び出し側で行う。
pub fn setup_command(setup: SetupArgs, config: &mut Config) -> Result<()> {
    if setup.token.is_none() || setup.account_id.is_none() {
        println!("Create a Tempo API token under Tempo > Settings > API integration and have your Atlassian account id ready.");
    }
    let token = match setup.token {
        Some(token) => token,
        None => prompt("Tempo API token: ")?,
    };
    let account_id = match setup.account_id {
        Some(account_id) => account_id,
        None => prompt("Atlassian account id: ")?,
    };

    config.api_token = Some(token);
    config.account_id = Some(account_id);

    Ok(())
}

/// 標準入力から1行の入力を求める。
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read the input")?;
    let line = line.trim().to_string();
    if line.is_empty() {
        bail!("No value entered.");
    }

    Ok(line)
}

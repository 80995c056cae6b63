use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use crate::config::Config;

/// issueキーのエイリアスを管理するサブコマンド。
#[derive(Debug, Subcommand)]
pub enum AliasSubCommands {
    /// エイリアスを登録する。
    Set {
        #[clap(help = "Alias name, eg standup")]
        alias: String,
        #[clap(help = "Issue key the alias points to, eg PRJ-1")]
        issue_key: String,
    },
    /// エイリアスを削除する。
    Delete {
        #[clap(help = "Alias name to remove")]
        alias: String,
    },
    /// 登録済みのエイリアスを一覧する。
    List,
}

/// `alias`サブコマンドの処理を行う。
///
/// 設定が変更された場合は`true`を返す。保存は呼び出し側で行う。
pub fn alias_command<W: Write>(
    alias: AliasSubCommands,
    config: &mut Config,
    writer: &mut W,
) -> Result<bool> {
    match alias {
        AliasSubCommands::Set { alias, issue_key } => {
            config.aliases.insert(alias.clone(), issue_key.clone());
            writeln!(writer, "Alias {} -> {} saved.", alias, issue_key)
                .context("Failed to write the confirmation")?;

            Ok(true)
        }
        AliasSubCommands::Delete { alias } => {
            if config.aliases.remove(&alias).is_none() {
                bail!("Alias \"{}\" is not set.", alias);
            }
            writeln!(writer, "Alias {} removed.", alias)
                .context("Failed to write the confirmation")?;

            Ok(true)
        }
        AliasSubCommands::List => {
            if config.aliases.is_empty() {
                writeln!(writer, "No aliases set.").context("Failed to write the alias list")?;
                return Ok(false);
            }
            let mut aliases: Vec<(&String, &String)> = config.aliases.iter().collect();
            aliases.sort_by(|a, b| a.0.cmp(b.0));
            for (alias, issue_key) in aliases {
                writeln!(writer, "- {} -> {}", alias, issue_key)
                    .context("Failed to write the alias list")?;
            }

            Ok(false)
        }
    }
}

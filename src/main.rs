use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fern::colors::{Color, ColoredLevelConfig};

mod alias_command;
mod config;
mod console;
mod datetime;
mod delete_command;
mod list_command;
mod log_command;
mod report;
mod report_command;
mod schedule;
mod setup_command;
mod tempo;
mod time_parser;
mod when;
mod worklog;

use alias_command::{alias_command, AliasSubCommands};
use config::Config;
use console::{ConsoleMarkdownList, ConsolePresenter};
use delete_command::{DeleteArgs, DeleteCommand};
use list_command::{ListArgs, ListCommand};
use log_command::{LogArgs, LogCommand};
use report_command::{ReportArgs, ReportCommand};
use setup_command::{setup_command, SetupArgs};
use tempo::TempoClient;

/// Tempoへ作業時間を記録・集計するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- log PRJ-1 1h30m
/// $ cargo run -- report --start 2020-06-01 --verbose
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(long, global = true, help = "Print debug logs")]
    debug: bool,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    #[clap(visible_alias = "l")]
    Log(LogArgs),
    #[clap(visible_alias = "d")]
    Delete(DeleteArgs),
    #[clap(visible_alias = "ls")]
    List(ListArgs),
    #[clap(visible_alias = "rep")]
    Report(ReportArgs),
    Setup(SetupArgs),
    #[clap(subcommand)]
    Alias(AliasSubCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logger(args.debug)?;

    let mut stdout = io::stdout();
    match args.subcommand {
        SubCommands::Log(log) => {
            let config = Config::load()?;
            let credentials = config.credentials()?;
            let client = TempoClient::new(&credentials);
            let worklog = LogCommand::new(&client, &config, &credentials.account_id)
                .run(log)
                .await?;
            ConsoleMarkdownList::new(&mut stdout).show_worklog(&worklog)?;
        }
        SubCommands::Delete(delete) => {
            let config = Config::load()?;
            let credentials = config.credentials()?;
            let client = TempoClient::new(&credentials);
            let worklog = DeleteCommand::new(&client).run(delete).await?;
            ConsoleMarkdownList::new(&mut stdout).show_worklog(&worklog)?;
        }
        SubCommands::List(list) => {
            let config = Config::load()?;
            let credentials = config.credentials()?;
            let client = TempoClient::new(&credentials);
            let user_worklogs = ListCommand::new(&client, &credentials.account_id)
                .run(list)
                .await?;
            ConsoleMarkdownList::new(&mut stdout).show_user_worklogs(&user_worklogs)?;
        }
        SubCommands::Report(report) => {
            let config = Config::load()?;
            let credentials = config.credentials()?;
            let client = TempoClient::new(&credentials);
            let verbose = report.verbose;
            let totals = ReportCommand::new(&client).run(report).await?;
            ConsoleMarkdownList::new(&mut stdout).show_report(&totals, verbose)?;
        }
        SubCommands::Setup(setup) => {
            let mut config = Config::load()?;
            setup_command(setup, &mut config)?;
            config.save()?;
            println!("Setup complete.");
        }
        SubCommands::Alias(alias) => {
            let mut config = Config::load()?;
            if alias_command(alias, &mut config, &mut stdout)? {
                config.save()?;
            }
        }
    }

    Ok(())
}

/// fernのロガーを初期化する。ログはすべて標準エラーへ出力する。
fn setup_logger(debug: bool) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
        .debug(Color::BrightBlack);
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!("[{}] {}", colors.color(record.level()), message))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
        .context("Failed to initialize logger")?;

    Ok(())
}

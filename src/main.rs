use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use pgcmp::cli::commands::compare::{CompareCommand, CompareCommandHandler};
use pgcmp::cli::commands::export::{ExportCommand, ExportCommandHandler};
use pgcmp::cli::commands::row_counts::{RowCountsCommand, RowCountsCommandHandler};
use pgcmp::cli::commands::CommandResult;
use pgcmp::cli::{Cli, Commands};
use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 差分ありの終了コード
const EXIT_DIFFERENCES: i32 = 2;

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(result) => {
            if !result.output.is_empty() {
                println!("{}", result.output);
            }
            if result.has_differences {
                process::exit(EXIT_DIFFERENCES);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// トレーシングを初期化（RUST_LOG が優先、未設定時は warn / --verbose で debug）
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "pgcmp=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<CommandResult> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // --config フラグの処理（絶対パスに変換）
    let current_dir = env::current_dir()?;
    let config_path: Option<PathBuf> = cli.config.map(|p| {
        if p.is_absolute() {
            p
        } else {
            current_dir.join(p)
        }
    });

    // スピナーは対話端末でのみ表示
    let show_progress = std::io::stderr().is_terminal();

    match cli.command {
        Commands::Compare {
            left,
            right,
            apply_sql_file,
            format,
        } => {
            let handler = CompareCommandHandler::new();
            let command = CompareCommand {
                config_path,
                left,
                right,
                apply_sql_file,
                format,
                show_progress,
            };
            handler.execute(&command).await
        }

        Commands::RowCounts {
            left,
            right,
            format,
        } => {
            let handler = RowCountsCommandHandler::new();
            let command = RowCountsCommand {
                config_path,
                left,
                right,
                format,
                show_progress,
            };
            handler.execute(&command).await
        }

        Commands::Export {
            source,
            output,
            force,
        } => {
            let handler = ExportCommandHandler::new();
            let command = ExportCommand {
                config_path,
                source,
                output,
                force,
                show_progress,
            };
            let output = handler.execute(&command).await?;
            Ok(CommandResult {
                output,
                has_differences: false,
            })
        }
    }
}

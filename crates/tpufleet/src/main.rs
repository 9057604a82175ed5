mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tpufleet_core::Generation;

#[derive(Parser)]
#[command(name = "tpufleet")]
#[command(about = "TPU VMフリートを望ましい台数に保ち、名前で到達できるようにする", long_about = None)]
struct Cli {
    /// 設定ファイル（省略時は自動探索）
    #[arg(short, long, env = "TPUFLEET_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// ログを詳しく出す（-v: info, -vv: debug）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// フリートを調整（検査 → 不足分の作成 → hosts同期）
    Up {
        /// 対象の世代（省略時は要求された全世代）
        #[arg(short, long, value_parser = utils::parse_generation)]
        generation: Option<Generation>,
        /// 設定に関わらず不足ノードを作成する
        #[arg(long, conflicts_with = "no_create")]
        create_missing: bool,
        /// 設定に関わらず作成しない（報告のみ）
        #[arg(long)]
        no_create: bool,
        /// hosts / known_hosts の同期をスキップ
        #[arg(long)]
        skip_hosts: bool,
        /// 計画だけ表示して何も変更しない
        #[arg(long)]
        dry_run: bool,
        /// sudoを使わずに直接書き込む
        #[arg(long)]
        no_sudo: bool,
    },
    /// フリートの状態を表示（変更しない）
    Status {
        /// 対象の世代（省略時は要求された全世代）
        #[arg(short, long, value_parser = utils::parse_generation)]
        generation: Option<Generation>,
    },
    /// 準拠ノードのhosts / known_hostsだけを同期
    Hosts {
        /// 対象の世代（省略時は要求された全世代）
        #[arg(short, long, value_parser = utils::parse_generation)]
        generation: Option<Generation>,
        /// sudoを使わずに直接書き込む
        #[arg(long)]
        no_sudo: bool,
    },
    /// 設定を検証
    Validate {
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    utils::init_logging(cli.verbose);

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("tpufleet {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if let Commands::Validate { json } = cli.command {
        return commands::validate::handle(cli.config.as_deref(), json);
    }

    let (config_path, fleet) = utils::load_fleet(cli.config.as_deref())?;
    tracing::info!("Loaded {}", config_path.display());

    // コマンドディスパッチ
    let ok = match cli.command {
        Commands::Up {
            generation,
            create_missing,
            no_create,
            skip_hosts,
            dry_run,
            no_sudo,
        } => {
            let options = tpufleet_cloud::ReconcileOptions {
                create_missing: utils::create_override(create_missing, no_create),
                sync_hosts: !skip_hosts,
                dry_run,
            };
            commands::up::handle(&fleet, generation, options, no_sudo).await?
        }
        Commands::Status { generation } => commands::status::handle(&fleet, generation).await?,
        Commands::Hosts {
            generation,
            no_sudo,
        } => commands::hosts::handle(&fleet, generation, no_sudo).await?,
        Commands::Validate { .. } => {
            unreachable!("Validate is handled before config loading");
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    };

    if !ok {
        std::process::exit(1);
    }

    Ok(())
}

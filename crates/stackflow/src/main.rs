mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stackflow_config::Settings;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_ENVIRONMENT: &str = "test";

#[derive(Parser)]
#[command(name = "stackflow")]
#[command(
    about = "環境ごとのサービス定義から、デプロイパイプラインとキューサービスのスタック構成を計画する",
    long_about = None
)]
struct Cli {
    /// デプロイ先AWSアカウント
    #[arg(long, global = true, env = "CDK_DEPLOY_ACCOUNT")]
    account: Option<String>,

    /// デプロイ先リージョン
    #[arg(long, global = true, env = "CDK_DEPLOY_REGION")]
    region: Option<String>,

    /// 設定ファイル（省略時は stackflow.yml を探索）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// サービスをデプロイ対象と固定対象に分割して表示
    Resolve {
        /// 環境名 (test, prod)
        environment: Option<String>,
        /// 環境名 (-e/--environment フラグ、STACKFLOW_ENVIRONMENT 環境変数)
        #[arg(
            short = 'e',
            long = "environment",
            env = "STACKFLOW_ENVIRONMENT",
            conflicts_with = "environment"
        )]
        environment_flag: Option<String>,
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },
    /// スタックの作成順序と前回の状態との差分を表示
    Plan {
        /// 環境名 (test, prod)
        environment: Option<String>,
        /// 環境名 (-e/--environment フラグ、STACKFLOW_ENVIRONMENT 環境変数)
        #[arg(
            short = 'e',
            long = "environment",
            env = "STACKFLOW_ENVIRONMENT",
            conflicts_with = "environment"
        )]
        environment_flag: Option<String>,
        /// JSONで出力
        #[arg(long)]
        json: bool,
        /// 計画したスタック構成を状態として保存
        #[arg(long)]
        save: bool,
    },
    /// 設定を検証（環境名を省略した場合は全環境）
    Validate {
        /// 環境名 (test, prod)
        environment: Option<String>,
        /// 環境名 (-e/--environment フラグ、STACKFLOW_ENVIRONMENT 環境変数)
        #[arg(
            short = 'e',
            long = "environment",
            env = "STACKFLOW_ENVIRONMENT",
            conflicts_with = "environment"
        )]
        environment_flag: Option<String>,
    },
    /// バージョン情報を表示
    Version,
}

fn pick_environment(positional: Option<String>, flag: Option<String>) -> Option<String> {
    positional.or(flag)
}

fn load_settings(cli: &Cli, project_root: &Path) -> anyhow::Result<Settings> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("設定ファイルを読み込めません: {}", path.display()))?,
        None => stackflow_config::load_project_settings(project_root)?,
    };
    Ok(settings.with_overrides(cli.account.clone(), cli.region.clone()))
}

fn project_root() -> anyhow::Result<PathBuf> {
    let project_root = stackflow_core::find_project_root()?;
    tracing::debug!(project_root = %project_root.display(), "Using project root");
    Ok(project_root)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdoutはJSON出力に使うので、ログはstderrへ
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match &cli.command {
        // Versionコマンドはプロジェクト不要
        Commands::Version => {
            println!("stackflow {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Resolve {
            environment,
            environment_flag,
            json,
        } => {
            let environment = pick_environment(environment.clone(), environment_flag.clone())
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
            commands::resolve::handle(&project_root()?, &environment, *json)?;
        }
        Commands::Plan {
            environment,
            environment_flag,
            json,
            save,
        } => {
            let environment = pick_environment(environment.clone(), environment_flag.clone())
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
            let project_root = project_root()?;
            let settings = load_settings(&cli, &project_root)?;
            commands::plan::handle(&project_root, &settings, &environment, *json, *save).await?;
        }
        Commands::Validate {
            environment,
            environment_flag,
        } => {
            let environment = pick_environment(environment.clone(), environment_flag.clone());
            commands::validate::handle(&project_root()?, environment.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pick_environment_prefers_positional() {
        assert_eq!(
            pick_environment(Some("prod".to_string()), None).as_deref(),
            Some("prod")
        );
        assert_eq!(
            pick_environment(None, Some("stg".to_string())).as_deref(),
            Some("stg")
        );
        assert_eq!(pick_environment(None, None), None);
    }
}

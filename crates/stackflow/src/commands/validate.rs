use colored::Colorize;
use std::path::Path;

pub fn handle(project_root: &Path, environment: Option<&str>) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());
    println!(
        "プロジェクトルート: {}",
        project_root.display().to_string().cyan()
    );

    let environments = match environment {
        Some(name) => vec![name.to_string()],
        None => stackflow_core::list_environments(project_root)?,
    };

    if environments.is_empty() {
        eprintln!();
        eprintln!("{}", "✗ 環境定義が見つかりません".red().bold());
        eprintln!("  config/<環境名>.yml を作成してください");
        std::process::exit(1);
    }

    let mut failures = 0;
    for name in &environments {
        let result = stackflow_core::load_environment(project_root, name)
            .and_then(|document| document.resolve());
        match result {
            Ok(resolution) => {
                println!(
                    "  {} {} (デプロイ対象 {}個, 固定 {}個)",
                    "✓".green(),
                    name.cyan(),
                    resolution.deployable().len(),
                    resolution.frozen().len()
                );
            }
            Err(e) => {
                failures += 1;
                let label = if e.is_configuration_error() {
                    "設定エラー"
                } else {
                    "エラー"
                };
                eprintln!("  {} {} {}", "✗".red(), name.cyan(), label.red().bold());
                eprintln!("    {}", e);
            }
        }
    }

    if failures > 0 {
        eprintln!();
        eprintln!(
            "{}",
            format!("✗ {}個の環境でエラーがあります", failures)
                .red()
                .bold()
        );
        std::process::exit(1);
    }

    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    Ok(())
}

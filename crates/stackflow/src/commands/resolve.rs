use colored::Colorize;
use stackflow_cloud::DEPLOY_PIPELINE;
use stackflow_core::TargetSet;
use std::path::Path;

fn print_targets(title: &str, targets: &TargetSet) {
    println!("{} {}個", title.bold(), targets.len());
    for target in targets.iter() {
        println!(
            "  - {} → {} ({}, {}日)",
            target.name.cyan(),
            target.stack_id(),
            target.effective_tag.to_string().yellow(),
            target.age_restriction_days
        );
    }
}

pub fn handle(project_root: &Path, environment: &str, json: bool) -> anyhow::Result<()> {
    let document = stackflow_core::load_environment(project_root, environment)?;
    let resolution = document.resolve()?;
    let constraints = resolution.ordering_constraints(DEPLOY_PIPELINE);

    if json {
        let output = serde_json::json!({
            "environment": environment,
            "deployable": resolution.deployable(),
            "frozen": resolution.frozen(),
            "orderingConstraints": constraints,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("環境: {}", environment.cyan().bold());
    println!();
    print_targets("デプロイ対象 (latest に追従):", resolution.deployable());
    print_targets("固定 (バージョン指定):", resolution.frozen());

    if !constraints.is_empty() {
        println!();
        println!("{}", "順序制約:".bold());
        for constraint in &constraints {
            println!(
                "  - {} は {} の後に作成",
                constraint.dependent.cyan(),
                constraint.dependency
            );
        }
    }

    Ok(())
}

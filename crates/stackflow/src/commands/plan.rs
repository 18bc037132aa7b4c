use colored::Colorize;
use stackflow_cloud::{ActionType, DeployedState, Plan, StateManager};
use stackflow_config::Settings;
use std::path::Path;

fn action_marker(action_type: ActionType) -> colored::ColoredString {
    match action_type {
        ActionType::Create => "+".green(),
        ActionType::Update => "~".yellow(),
        ActionType::Delete => "-".red(),
        ActionType::NoOp => "=".dimmed(),
    }
}

pub async fn handle(
    project_root: &Path,
    settings: &Settings,
    environment: &str,
    json: bool,
    save: bool,
) -> anyhow::Result<()> {
    let document = stackflow_core::load_environment(project_root, environment)?;
    let resolution = document.resolve()?;
    let graph = stackflow_cloud::assemble(settings, environment, &resolution)?;

    let state_manager = StateManager::new(project_root);
    let previous = state_manager.load(environment).await?;
    let plan = Plan::between(previous.as_ref(), &graph)?;
    let waves = graph.waves()?;

    if json {
        let summary = plan.summary();
        let output = serde_json::json!({
            "environment": environment,
            "order": graph.deployment_order()?,
            "waves": waves,
            "dependencies": graph.dependency_pairs(),
            "stacks": graph.iter().collect::<Vec<_>>(),
            "actions": plan.actions,
            "summary": {
                "create": summary.create,
                "update": summary.update,
                "delete": summary.delete,
                "unchanged": summary.no_change,
            },
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("環境: {}", environment.cyan().bold());
        println!();
        println!("{}", "作成順序:".bold());
        for (index, wave) in waves.iter().enumerate() {
            println!("  {}. {}", index + 1, wave.join(", "));
        }

        println!();
        println!("{}", "依存関係:".bold());
        for (dependent, dependency) in graph.dependency_pairs() {
            println!("  {} → {}", dependent.cyan(), dependency);
        }

        println!();
        println!("{}", "変更内容:".bold());
        for action in &plan.actions {
            println!("  {} {}", action_marker(action.action_type), action.description);
        }
        println!();
        println!("Plan: {}", plan.summary());
    }

    if save {
        let state = DeployedState::from_graph(environment, &graph);
        state_manager.save(&state).await?;
        if !json {
            println!(
                "{} {}",
                "✓ 状態を保存しました:".green(),
                state_manager.state_path(environment).display()
            );
        }
    }

    Ok(())
}

//! Plan display

use authgraph::AuthResource;
use colored::{ColoredString, Colorize};
use declarative::{DiffSummary, ExecutionPlan, LogicalId, PlanAction, ResourceDiff};

/// Colored marker for a planned action
fn action_symbol(action: PlanAction) -> ColoredString {
    let symbol = action.symbol().to_string();
    match action {
        PlanAction::Create => symbol.green(),
        PlanAction::Update => symbol.yellow(),
        PlanAction::Delete => symbol.red(),
        PlanAction::NoChange => symbol.dimmed(),
    }
}

/// Comma-separated dependencies of a node, `None` for roots
fn dependency_list(plan: &ExecutionPlan<AuthResource>, id: &LogicalId) -> Option<String> {
    let deps: Vec<&str> = plan
        .graph()
        .get(id)?
        .dependencies()
        .iter()
        .map(LogicalId::as_str)
        .collect();

    if deps.is_empty() {
        None
    } else {
        Some(deps.join(", "))
    }
}

/// Display the apply plan in resolved order
///
/// `orphans` are recorded resources the configuration no longer declares;
/// they are removed after a successful apply.
pub fn display_plan(
    plan: &ExecutionPlan<AuthResource>,
    diffs: &[ResourceDiff],
    orphans: &[LogicalId],
) {
    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Stack Plan".bold()
    );
    println!("│");

    for (index, diff) in diffs.iter().enumerate() {
        println!(
            "│ {:>2}. {} {:<22} {}",
            index + 1,
            action_symbol(diff.action()),
            diff.resource_id.as_str(),
            diff.description.dimmed()
        );
        if let Some(deps) = dependency_list(plan, &diff.resource_id) {
            println!("│       {} {}", "after".dimmed(), deps);
        }
    }

    for orphan in orphans {
        println!(
            "│     {} {:<22} {}",
            action_symbol(PlanAction::Delete),
            orphan.as_str(),
            "(no longer declared)".dimmed()
        );
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!("│");
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} to create, {} to update, {} to delete, {} unchanged",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        (summary.removals + orphans.len()).to_string().red(),
        summary.unchanged
    );
    println!("└─────────────────────────────────────────────────────┘");
}

/// Display what a destroy would remove, in teardown order
pub fn display_teardown(diffs: &[ResourceDiff], orphans: &[LogicalId]) {
    if diffs.is_empty() && orphans.is_empty() {
        println!();
        println!("  {} Nothing to destroy", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Teardown Plan".red().bold()
    );
    println!("│");

    for orphan in orphans {
        println!(
            "│   {} {:<22} {}",
            action_symbol(PlanAction::Delete),
            orphan.as_str(),
            "(no longer declared)".dimmed()
        );
    }
    for diff in diffs {
        println!(
            "│   {} {:<22} {}",
            action_symbol(PlanAction::Delete),
            diff.resource_id.as_str(),
            diff.description.dimmed()
        );
    }

    println!("│");
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} resources to destroy",
        (diffs.len() + orphans.len()).to_string().bold()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgraph::resources::{MANAGED_LOGIN_BRANDING, USER_POOL};
    use authgraph::{DeploymentContext, RawConfig};

    #[test]
    fn test_dependency_list() {
        let raw = RawConfig {
            stack_name_base: Some("demo".into()),
            ..Default::default()
        };
        let context = DeploymentContext::new("111111111111", "us-east-1").unwrap();
        let plan = authgraph::plan(raw, &context, None).unwrap();

        assert_eq!(dependency_list(&plan, &LogicalId::from(USER_POOL)), None);
        assert_eq!(
            dependency_list(&plan, &LogicalId::from(MANAGED_LOGIN_BRANDING)).as_deref(),
            Some("UserPoolDomain, UserPoolClient")
        );
        assert_eq!(dependency_list(&plan, &LogicalId::from("Unknown")), None);
    }
}

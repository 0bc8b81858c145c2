//! Stack commands: plan, apply, destroy and outputs

use anyhow::{Context as _, Result};
use authgraph::{AuthResource, DeploymentContext, StackOutputs};
use colored::Colorize;
use declarative::{DiffSummary, ExecuteOptions, ExecuteReport, ExecutionPlan};
use std::path::Path;

use crate::Context;
use crate::cli::StackArgs;
use crate::engine::{self, LocalEngine, TerminalProgress};
use crate::{config, paths, ui};

/// A validated, resolved stack
struct LoadedStack {
    name: String,
    context: DeploymentContext,
    plan: ExecutionPlan<AuthResource>,
}

impl LoadedStack {
    fn load(args: &StackArgs) -> Result<Self> {
        let raw = config::load(&args.config)?;
        let name = raw.stack_name_base.clone().unwrap_or_default();

        let context = DeploymentContext::new(
            args.account_id.clone().unwrap_or_default(),
            args.region.clone().unwrap_or_default(),
        )
        .context("Set --account-id (AUTHSTACK_ACCOUNT_ID) and --region (AWS_REGION)")?;

        let plan = authgraph::plan(raw, &context, Some(args.callback_urls.as_slice()))
            .with_context(|| format!("Invalid stack configuration in {}", args.config))?;

        Ok(Self {
            name,
            context,
            plan,
        })
    }

    fn open_engine(&self, state_dir: &Path) -> Result<LocalEngine> {
        LocalEngine::open(state_dir, &self.name, &self.context)
    }

    fn header(&self, ctx: &Context) {
        if !ctx.quiet {
            ui::header(&format!(
                "Stack {} ({}/{})",
                self.name,
                self.context.account_id(),
                self.context.region()
            ));
        }
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Show the resolved plan and the pending action of every node
pub fn plan(ctx: &Context, args: &StackArgs) -> Result<()> {
    plan_in(&paths::state_dir()?, ctx, args)
}

fn plan_in(state_dir: &Path, ctx: &Context, args: &StackArgs) -> Result<()> {
    let stack = LoadedStack::load(args)?;
    let engine = stack.open_engine(state_dir)?;

    let diffs = declarative::compute_diffs(&stack.plan, &engine)?;
    let orphans = engine.orphans(stack.plan.graph());

    stack.header(ctx);
    engine::display_plan(&stack.plan, &diffs, &orphans);
    Ok(())
}

// ============================================================================
// Apply
// ============================================================================

/// Provision the stack and print its outputs
pub fn apply(ctx: &Context, args: &StackArgs, dry_run: bool, yes: bool) -> Result<()> {
    apply_in(&paths::state_dir()?, ctx, args, dry_run, yes).map(|_| ())
}

fn apply_in(
    state_dir: &Path,
    ctx: &Context,
    args: &StackArgs,
    dry_run: bool,
    yes: bool,
) -> Result<Option<StackOutputs>> {
    let stack = LoadedStack::load(args)?;
    let mut engine = stack.open_engine(state_dir)?;

    let diffs = declarative::compute_diffs(&stack.plan, &engine)?;
    let orphans = engine.orphans(stack.plan.graph());
    let has_changes = DiffSummary::from_diffs(&diffs).has_changes() || !orphans.is_empty();

    stack.header(ctx);
    engine::display_plan(&stack.plan, &diffs, &orphans);

    if dry_run {
        println!();
        ui::info("Dry run - no changes made");
        return Ok(None);
    }

    if has_changes && !yes && !engine::confirm_proceed("Apply these changes?", true)? {
        println!();
        ui::warn("Aborted");
        return Ok(None);
    }

    println!();
    println!(
        "  {} Applying {} resources...",
        "→".cyan(),
        stack.plan.total_resources()
    );

    let opts = ExecuteOptions::default();
    let mut progress = TerminalProgress::new(ctx.verbose > 0, ctx.quiet);
    let report = declarative::apply(&stack.plan, &mut engine, &opts, &mut progress);

    if report.is_success() {
        for id in engine.prune(stack.plan.graph())? {
            println!(
                "    {} {:<22} removed (no longer declared)",
                "✓".green(),
                id.as_str()
            );
        }
    }

    finish(&report, "applied")?;

    let outputs = authgraph::export(stack.plan.graph(), &report.applied)?;
    print_outputs(&outputs);
    Ok(Some(outputs))
}

// ============================================================================
// Destroy
// ============================================================================

/// Tear the stack down in reverse dependency order
pub fn destroy(ctx: &Context, args: &StackArgs, yes: bool) -> Result<()> {
    destroy_in(&paths::state_dir()?, ctx, args, yes)
}

fn destroy_in(state_dir: &Path, ctx: &Context, args: &StackArgs, yes: bool) -> Result<()> {
    let stack = LoadedStack::load(args)?;
    let mut engine = stack.open_engine(state_dir)?;

    let diffs = declarative::compute_teardown_diffs(&stack.plan, &engine)?;
    let orphans = engine.orphans(stack.plan.graph());

    stack.header(ctx);
    engine::display_teardown(&diffs, &orphans);

    if diffs.is_empty() && orphans.is_empty() {
        engine.remove_if_empty()?;
        return Ok(());
    }

    let prompt = format!("Destroy stack '{}'?", stack.name);
    if !yes && !engine::confirm_proceed(&prompt, false)? {
        println!();
        ui::warn("Aborted");
        return Ok(());
    }

    println!();
    for id in engine.prune(stack.plan.graph())? {
        println!("    {} {:<22} removed", "✓".green(), id.as_str());
    }

    let opts = ExecuteOptions::default();
    let mut progress = TerminalProgress::new(ctx.verbose > 0, ctx.quiet);
    let report = declarative::destroy(&stack.plan, &mut engine, &opts, &mut progress);

    finish(&report, "destroyed")?;

    if engine.remove_if_empty()? {
        ui::success(&format!("Removed {}", engine.path().display()));
    }
    Ok(())
}

// ============================================================================
// Outputs
// ============================================================================

/// Print the outputs of an applied stack
pub fn outputs(args: &StackArgs, json: bool) -> Result<()> {
    let outputs = outputs_in(&paths::state_dir()?, args)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&outputs).context("Failed to serialize outputs")?;
        println!("{rendered}");
    } else {
        print_outputs(&outputs);
    }
    Ok(())
}

fn outputs_in(state_dir: &Path, args: &StackArgs) -> Result<StackOutputs> {
    let stack = LoadedStack::load(args)?;
    let engine = stack.open_engine(state_dir)?;

    authgraph::export(stack.plan.graph(), &engine.state().applied_set())
        .with_context(|| format!("Stack '{}' has not been applied yet", stack.name))
}

// ============================================================================
// Helpers
// ============================================================================

/// Print the summary and turn failures into an error
fn finish(report: &ExecuteReport, verb: &str) -> Result<()> {
    engine::print_summary(&report.summary, verb);

    if !report.is_success() {
        engine::print_failures(&report.failures);
        anyhow::bail!(
            "{} resources failed; rerun once the cause is fixed",
            report.summary.failed
        );
    }
    Ok(())
}

fn print_outputs(outputs: &StackOutputs) {
    ui::section("Outputs");
    ui::kv("userPoolId", &outputs.user_pool_id);
    ui::kv("userPoolClientId", &outputs.user_pool_client_id);
    ui::kv("userPoolDomain", &outputs.user_pool_domain.prefix);
    ui::kv("domainName", &outputs.user_pool_domain.domain_name);
    if let Some(created) = &outputs.admin_user_created {
        ui::kv("AdminUserCreated", created);
    }
}

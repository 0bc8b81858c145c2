use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "authstack")]
#[command(version)]
#[command(about = "Provision the authentication backbone of an application", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub stack: StackArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the stack comes from and where it is deployed
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// Stack config file (TOML, or JSON by extension)
    #[arg(
        short,
        long,
        global = true,
        env = "AUTHSTACK_CONFIG",
        default_value = "authstack.toml"
    )]
    pub config: String,

    /// Account the stack is deployed into
    #[arg(long, global = true, env = "AUTHSTACK_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// Region the stack is deployed into
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Callback/logout URL for the OAuth client (repeatable, replaces the configured list)
    #[arg(long = "callback-url", value_name = "URL", global = true)]
    pub callback_urls: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the resolved plan without changing anything
    Plan,

    /// Provision the stack
    Apply(ApplyArgs),

    /// Tear the stack down in reverse dependency order
    Destroy {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the stack outputs from the recorded state
    Outputs {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Dry run - show what would be done
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "authstack",
            "--config",
            "stack.json",
            "--account-id",
            "111111111111",
            "--region",
            "us-east-1",
            "apply",
            "--dry-run",
            "--callback-url",
            "https://a.example.com",
            "--callback-url",
            "https://b.example.com",
        ])
        .unwrap();

        assert_eq!(cli.stack.config, "stack.json");
        assert_eq!(cli.stack.account_id.as_deref(), Some("111111111111"));
        assert_eq!(cli.stack.region.as_deref(), Some("us-east-1"));
        assert_eq!(cli.stack.callback_urls.len(), 2);
        match cli.command {
            Command::Apply(args) => {
                assert!(args.dry_run);
                assert!(!args.yes);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_parse_outputs_json() {
        let cli = Cli::try_parse_from(["authstack", "-vv", "outputs", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Outputs { json: true }));
    }
}

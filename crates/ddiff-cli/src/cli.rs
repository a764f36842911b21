use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ddiff",
    about = "Compare design tokens and component schemas between two versions",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML batch configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Fail when any file pair cannot be compared
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report renamed, deprecated, added, deleted, and updated tokens
    Tokens(InputArgs),
    /// Classify component schema changes as breaking or non-breaking
    Components(ComponentArgs),
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Original JSON file or directory of JSON files
    #[arg(long)]
    pub original: PathBuf,
    /// Updated JSON file or directory of JSON files
    #[arg(long)]
    pub updated: PathBuf,
}

#[derive(Args, Debug)]
pub struct ComponentArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Show only breaking changes
    #[arg(long)]
    pub breaking_only: bool,
    /// Exit with a non-zero status when breaking changes exist
    #[arg(long)]
    pub fail_on_breaking: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_tokens_command() {
        let cli = Cli::try_parse_from([
            "ddiff", "tokens", "--original", "old/", "--updated", "new/", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.strict);
        match cli.command {
            Command::Tokens(args) => {
                assert_eq!(args.original, PathBuf::from("old/"));
                assert_eq!(args.updated, PathBuf::from("new/"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_component_flags() {
        let cli = Cli::try_parse_from([
            "ddiff",
            "--strict",
            "components",
            "--original",
            "a.json",
            "--updated",
            "b.json",
            "--breaking-only",
            "--fail-on-breaking",
            "-v",
        ])
        .unwrap();
        assert!(cli.strict);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Text);
        match cli.command {
            Command::Components(args) => {
                assert!(args.breaking_only);
                assert!(args.fail_on_breaking);
                assert_eq!(args.input.original, PathBuf::from("a.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn inputs_are_required() {
        assert!(Cli::try_parse_from(["ddiff", "tokens", "--original", "a.json"]).is_err());
    }
}

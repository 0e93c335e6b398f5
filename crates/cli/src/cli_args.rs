//! Command-line argument parsing and validation.
//!
//! This module defines the command-line interface structure using the
//! `clap` crate.

use clap::Parser;

/// Command-line arguments for the cmdpad CLI tool.
///
/// This structure defines all available command-line options and arguments
/// that can be passed to the `cmdpad` binary.
///
/// # Examples
///
/// ```bash
/// # List every command in the library
/// cmdpad --list
///
/// # Run a command by ID, supplying variable values
/// cmdpad deploy -p environment=prod -p region=us-west-2
///
/// # Show the resolved command without executing it
/// cmdpad --dry-run deploy -p environment=prod
/// ```
#[derive(Parser, Debug)]
#[command(name = "cmdpad", term_width = 0)]
#[allow(clippy::struct_excessive_bools)] // silence clippy's warning on this struct
pub struct Args {
    /// Directory holding the per-domain command library files.
    ///
    /// If not provided, defaults to `~/.cmdpad`.
    #[arg(long, short = 'l')]
    pub library_dir: Option<String>,

    /// List the commands in the library, grouped by category, and exit.
    #[arg(long, action)]
    pub list: bool,

    /// Perform a dry run, which just prints out the resolved command but
    /// does not execute it.
    #[arg(long, short = 'd', action)]
    pub dry_run: bool,

    /// Run the command without first confirming, even when it is flagged
    /// as dangerous.
    #[arg(long, short = 'y', action)]
    pub yes: bool,

    /// Force background execution with lifecycle tracking, regardless of
    /// what the continuous-command heuristic decides.
    #[arg(long, short = 'b', action, conflicts_with = "foreground")]
    pub background: bool,

    /// Force synchronous execution, regardless of what the
    /// continuous-command heuristic decides.
    #[arg(long, short = 'F', action)]
    pub foreground: bool,

    /// Working directory for the spawned process. Supports `~` expansion.
    #[arg(long, short = 'w')]
    pub working_directory: Option<String>,

    /// The command ID to execute.
    #[arg(num_args(1))]
    pub command_id: Option<String>,

    /// Variable values for the command in the format name=value.
    ///
    /// Multiple values can be provided with repeated `-p` flags. Declared
    /// variables without a value here are prompted for interactively.
    #[arg(long = "param", short = 'p', action = clap::ArgAction::Append)]
    pub parameters: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_values() {
        let args = Args::parse_from(["cmdpad"]);

        assert!(args.library_dir.is_none());
        assert!(!args.list);
        assert!(!args.dry_run);
        assert!(!args.yes);
        assert!(!args.background);
        assert!(!args.foreground);
        assert!(args.command_id.is_none());
        assert!(args.parameters.is_empty());
    }

    #[test]
    fn test_args_command_with_parameters() {
        let args = Args::parse_from([
            "cmdpad",
            "deploy",
            "-p",
            "environment=prod",
            "-p",
            "region=us-west-2",
        ]);

        assert_eq!(args.command_id.as_deref(), Some("deploy"));
        assert_eq!(args.parameters, ["environment=prod", "region=us-west-2"]);
    }

    #[test]
    fn test_args_mode_flags_conflict() {
        let result = Args::try_parse_from(["cmdpad", "serve", "-b", "-F"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_flags() {
        let args = Args::parse_from(["cmdpad", "-y", "-d", "-w", "~/projects", "build"]);

        assert!(args.yes);
        assert!(args.dry_run);
        assert_eq!(args.working_directory.as_deref(), Some("~/projects"));
        assert_eq!(args.command_id.as_deref(), Some("build"));
    }
}

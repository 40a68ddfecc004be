//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pmdconf",
    version,
    about = "Per-project static-analysis rule configuration",
    long_about = "pmdconf — inspect and edit the analysis settings of a project: which rules apply, where rule-set files live, and how the project rule-set follows the global rule-set.\n\nConfiguration precedence: CLI > pmdconf.toml > defaults.",
    after_help = "Examples:\n  pmdconf show --project .\n  pmdconf set --stored-in-project true --ruleset-file 'rules/base.toml;rules/team.toml'\n  pmdconf sync --write\n  pmdconf merge rules/base.toml rules/team.toml --output json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(long, global = true, help = "Log level: error|warn|info|debug|trace (default: info)")]
    pub log: Option<String>,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current pmdconf version."
    )]
    Version,
    /// Show the effective properties of a project
    #[command(
        about = "Show project properties",
        long_about = "Load the project properties, reconcile the rule-set, and print the result. Nothing is written.",
        after_help = "Examples:\n  pmdconf show\n  pmdconf show --project ../app --output json"
    )]
    Show {
        #[arg(long, help = "Workspace root (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Project directory (default: current dir)")]
        project: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Change project properties and store them
    #[command(
        about = "Edit project properties",
        long_about = "Apply the given changes to the project properties and persist them to the project's properties file.",
        after_help = "Examples:\n  pmdconf set --enable --violations-as-errors false\n  pmdconf set --stored-in-project true --ruleset-file .ruleset"
    )]
    Set {
        #[arg(long, help = "Workspace root (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Project directory (default: current dir)")]
        project: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "disable", help = "Enable analysis for the project")]
        enable: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable analysis for the project")]
        disable: bool,
        #[arg(long, help = "Derive the rule-set from the project's rule-set files")]
        stored_in_project: Option<bool>,
        #[arg(long, help = "Rule-set file list, separated by ';' or ','")]
        ruleset_file: Option<String>,
        #[arg(long, help = "Include derived files in analysis")]
        include_derived: Option<bool>,
        #[arg(long, help = "Report violations as errors instead of warnings")]
        violations_as_errors: Option<bool>,
        #[arg(long, help = "Run analysis on full builds")]
        full_build: Option<bool>,
        #[arg(long, conflicts_with = "clear_working_set", help = "Restrict analysis to a named working set")]
        working_set: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Remove the working set restriction")]
        clear_working_set: bool,
    },
    /// Reconcile the project rule-set
    #[command(
        about = "Reconcile the project rule-set",
        long_about = "Re-merge rule-set files (file-backed projects) or synchronize with the global rule-set, and report the outcome. With --write the result is persisted.",
        after_help = "Examples:\n  pmdconf sync\n  pmdconf sync --write --output json"
    )]
    Sync {
        #[arg(long, help = "Workspace root (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Project directory (default: current dir)")]
        project: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Persist the reconciled properties")]
        write: bool,
    },
    /// Merge rule-set files
    #[command(
        about = "Merge rule-set files",
        long_about = "Merge the given rule-set files left to right (later definitions win by rule name) and print the effective rule-set.",
        after_help = "Examples:\n  pmdconf merge rules/base.toml rules/team.toml"
    )]
    Merge {
        #[arg(long, help = "Workspace root (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(required = true, help = "Rule-set files, in precedence order")]
        files: Vec<String>,
    },
}

// studiolog - main.rs
//
// Thin CLI over the analysis engine, for interactive inspection of a
// Studio session log. Every subcommand maps 1:1 onto a core operation and
// prints its result shape as JSON; all logic lives in the library.

use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use studiolog::core::context::ContextIndex;
use studiolog::core::model::RunContext;
use studiolog::core::retrieve::{self, LogQuery};
use studiolog::core::search;
use studiolog::core::triage::{self, ErrorScan};
use studiolog::util;
use studiolog::util::constants::{DEFAULT_MAX_ERROR_DETAILS, DEFAULT_RECENT_LIMIT};

/// studiolog - read-only analysis of Roblox Studio session logs.
///
/// Point studiolog at a session log to page through script output, search
/// it, or summarise error conditions. The file is never written to and may
/// keep growing while commands run.
#[derive(Parser, Debug)]
#[command(name = "studiolog", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContextArg {
    Play,
    Edit,
    Unknown,
}

impl From<ContextArg> for RunContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Play => RunContext::Play,
            ContextArg::Edit => RunContext::Edit,
            ContextArg::Unknown => RunContext::Unknown,
        }
    }
}

/// Filter flags shared by the retrieval-shaped subcommands.
#[derive(clap::Args, Debug)]
struct FilterArgs {
    /// Only these categories (repeatable). Default: FLog::Output.
    /// Pass --all-categories to disable category filtering.
    #[arg(short = 'c', long = "category")]
    categories: Vec<String>,

    /// Disable category filtering entirely.
    #[arg(long)]
    all_categories: bool,

    /// Only entries with this level token, case-insensitively
    /// (e.g. Warning, Error).
    #[arg(short = 'l', long)]
    level: Option<String>,

    /// Keep internal Studio chatter instead of applying the noise denylist.
    #[arg(long)]
    no_noise_filter: bool,

    /// Inclusive start of the date range (timestamp or date).
    #[arg(long)]
    since: Option<String>,

    /// Inclusive end of the date range (a bare date covers the whole day).
    #[arg(long)]
    until: Option<String>,

    /// Only entries from this execution mode.
    #[arg(long, value_enum)]
    context: Option<ContextArg>,

    /// Prefix each line with its run-context tag.
    #[arg(long)]
    context_tags: bool,

    /// Prefix each line with a seconds-truncated timestamp.
    #[arg(short = 't', long)]
    timestamps: bool,
}

impl FilterArgs {
    fn into_query(self, after_line: Option<u64>, before_line: Option<u64>) -> LogQuery {
        let categories = if self.all_categories {
            Some(HashSet::new())
        } else if self.categories.is_empty() {
            None
        } else {
            Some(self.categories.into_iter().collect())
        };
        LogQuery {
            after_line,
            before_line,
            categories,
            level: self.level,
            filter_noise: !self.no_noise_filter,
            start_time: self.since,
            end_time: self.until,
            context: self.context.map(RunContext::from),
            context_tags: self.context_tags,
            timestamps: self.timestamps,
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Page through filtered log output by line range.
    Get {
        /// Path to the session log file.
        path: PathBuf,

        /// Resume after this line (the previous call's last_line).
        #[arg(long)]
        after_line: Option<u64>,

        /// Stop before this line.
        #[arg(long)]
        before_line: Option<u64>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// The most recent N matching entries, oldest-first.
    Recent {
        path: PathBuf,

        /// Maximum entries returned.
        #[arg(short = 'n', long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Search messages with a case-insensitive regex.
    Search {
        path: PathBuf,

        /// Pattern matched against each entry's message.
        pattern: String,

        #[arg(long)]
        after_line: Option<u64>,

        #[arg(long)]
        before_line: Option<u64>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Summarise error conditions in the log.
    Errors {
        path: PathBuf,

        #[arg(long)]
        after_line: Option<u64>,

        #[arg(long)]
        before_line: Option<u64>,

        /// Only errors from this execution mode.
        #[arg(long, value_enum)]
        context: Option<ContextArg>,

        /// Cap on detail records (the total count is unbounded).
        #[arg(long, default_value_t = DEFAULT_MAX_ERROR_DETAILS)]
        max_details: usize,
    },

    /// Show the execution-mode interval partition of the file.
    Context { path: PathBuf },
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialise result");
            eprintln!("Error: failed to serialise result: {e}");
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    util::logging::init(cli.debug);

    match cli.command {
        Command::Get {
            path,
            after_line,
            before_line,
            filters,
        } => {
            let query = filters.into_query(after_line, before_line);
            print_json(&retrieve::get_log_window(&path, &query));
        }
        Command::Recent {
            path,
            limit,
            filters,
        } => {
            let query = filters.into_query(None, None);
            print_json(&retrieve::get_recent_entries(&path, limit, &query));
        }
        Command::Search {
            path,
            pattern,
            after_line,
            before_line,
            filters,
        } => {
            let query = filters.into_query(after_line, before_line);
            match search::search_log_window(&path, &pattern, &query) {
                Ok(result) => print_json(&result),
                Err(e) => {
                    // Invalid pattern: explicit error shape, no scan ran.
                    print_json(&serde_json::json!({ "error": e.to_string() }));
                    return ExitCode::FAILURE;
                }
            }
        }
        Command::Errors {
            path,
            after_line,
            before_line,
            context,
            max_details,
        } => {
            let scan = ErrorScan {
                after_line,
                before_line,
                context: context.map(RunContext::from),
                max_details,
            };
            print_json(&triage::collect_errors(&path, &scan));
        }
        Command::Context { path } => {
            let index = ContextIndex::build(&path);
            print_json(&index.ranges());
        }
    }
    ExitCode::SUCCESS
}

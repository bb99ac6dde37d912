use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rexplay_core::{EvalConfig, EvalRequest, Supervisor, capture_fragments, scan_groups};

mod logger;

#[derive(Parser)]
#[command(name = "rexplay")]
#[command(about = "Rexplay - an interruptible regex tester with source-mapped groups")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a pattern against a text
    Eval {
        /// The regex pattern
        pattern: String,
        /// The subject text
        text: String,
        /// Substitution template using $1-style backreferences
        #[arg(short, long)]
        replace: Option<String>,
        /// Deadline in milliseconds before the evaluation is aborted
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show the capturing-group fragments of a pattern
    Groups {
        /// The regex pattern
        pattern: String,
        /// Also show non-capturing constructs
        #[arg(short, long)]
        all: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if logger::Logger::init().is_err() {
        eprintln!("{}", "failed to install logger".red());
    }
    log::set_max_level(match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    });

    match cli.command {
        Commands::Eval {
            pattern,
            text,
            replace,
            timeout,
        } => cmd_eval(&pattern, &text, replace, timeout),
        Commands::Groups { pattern, all } => cmd_groups(&pattern, all),
    }
}

fn cmd_eval(pattern: &str, text: &str, replace: Option<String>, timeout: Option<u64>) {
    println!("{}", "Evaluating...".bold());
    println!("  Pattern: {}", pattern.cyan());
    println!("  Text:    {}", text.yellow());
    println!();

    let mut config = EvalConfig::default();
    if let Some(ms) = timeout {
        config.deadline = Duration::from_millis(ms);
    }

    let mut request = EvalRequest::new(text, pattern);
    if let Some(template) = replace {
        request = request.with_replacement(template);
    }

    let result = Supervisor::new(config).evaluate(request);

    if let Some(error) = &result.error {
        eprintln!("{} {}", "Error:".red().bold(), error);
        std::process::exit(1);
    }

    if result.matched_whole {
        println!("{}", "✓ Whole text matched".green().bold());
    } else if result.spans.is_empty() {
        println!("{}", "✗ No match".red());
    } else {
        println!(
            "{} {}",
            "Found".bold(),
            format!("{} span(s)", result.spans.len()).green()
        );
    }

    if !result.spans.is_empty() {
        println!();
        for (i, span) in result.spans.iter().enumerate() {
            println!(
                "  [{}] {} {}..{} = {}",
                i + 1,
                span.descriptor.label.cyan(),
                span.start,
                span.end,
                result.text[span.start..span.end].green()
            );
        }
    }

    if let Some(replaced) = &result.replaced {
        println!();
        println!("{}", "Replaced:".bold());
        println!("  {}", replaced.green());
    }
}

fn cmd_groups(pattern: &str, all: bool) {
    let groups = if all {
        scan_groups(pattern)
    } else {
        capture_fragments(pattern)
    };

    if groups.is_empty() {
        println!("{}", "No capturing groups".red());
        return;
    }

    println!(
        "{} {}",
        "Found".bold(),
        format!("{} group(s)", groups.len()).green()
    );
    println!();

    for (i, group) in groups.iter().enumerate() {
        let marker = if group.capturing {
            "capturing".green()
        } else {
            "non-capturing".yellow()
        };
        println!(
            "  [{}] {} {}..{} ({})",
            i + 1,
            group.label.cyan(),
            group.span.start,
            group.span.end,
            marker
        );
    }
}

//! md-normalize CLI
//!
//! With no arguments, normalizes the current directory using the built-in
//! rules. Any error stops the run and exits with status 1.

use clap::{Parser, Subcommand, ValueEnum};
use md_normalize::{
    NormalizeConfig, NormalizeResult, Normalizer, OutputFormat, ReportFormatter, ReportOptions,
};
use std::path::{Path, PathBuf};
use std::process;

/// md-normalize - fix list indentation and escaped asterisks in converted markdown
#[derive(Parser)]
#[command(name = "md-normalize")]
#[command(version)]
#[command(about = "Normalize converted markdown files in place")]
#[command(long_about = "Walks ROOT/category/subfolder/ and rewrites every matching file in place, applying an ordered list of literal substitutions. Without a configuration file the built-in ordered-list and escaped-asterisk rules are used.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run options used when no subcommand is given
    #[command(flatten)]
    run: RunArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite target files in place (default)
    Run(RunArgs),

    /// List the effective substitution rules in application order
    Rules {
        /// Include disabled rules
        #[arg(long)]
        all: bool,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Root directory to walk (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,

    /// Visit entries sorted by name instead of listing order
    #[arg(long)]
    sorted: bool,

    /// List unchanged files too
    #[arg(long)]
    show_unchanged: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormatArg,
}

#[derive(Copy, Clone, Default, ValueEnum, PartialEq)]
enum OutputFormatArg {
    #[default]
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run_command(cli) {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_command(cli: Cli) -> NormalizeResult<i32> {
    match cli.command {
        Some(Commands::Run(args)) => run_normalize(cli.config.as_deref(), args, !cli.no_color),
        None => run_normalize(cli.config.as_deref(), cli.run, !cli.no_color),
        Some(Commands::Rules { all }) => run_list_rules(cli.config.as_deref(), all),
        Some(Commands::ValidateConfig { config_file }) => {
            run_validate_config(config_file.or(cli.config))
        }
    }
}

fn load_config(config_path: Option<&Path>) -> NormalizeResult<NormalizeConfig> {
    NormalizeConfig::discover(config_path, ".")
}

fn run_normalize(config_path: Option<&Path>, args: RunArgs, use_colors: bool) -> NormalizeResult<i32> {
    let config = load_config(config_path)?;

    let normalizer = Normalizer::new_with_config(config)?
        .with_dry_run(args.dry_run)
        .with_sorted_entries(args.sorted);

    let root = args.root.unwrap_or_else(|| PathBuf::from("."));
    let report = normalizer.run(&root)?;

    let formatter = ReportFormatter::new(ReportOptions {
        use_colors,
        show_unchanged: args.show_unchanged,
        ..Default::default()
    });
    formatter.write_report(&report, args.format.into(), std::io::stdout().lock())?;

    Ok(0)
}

fn run_list_rules(config_path: Option<&Path>, all: bool) -> NormalizeResult<i32> {
    let config = load_config(config_path)?;

    println!("Target extension: .{}\n", config.walker.extension);

    for (index, rule) in config.rules.iter().enumerate() {
        if !all && !rule.enabled {
            continue;
        }

        let status = if rule.enabled { "on " } else { "off" };
        println!(
            "{:>3}. [{}] {} ({}): {:?} -> {:?}",
            index + 1,
            status,
            rule.id,
            rule.kind.as_str(),
            rule.find,
            rule.replace
        );
    }

    Ok(0)
}

fn run_validate_config(config_path: Option<PathBuf>) -> NormalizeResult<i32> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("md_normalize.yaml"));

    println!("Validating configuration: {}", config_path.display());

    match NormalizeConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  Extension: .{}", config.walker.extension);
            println!(
                "  Rules: {} total, {} enabled",
                config.rules.len(),
                config.enabled_rules().count()
            );
            println!("  Ignored categories: {}", config.walker.ignored_categories.len());
            Ok(0)
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {}", e);
            Ok(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

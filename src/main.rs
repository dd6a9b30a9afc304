//! convcheck CLI - Naming Convention Checker

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use convcheck::checks::SourceCheck;
use convcheck::config::{ColorMode, Config, ConfigError, OutputFormat};
use convcheck::engine::Engine;
use convcheck::output::formatter_for;
use convcheck::{Rule, Severity};
use std::path::{Path, PathBuf};

/// Exit code for configuration and usage errors
const EXIT_CONFIG_ERROR: i32 = 3;

#[derive(Parser)]
#[command(
    name = "convcheck",
    version,
    about = "Naming convention checker",
    long_about = "Checks a TypeScript source tree against naming conventions and reports violations."
)]
struct Cli {
    /// Files or directories to check (default: current directory)
    paths: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rule file replacing the built-in naming rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Additional exclude patterns (comma-separated globs)
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// File extensions to scan (comma-separated, without dot)
    #[arg(long, value_delimiter = ',')]
    ext: Option<Vec<String>>,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Only enable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// Minimum severity to report
    #[arg(long, value_enum)]
    min_severity: Option<MinSeverity>,

    /// Include passing verdicts in the output
    #[arg(long)]
    show_passed: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Exit with 0 even if violations are found
    #[arg(long)]
    exit_zero: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detailed information about a rule
    Explain {
        /// Rule ID to explain
        rule_id: String,
    },
    /// Initialize a configuration file
    Init {
        /// Preset to use (recommended, strict, minimal)
        #[arg(long, default_value = "recommended")]
        preset: String,

        /// Output format (yaml, json)
        #[arg(long, default_value = "yaml")]
        output_format: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Markdown,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Markdown => OutputFormat::Markdown,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MinSeverity {
    Info,
    Warning,
    Error,
}

impl From<MinSeverity> for Severity {
    fn from(min: MinSeverity) -> Self {
        match min {
            MinSeverity::Info => Severity::Info,
            MinSeverity::Warning => Severity::Warning,
            MinSeverity::Error => Severity::Error,
        }
    }
}

fn severity_str(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".red(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".blue(),
    }
}

/// Helper function to print a rule in a consistent format
fn print_rule(rule: &Rule, active: bool) {
    println!(
        "    {} [{}] ({}){}",
        rule.id.cyan(),
        severity_str(rule.severity),
        rule.kind,
        if active { "".normal() } else { " [off]".dimmed() }
    );
    println!("      {}", rule.expectation());
    if !rule.tags.is_empty() {
        println!("      Tags: {}", rule.tags.join(", "));
    }
}

fn print_check(check: &dyn SourceCheck, active: bool) {
    println!(
        "    {} [{}] ({}){}",
        check.id().cyan(),
        severity_str(check.severity()),
        check.category(),
        if active { "".normal() } else { " [off]".dimmed() }
    );
    println!("      {}", check.description());
}

fn list_rules(engine: &Engine) {
    let active_rules: Vec<&str> = engine.active_rules().map(|r| r.id.as_str()).collect();
    let active_checks: Vec<&str> = engine.active_checks().map(|c| c.id()).collect();

    println!("{}", "Available rules:".bold());
    println!();
    println!(
        "  {} ({} rules):",
        "Naming".cyan(),
        engine.registry().len()
    );
    for rule in engine.registry().rules() {
        print_rule(rule, active_rules.contains(&rule.id.as_str()));
    }
    println!();
    println!("  {} ({} checks):", "Source checks".cyan(), engine.checks().len());
    for check in engine.checks() {
        print_check(check.as_ref(), active_checks.contains(&check.id()));
    }
}

/// Print detailed rule explanation
fn explain_rule(rule: &Rule) {
    println!("{}", "Rule Details".bold());
    println!();
    println!("  {}: {}", "ID".bold(), rule.id.cyan());
    println!("  {}: {}", "Applies to".bold(), rule.kind);
    println!(
        "  {}: {} (e.g. {})",
        "Expects".bold(),
        rule.expectation(),
        rule.casing.example()
    );
    println!("  {}: {}", "Severity".bold(), severity_str(rule.severity));
    println!("  {}: {}", "Category".bold(), rule.category);

    if let Some(desc) = &rule.description {
        println!();
        println!("  {}", "Description".bold());
        println!("  {}", desc);
    }

    if let Some(rationale) = &rule.rationale {
        println!();
        println!("  {}", "Rationale".bold());
        println!("  {}", rationale);
    }

    if let Some(bad) = &rule.example_bad {
        println!();
        println!("  {} {}", "Example".bold(), "(incorrect)".red());
        for line in bad.lines() {
            println!("    {}", line);
        }
    }

    if let Some(good) = &rule.example_good {
        println!();
        println!("  {} {}", "Example".bold(), "(correct)".green());
        for line in good.lines() {
            println!("    {}", line);
        }
    }

    if !rule.tags.is_empty() {
        println!();
        println!("  {}: {}", "Tags".bold(), rule.tags.join(", "));
    }
}

fn explain_check(check: &dyn SourceCheck) {
    println!("{}", "Rule Details".bold());
    println!();
    println!("  {}: {}", "ID".bold(), check.id().cyan());
    println!("  {}: {}", "Severity".bold(), severity_str(check.severity()));
    println!("  {}: {}", "Category".bold(), check.category());
    println!();
    println!("  {}", "Description".bold());
    println!("  {}", check.description());
}

/// Handle the explain command
fn handle_explain(engine: &Engine, rule_id: &str) -> anyhow::Result<i32> {
    if let Some(rule) = engine.registry().get(rule_id) {
        explain_rule(rule);
        return Ok(0);
    }
    if let Some(check) = engine.checks().iter().find(|c| c.id() == rule_id) {
        explain_check(check.as_ref());
        return Ok(0);
    }

    eprintln!("{}: Rule '{}' not found", "error".red().bold(), rule_id);
    eprintln!();
    eprintln!("Use {} to see all available rules", "--list-rules".cyan());
    Ok(1)
}

/// Handle the init command
fn handle_init(preset: &str, output_format: &str) -> anyhow::Result<i32> {
    let Some(config) = Config::preset(preset) else {
        bail!(ConfigError::Invalid(format!(
            "Unknown preset '{}'. Available: recommended, strict, minimal",
            preset
        )));
    };

    let filename = match output_format {
        "json" => ".convcheckrc.json",
        "yaml" | "yml" => ".convcheckrc.yaml",
        other => bail!(ConfigError::Invalid(format!(
            "Unknown output format '{}'. Available: yaml, json",
            other
        ))),
    };

    if Path::new(filename).exists() {
        eprintln!(
            "{}: {} already exists. Remove it first to reinitialize.",
            "error".red().bold(),
            filename
        );
        return Ok(1);
    }

    let content = if filename.ends_with(".json") {
        serde_json::to_string_pretty(&config)?
    } else {
        format!(
            "# convcheck configuration\n# Generated with: convcheck init --preset {}\n\n{}",
            preset,
            serde_yaml::to_string(&config)?
        )
    };
    std::fs::write(filename, content).with_context(|| format!("Failed to write {}", filename))?;

    println!("{} Created {}", "success".green().bold(), filename);
    println!();
    println!("Next steps:");
    println!("  1. Review and customize the configuration");
    println!("  2. Run {} to check your project", "convcheck src".cyan());
    Ok(0)
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default().context("Failed to load config")?,
    };

    config.merge_cli(
        cli.format.map(OutputFormat::from),
        cli.verbose.then_some(true),
        cli.disable.clone(),
        cli.select.clone(),
        cli.exclude.clone(),
    );
    if let Some(ext) = &cli.ext {
        config.files.extensions = ext
            .iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
    }
    if let Some(rules) = &cli.rules {
        config.rules.file = Some(rules.clone());
    }
    if cli.show_passed {
        config.output.show_passed = true;
    }
    if cli.no_color {
        config.output.color = ColorMode::Never;
    }

    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    if let Some(Commands::Init {
        preset,
        output_format,
    }) = &cli.command
    {
        return handle_init(preset, output_format);
    }

    let config = load_config(&cli)?;
    match config.output.color {
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Auto => {}
    }

    let mut engine = Engine::from_config(config)?;
    if let Some(min) = cli.min_severity {
        engine = engine.with_min_severity(min.into());
    }

    if let Some(Commands::Explain { rule_id }) = &cli.command {
        return handle_explain(&engine, rule_id);
    }

    if cli.list_rules {
        list_rules(&engine);
        return Ok(0);
    }

    let paths = if cli.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.paths.clone()
    };

    let report = engine.run_all(&paths)?;
    let formatter = formatter_for(&engine.config().output);
    print!("{}", formatter.format(&report));

    Ok(if cli.exit_zero { 0 } else { report.exit_code() })
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            if e.downcast_ref::<ConfigError>().is_some() {
                EXIT_CONFIG_ERROR
            } else {
                1
            }
        }
    };
    std::process::exit(exit_code);
}

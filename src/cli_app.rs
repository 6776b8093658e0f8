//! Top-level CLI definition and dispatch.

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use mso_risk::assessment::risk::{ModeRisk, RiskAssessor};
use mso_risk::assessment::sweep::{SweepPlan, SweepReport, SweepRunner};
use mso_risk::core::config::Config;
use mso_risk::core::errors::RiskError;
use mso_risk::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};
use mso_risk::logger::open_activity_log;
use mso_risk::model::document::ModelDocument;
use mso_risk::model::presets::reference_vessel;
use mso_risk::model::risk_model::RiskModel;

/// Machinery mode risk assessment for grounding scenarios.
#[derive(Debug, Parser)]
#[command(
    name = "msor",
    author,
    version,
    about = "Machinery mode selection by grounding risk",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override run config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Sweep a TTG range and report the risk-minimizing mode per sample.
    Sweep(SweepArgs),
    /// Select the risk-minimizing mode at one TTG.
    Select(SelectArgs),
    /// Break down the risk of one mode at one TTG.
    Evaluate(EvaluateArgs),
    /// Load and validate a model document.
    Validate(ValidateArgs),
    /// Emit the reference vessel model document.
    Preset(PresetArgs),
    /// Inspect the run configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct SweepArgs {
    /// Model document (falls back to `paths.model_file`).
    #[arg(value_name = "MODEL")]
    model: Option<PathBuf>,
    /// First TTG sample in seconds.
    #[arg(long, value_name = "SECONDS")]
    start: Option<f64>,
    /// Last TTG sample in seconds (inclusive).
    #[arg(long, value_name = "SECONDS")]
    end: Option<f64>,
    /// Number of evenly spaced samples.
    #[arg(long, value_name = "N")]
    samples: Option<usize>,
    /// Worker threads.
    #[arg(long, value_name = "N")]
    parallelism: Option<usize>,
    /// Also write the series as CSV.
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct SelectArgs {
    #[arg(value_name = "MODEL")]
    model: Option<PathBuf>,
    /// Time to grounding in seconds.
    #[arg(long, value_name = "SECONDS")]
    ttg: f64,
}

#[derive(Debug, Clone, Args)]
struct EvaluateArgs {
    #[arg(value_name = "MODEL")]
    model: Option<PathBuf>,
    /// Time to grounding in seconds.
    #[arg(long, value_name = "SECONDS")]
    ttg: f64,
    /// Machinery mode name.
    #[arg(long, value_name = "NAME")]
    mode: String,
}

#[derive(Debug, Clone, Args, Default)]
struct ValidateArgs {
    #[arg(value_name = "MODEL")]
    model: Option<PathBuf>,
}

#[derive(Debug, Clone, Args, Default)]
struct PresetArgs {
    /// Write the document here instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure, including configuration load.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<RiskError> for CliError {
    fn from(err: RiskError) -> Self {
        match err {
            RiskError::UnknownMode { .. } | RiskError::InvalidTtg { .. } => {
                Self::User(err.to_string())
            }
            RiskError::InvalidProbability { .. }
            | RiskError::Serialization { .. }
            | RiskError::ChannelClosed { .. } => Self::Internal(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Sweep(args) => run_sweep(cli, args),
        Command::Select(args) => run_select(cli, args),
        Command::Evaluate(args) => run_evaluate(cli, args),
        Command::Validate(args) => run_validate(cli, args),
        Command::Preset(args) => run_preset(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Model loading
// ---------------------------------------------------------------------------

/// A validated model plus where it came from.
struct LoadedModel {
    path: PathBuf,
    fingerprint: String,
    model: RiskModel,
}

struct Session {
    config: Config,
    log: Option<JsonlWriter>,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self, CliError> {
        let config = Config::load(cli.config.as_deref())?;
        let log = open_activity_log(&config);
        Ok(Self { config, log })
    }

    fn record(&mut self, entry: &LogEntry) {
        if let Some(log) = self.log.as_mut() {
            log.write_entry(entry);
        }
    }

    fn model_path(&self, explicit: Option<&Path>) -> Result<PathBuf, CliError> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.config.paths.model_file.clone())
            .ok_or_else(|| {
                CliError::User(
                    "no model document given (pass MODEL or set paths.model_file)".to_string(),
                )
            })
    }

    /// Load, validate, and fingerprint a model document; every outcome is logged.
    fn load_model(&mut self, cli: &Cli, explicit: Option<&Path>) -> Result<LoadedModel, CliError> {
        let path = self.model_path(explicit)?;
        let loaded = ModelDocument::load(&path).and_then(|doc| {
            let fingerprint = doc.fingerprint()?;
            let model = doc.to_model(self.config.risk.scale)?;
            Ok((fingerprint, model))
        });

        let (fingerprint, model) = match loaded {
            Ok(pair) => pair,
            Err(err) => {
                let mut entry = LogEntry::failure(EventType::ModelInvalid, &err);
                entry.model = Some(path.display().to_string());
                self.record(&entry);
                return Err(CliError::Runtime(format!(
                    "failed to load model {}: {err}",
                    path.display()
                )));
            }
        };

        let mut entry = LogEntry::new(EventType::ModelLoad, Severity::Info);
        entry.model = Some(path.display().to_string());
        entry.fingerprint = Some(fingerprint.clone());
        entry.ok = Some(true);
        self.record(&entry);

        for mode in model.modes().iter().filter(|m| m.chains().is_empty()) {
            let mut warning = LogEntry::new(EventType::ModelLoad, Severity::Warning);
            warning.model = Some(path.display().to_string());
            warning.mode = Some(mode.name().to_string());
            warning.details = Some("mode has no recovery chains".to_string());
            self.record(&warning);
            if !cli.quiet {
                eprintln!(
                    "{} mode {} has no recovery chains; recovery will always fail",
                    "warning:".yellow(),
                    mode.name()
                );
            }
        }

        if cli.verbose {
            eprintln!(
                "loaded {} ({} engines, {} modes, scale {})",
                path.display(),
                model.engines().len(),
                model.modes().len(),
                model.scale()
            );
        }

        Ok(LoadedModel {
            path,
            fingerprint,
            model,
        })
    }
}

// ---------------------------------------------------------------------------
// sweep
// ---------------------------------------------------------------------------

fn run_sweep(cli: &Cli, args: &SweepArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli)?;
    let loaded = session.load_model(cli, args.model.as_deref())?;

    let defaults = &session.config.sweep;
    let plan = SweepPlan::new(
        args.start.unwrap_or(defaults.start_ttg),
        args.end.unwrap_or(defaults.end_ttg),
        args.samples.unwrap_or(defaults.samples),
    )
    .map_err(|e| CliError::User(e.to_string()))?;
    let parallelism = args.parallelism.unwrap_or(defaults.parallelism);
    if parallelism == 0 {
        return Err(CliError::User("--parallelism must be >= 1".to_string()));
    }

    let model_label = loaded.path.display().to_string();
    let mut start = LogEntry::new(EventType::SweepStart, Severity::Info);
    start.model = Some(model_label.clone());
    start.fingerprint = Some(loaded.fingerprint.clone());
    start.samples = Some(plan.len());
    session.record(&start);

    let started = Instant::now();
    let runner = SweepRunner::new(Arc::new(loaded.model), parallelism);
    let report = match runner.run(&plan) {
        Ok(report) => report,
        Err(err) => {
            let mut entry = LogEntry::failure(EventType::SampleFailed, &err);
            entry.model = Some(model_label);
            session.record(&entry);
            return Err(err.into());
        }
    };
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut done = LogEntry::new(EventType::SweepComplete, Severity::Info);
    done.model = Some(model_label.clone());
    done.samples = Some(report.points.len());
    done.total_risk = Some(report.total_risk);
    done.duration_ms = Some(duration_ms);
    done.ok = Some(true);
    session.record(&done);

    if let Some(csv) = &args.csv {
        write_csv(csv, &report)?;
        if cli.verbose {
            eprintln!("wrote {}", csv.display());
        }
    }

    match output_mode(cli) {
        OutputMode::Human => {
            println!("{}", format!("Sweep of {model_label}").bold());
            println!("  {:>12}  {:<16}  {:>16}", "TTG [s]", "Mode", "Risk");
            for point in &report.points {
                println!(
                    "  {:>12.3}  {:<16}  {:>16.6e}",
                    point.ttg, point.mode, point.total_risk
                );
            }
            println!("Total risk: {:.6e}", report.total_risk);
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "sweep",
                "model": model_label,
                "fingerprint": loaded.fingerprint,
                "plan": plan,
                "points": report.points,
                "total_risk": report.total_risk,
                "duration_ms": duration_ms,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn write_csv(path: &Path, report: &SweepReport) -> Result<(), CliError> {
    let file = File::create(path)
        .map_err(|e| CliError::Runtime(format!("create {}: {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "ttg,mode,total_risk")?;
    for point in &report.points {
        writeln!(
            out,
            "{},{},{}",
            point.ttg,
            csv_field(&point.mode),
            point.total_risk
        )?;
    }
    out.flush()?;
    Ok(())
}

/// RFC 4180 quoting for free-form text fields.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

// ---------------------------------------------------------------------------
// select / evaluate
// ---------------------------------------------------------------------------

fn run_select(cli: &Cli, args: &SelectArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli)?;
    let loaded = session.load_model(cli, args.model.as_deref())?;
    let selection = RiskAssessor::new(&loaded.model).select_mode_detailed(args.ttg)?;

    let mut entry = LogEntry::new(EventType::Selection, Severity::Info);
    entry.model = Some(loaded.path.display().to_string());
    entry.ttg = Some(args.ttg);
    entry.mode = Some(selection.mode.clone());
    entry.risk = Some(selection.total_risk);
    entry.ok = Some(true);
    session.record(&entry);

    match output_mode(cli) {
        OutputMode::Human => {
            println!(
                "Selected mode at TTG {} s: {} (risk {:.6e})",
                args.ttg,
                selection.mode.bold().green(),
                selection.total_risk
            );
            for candidate in &selection.candidates {
                print_breakdown(candidate, candidate.mode == selection.mode);
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "select",
                "model": loaded.path.to_string_lossy(),
                "ttg": args.ttg,
                "mode": selection.mode,
                "total_risk": selection.total_risk,
                "candidates": selection.candidates,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_evaluate(cli: &Cli, args: &EvaluateArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli)?;
    let loaded = session.load_model(cli, args.model.as_deref())?;
    let risk = RiskAssessor::new(&loaded.model).assess(args.ttg, &args.mode)?;

    match output_mode(cli) {
        OutputMode::Human => print_breakdown(&risk, false),
        OutputMode::Json => {
            let payload = json!({
                "command": "evaluate",
                "model": loaded.path.to_string_lossy(),
                "result": risk,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn print_breakdown(risk: &ModeRisk, selected: bool) {
    let marker = if selected { "*" } else { " " };
    println!("{marker} {} @ {} s", risk.mode.bold(), risk.ttg);
    println!("    failure probability:          {:.6e}", risk.failure_probability);
    println!(
        "    recovery failure probability: {:.6}",
        risk.recovery_failure_probability
    );
    println!("    grounding probability:        {:.6e}", risk.grounding_probability);
    println!("    total risk:                   {:.6e}", risk.total_risk);
}

// ---------------------------------------------------------------------------
// validate / preset
// ---------------------------------------------------------------------------

fn run_validate(cli: &Cli, args: &ValidateArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli)?;
    let loaded = match session.load_model(cli, args.model.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => {
            // Human mode leaves the report to the caller's single error line.
            if output_mode(cli) == OutputMode::Json {
                write_json_line(&json!({
                    "command": "validate",
                    "valid": false,
                    "error": err.to_string(),
                }))?;
            }
            return Err(err);
        }
    };

    let model = &loaded.model;
    match output_mode(cli) {
        OutputMode::Human => {
            println!("Model is {}.", "valid".green());
            println!("  Source: {}", loaded.path.display());
            println!("  Fingerprint: {}", loaded.fingerprint);
            println!(
                "  Engines: {}",
                model
                    .engines()
                    .iter()
                    .map(|e| e.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            for mode in model.modes() {
                println!("  Mode {}: {} chain(s)", mode.name(), mode.chains().len());
            }
            println!("  Cost sum: {}", model.costs().total());
        }
        OutputMode::Json => {
            let modes: Vec<Value> = model
                .modes()
                .iter()
                .map(|m| json!({ "name": m.name(), "chains": m.chains().len() }))
                .collect();
            let engines: Vec<&str> = model.engines().iter().map(|e| e.name.as_str()).collect();
            let payload = json!({
                "command": "validate",
                "valid": true,
                "model": loaded.path.to_string_lossy(),
                "fingerprint": loaded.fingerprint,
                "engines": engines,
                "modes": modes,
                "cost_total": model.costs().total(),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_preset(cli: &Cli, args: &PresetArgs) -> Result<(), CliError> {
    let document = reference_vessel();
    match &args.output {
        Some(path) => {
            document.save(path)?;
            if !cli.quiet {
                eprintln!("wrote reference vessel model to {}", path.display());
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", document.to_json_pretty()?)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Internal(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config.stable_hash()?;
                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                if output_mode(cli) == OutputMode::Json {
                    let payload = json!({
                        "command": "config validate",
                        "valid": false,
                        "error": e.to_string(),
                    });
                    write_json_line(&payload)?;
                }
                Err(CliError::Runtime(format!("invalid config: {e}")))
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("MSO_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mso_risk::assessment::sweep::SamplePoint;

    #[test]
    fn parses_global_flags_before_and_after_subcommand() {
        let before = Cli::try_parse_from([
            "msor",
            "--config",
            "/tmp/msor.toml",
            "--json",
            "--no-color",
            "-v",
            "validate",
            "vessel.json",
        ]);
        assert!(before.is_ok());

        let after = Cli::try_parse_from(["msor", "validate", "vessel.json", "--json", "-q"]);
        assert!(after.is_ok());
    }

    #[test]
    fn parses_all_subcommands() {
        let cases = [
            vec!["msor", "sweep", "vessel.json"],
            vec![
                "msor", "sweep", "vessel.json", "--start", "10", "--end", "500", "--samples",
                "25", "--parallelism", "2", "--csv", "out.csv",
            ],
            vec!["msor", "sweep"],
            vec!["msor", "select", "vessel.json", "--ttg", "120"],
            vec!["msor", "evaluate", "vessel.json", "--ttg", "120", "--mode", "PTI"],
            vec!["msor", "validate", "vessel.json"],
            vec!["msor", "preset"],
            vec!["msor", "preset", "--output", "vessel.json"],
            vec!["msor", "config"],
            vec!["msor", "config", "path"],
            vec!["msor", "config", "show"],
            vec!["msor", "config", "validate"],
        ];

        for case in cases {
            let parsed = Cli::try_parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse case: {case:?}");
        }
    }

    #[test]
    fn select_and_evaluate_require_ttg() {
        assert!(Cli::try_parse_from(["msor", "select", "vessel.json"]).is_err());
        assert!(Cli::try_parse_from(["msor", "evaluate", "vessel.json", "--ttg", "5"]).is_err());
        assert!(Cli::try_parse_from(["msor", "select", "vessel.json", "--ttg", "abc"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["msor", "-v", "-q", "preset"]).is_err());
    }

    #[test]
    fn completions_support_bash_zsh_and_fish() {
        for shell in ["bash", "zsh", "fish"] {
            let parsed = Cli::try_parse_from(["msor", "completions", shell]);
            assert!(parsed.is_ok(), "failed shell parse for {shell}");
        }
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(
            resolve_output_mode(true, Some("human"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some("json"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some(" Human "), false),
            OutputMode::Human
        );
        assert_eq!(
            resolve_output_mode(false, Some("auto"), true),
            OutputMode::Human
        );
        assert_eq!(resolve_output_mode(false, None, false), OutputMode::Json);
    }

    #[test]
    fn risk_errors_map_to_exit_codes() {
        let user: CliError = RiskError::InvalidTtg { value: -1.0 }.into();
        assert_eq!(user.exit_code(), 1);

        let runtime: CliError = RiskError::MissingConfig {
            path: PathBuf::from("/nope.json"),
        }
        .into();
        assert_eq!(runtime.exit_code(), 2);

        let internal: CliError = RiskError::InvalidProbability {
            context: "test".to_string(),
            value: 1.5,
        }
        .into();
        assert_eq!(internal.exit_code(), 3);
    }

    #[test]
    fn csv_has_header_and_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv");
        let report = SweepReport {
            points: vec![
                SamplePoint {
                    index: 0,
                    ttg: 0.0,
                    mode: "PTO".to_string(),
                    total_risk: 1.5,
                },
                SamplePoint {
                    index: 1,
                    ttg: 100.0,
                    mode: "MEC".to_string(),
                    total_risk: 0.25,
                },
            ],
            total_risk: 1.75,
        };
        write_csv(&path, &report).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines, vec!["ttg,mode,total_risk", "0,PTO,1.5", "100,MEC,0.25"]);
    }

    #[test]
    fn csv_quotes_mode_names_with_separators() {
        assert_eq!(csv_field("PTO"), "PTO");
        assert_eq!(csv_field("PTO, boost"), "\"PTO, boost\"");
        assert_eq!(csv_field("the \"quiet\" mode"), "\"the \"\"quiet\"\" mode\"");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv");
        let report = SweepReport {
            points: vec![SamplePoint {
                index: 0,
                ttg: 5.0,
                mode: "DG1,DG2".to_string(),
                total_risk: 2.0,
            }],
            total_risk: 2.0,
        };
        write_csv(&path, &report).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body.lines().nth(1), Some("5,\"DG1,DG2\",2"));
    }
}

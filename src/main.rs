//! Photo Importer - copy photos into a dated library
//!
//! CLI front end: parses arguments, sets up logging, runs one import and
//! prints a summary.

use anyhow::Result;
use clap::Parser;
use photo_importer::{Cli, Config, ImportOutcome, ImportReport, ImportSession, SkipReason};
use std::path::Path;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Colours and layout for terminal output.

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let _ = stdout().execute(Print(format!("  {}\n", title.bold())));
    }

    pub fn print_success(msg: &str) {
        let _ = stdout().execute(Print(style("✓ ").with(CliTheme::SUCCESS).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// One line per file: icon, source, then destination or message
    pub fn print_result(status_icon: &str, status_color: Color, source: &str, dest_or_msg: &str) {
        let icon_styled = style(status_icon).with(status_color).bold();
        let source_styled = style(source).italic();
        let msg_styled = style(dest_or_msg).with(CliTheme::HINT);

        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(icon_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(source_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(msg_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.init_config {
        Config::write_sample(path)?;
        cli_output::print_success(&format!("Sample configuration written to {}", path.display()));
        return Ok(());
    }

    let _guard = setup_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Photo Importer starting");

    let config = load_config(&cli)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Refusing to start");
        cli_output::print_error(&e.to_string());
        std::process::exit(1);
    }

    let report = ImportSession::new(&config).run();
    print_report(&report, config.verbose);

    if report.aborted {
        std::process::exit(1);
    }
    Ok(())
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => {
            info!(config_file = %path.display(), "Loading configuration from file");
            cli.merge_with_config(Config::load_from_file(path)?)
        }
        None => cli.to_config(),
    };
    Ok(config)
}

/// Setup logging: stderr always, plus an optional file
fn setup_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let Some(ref log_path) = cli.log_file else {
        subscriber.init();
        return Ok(None);
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(open_log_file(log_path)?);

    if cli.json_log {
        subscriber
            .with(fmt::layer().json().with_ansi(false).with_writer(non_blocking))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(Some(guard))
}

fn open_log_file(log_path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;
    Ok(file)
}

fn print_report(report: &ImportReport, verbose: bool) {
    use cli_output::*;

    print_separator();
    if report.aborted {
        print_title("Import aborted: error budget exceeded");
    } else {
        print_title("Import complete");
    }
    print_separator();

    print_blank();
    print_stat("Files processed", &report.processed.to_string(), CliTheme::ACCENT);
    print_stat("Files imported", &report.imported.to_string(), CliTheme::SUCCESS);
    print_stat("Files skipped", &report.skipped.to_string(), CliTheme::WARNING);
    print_stat("Errors encountered", &report.failed.to_string(), CliTheme::ERROR);
    print_blank();

    if verbose {
        print_separator();
        for record in &report.records {
            let source = record.source.display().to_string();
            if let ImportOutcome::Imported { destination, .. } = &record.outcome {
                print_result(
                    "✓",
                    CliTheme::SUCCESS,
                    &source,
                    &format!("→ {}", destination.display()),
                );
            }
        }
        for record in report.skips() {
            let message = match &record.outcome {
                ImportOutcome::Skipped(SkipReason::AlreadyInPlace(_)) => "already in place",
                _ => "already exists",
            };
            print_result("⊘", CliTheme::WARNING, &record.source.display().to_string(), message);
        }
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        print_separator();
        print_error(&format!("{} files failed", failures.len()));
        print_blank();
        for record in failures {
            if let ImportOutcome::Failed { stage, message } = &record.outcome {
                print_result(
                    "✗",
                    CliTheme::ERROR,
                    &record.source.display().to_string(),
                    &format!("[{}] {}", stage.as_str(), message),
                );
            }
        }
    }
}

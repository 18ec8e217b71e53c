use clap::Parser;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use sidediff_tui::{
    cli::{Cli, OutputFormat},
    config::SideDiffConfig,
    core::{read_document, AppEvent, ComparisonSession, ComparisonWatcher, FileFilter, FileLoader, Side},
    diff::{Comparison, ComparisonStats, DiffFormat, DiffFormatter},
    export::{ChangeExporter, ExportFormat},
    ui::{restore_terminal, setup_terminal, TuiApp},
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    cli.setup_logging();

    let config = cli.load_config().context("Failed to load configuration")?;
    if let Err(err) = config.validate() {
        eprintln!("Error: invalid configuration: {}", err);
        std::process::exit(1);
    }
    let filter = cli.file_filter(&config);

    if let Some(format) = cli.export {
        return run_export_mode(&cli, &config, &filter, format);
    }

    match cli.output {
        OutputFormat::Tui => run_tui_mode(&cli, config, filter)?,
        OutputFormat::Text | OutputFormat::Changes | OutputFormat::Compact | OutputFormat::Json => {
            run_report_mode(&cli, &config, &filter)?
        }
    }

    Ok(())
}

fn run_tui_mode(cli: &Cli, config: SideDiffConfig, filter: FileFilter) -> Result<()> {
    let mut app = TuiApp::new(config, filter, cli.watch)?;

    match (&cli.old, &cli.new) {
        (Some(old), Some(new)) => {
            app.open(Side::Old, old.clone());
            app.open(Side::New, new.clone());
        }
        (Some(old), None) => {
            app.open(Side::Old, old.clone());
            app.open_picker(Side::New);
        }
        (None, _) => app.open_picker(Side::Old),
    }

    // Setup terminal
    let mut terminal = setup_terminal()?;

    // Run the application
    let res = app.run(&mut terminal);

    // Restore terminal
    if let Err(err) = restore_terminal(&mut terminal) {
        eprintln!("Failed to restore terminal: {}", err);
    }

    if let Err(err) = res {
        eprintln!("Application error: {}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Read both files into a fresh session
fn load_session(cli: &Cli, config: &SideDiffConfig, filter: &FileFilter) -> Result<ComparisonSession> {
    let (old_path, new_path) = cli
        .paths()
        .context("Both OLD and NEW files are required")?;

    let mut session = ComparisonSession::new(config.diff.algorithm);
    for (side, path) in [(Side::Old, &old_path), (Side::New, &new_path)] {
        let document = read_document(path, filter)
            .with_context(|| format!("Failed to load {} file {}", side, path.display()))?;
        session.set_document(side, document);
    }
    Ok(session)
}

fn run_export_mode(
    cli: &Cli,
    config: &SideDiffConfig,
    filter: &FileFilter,
    format: ExportFormat,
) -> Result<()> {
    let session = load_session(cli, config, filter)?;
    let changes = session
        .comparison()
        .map(|c| c.changes.as_slice())
        .unwrap_or_default();

    let exporter = ChangeExporter::new(&config.export.directory);
    let path = exporter
        .export(changes, format)
        .context("Failed to export change list")?;

    println!("Exported {} changes to {}", changes.len(), path.display());
    Ok(())
}

fn run_report_mode(cli: &Cli, config: &SideDiffConfig, filter: &FileFilter) -> Result<()> {
    let mut session = load_session(cli, config, filter)?;
    print_comparison(cli, &session)?;

    if !cli.watch {
        return Ok(());
    }

    let (event_tx, event_rx) = mpsc::channel();
    let loader = FileLoader::new(filter.clone(), event_tx.clone());
    let mut watcher = ComparisonWatcher::new(event_tx)?;
    for side in [Side::Old, Side::New] {
        if let Some(document) = session.document(side) {
            let path = document.path.clone();
            watcher.watch(side, &path)?;
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        match event_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(AppEvent::FileChanged { side, path }) => loader.reload(side, path),
            Ok(AppEvent::Load(event)) => match session.apply(event) {
                Ok(true) => print_comparison(cli, &session)?,
                Ok(false) => continue,
                Err(err) => eprintln!("Error: {}", err),
            },
            Ok(AppEvent::Quit) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ComparisonReport<'a> {
    old: &'a Path,
    new: &'a Path,
    algorithm: String,
    generated_at: chrono::DateTime<chrono::Local>,
    stats: ComparisonStats,
    comparison: &'a Comparison,
}

fn print_comparison(cli: &Cli, session: &ComparisonSession) -> Result<()> {
    let (Some(comparison), Some(old), Some(new)) = (
        session.comparison(),
        session.document(Side::Old),
        session.document(Side::New),
    ) else {
        return Ok(());
    };
    let color = !cli.no_color;

    let format = match cli.output {
        OutputFormat::Json => {
            let report = ComparisonReport {
                old: &old.path,
                new: &new.path,
                algorithm: session.algorithm().to_string(),
                generated_at: chrono::Local::now(),
                stats: comparison.stats(),
                comparison,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        OutputFormat::Changes => DiffFormat::ChangeList,
        OutputFormat::Compact => DiffFormat::Compact,
        OutputFormat::Tui | OutputFormat::Text => DiffFormat::SideBySide,
    };

    let output = DiffFormatter::format(
        comparison,
        format,
        old.path.as_path(),
        new.path.as_path(),
        cli.width,
        color,
    );
    println!("{}", output);
    println!("{}", DiffFormatter::format_stats(comparison));
    Ok(())
}

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use gcode2as::config::{Args, Config};
use gcode2as::convert::{Conversion, Incomplete, convert};
use gcode2as::diagnostics::tally;
use gcode2as::emit::Emitter;
use gcode2as::parser::{MotionCommand, parse_program};
use gcode2as::program::assemble;
use gcode2as::report::RunReport;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str()))
        .init();

    // Parse configuration from command line, project file and profiles
    let config = Config::from_args(args)?;
    run(&config)
}

fn run(config: &Config) -> Result<ExitCode> {
    let bytes = fs::read(&config.input)
        .with_context(|| format!("Failed to read input: {}", config.input.display()))?;
    let source = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = source {
        log::warn!(
            "{} is not valid UTF-8, invalid bytes were replaced",
            config.input.display()
        );
    }

    // Created up front so an unwritable destination fails before any work
    let output_path = config.output_path();
    let mut output = File::create(&output_path)
        .with_context(|| format!("Failed to create output: {}", output_path.display()))?;

    if let Some(path) = &config.config_path {
        log::info!("using project config {}", path.display());
    }
    log::info!(
        "converting {} in {} mode{}",
        config.input.display(),
        config.options.mode.name(),
        config
            .profile
            .as_deref()
            .map(|p| format!(" (profile {p})"))
            .unwrap_or_default()
    );

    let parsed = parse_program(&source);
    let (conversion, pending, complete): (Conversion, Vec<MotionCommand>, bool) =
        match convert(parsed.commands, &config.options) {
            Ok(conversion) => (conversion, Vec::new(), true),
            Err(incomplete) => {
                let Incomplete {
                    error,
                    partial,
                    pending,
                } = *incomplete;
                log::error!("{error}");
                (partial, pending, false)
            }
        };

    let mut diagnostics = parsed.diagnostics;
    diagnostics.extend(conversion.diagnostics.iter().cloned());
    for diagnostic in &diagnostics {
        diagnostic.log();
    }

    let emitter = Emitter::new(config.options.verbose);
    let program = assemble(
        &conversion.render(&emitter),
        &config.program_name,
        config.options.max_section_size,
    );
    output
        .write_all(program.as_bytes())
        .with_context(|| format!("Failed to write output: {}", output_path.display()))?;

    if !complete {
        log::warn!(
            "partial program written to {}; {} commands were not converted:",
            output_path.display(),
            pending.len()
        );
        for command in &pending {
            log::warn!("  line {}: {}", command.line, command);
        }
    }

    let stats = conversion.stats;
    let (errors, warnings, _) = tally(&diagnostics);
    log::info!(
        "wrote {}: {} commands, {} statements, {} omitted, {} skipped, {} errors, {} warnings",
        output_path.display(),
        stats.commands,
        stats.emitted,
        stats.omitted,
        stats.skipped,
        errors,
        warnings
    );

    if let Some(report_path) = &config.report {
        RunReport {
            input: config.input.clone(),
            output: output_path.clone(),
            program: config.program_name.clone(),
            mode: config.options.mode.name().to_string(),
            profile: config.profile.clone(),
            complete,
            stats,
            errors: 0,
            warnings: 0,
            diagnostics: Vec::new(),
            pending_lines: pending.iter().map(|c| c.line).collect(),
        }
        .with_diagnostics(diagnostics)
        .write(report_path)?;
        log::info!("report written to {}", report_path.display());
    }

    Ok(if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

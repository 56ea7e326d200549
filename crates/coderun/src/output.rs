//! Terminal rendering of results, languages and settings.

use std::io::{self, Write};
use std::process::ExitCode;

use coderun_exec::ExecutionResult;
use coderun_languages::{ConfigValues, Registry};
use eyre::{Result, eyre};
use owo_colors::OwoColorize;

/// Exit status `crun` itself uses for a timed-out snippet, as `timeout(1)`.
pub const TIMEOUT_EXIT: u8 = 124;

/// Print captured output followed by a one-line status on stderr.
pub fn print_result(result: &ExecutionResult) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(result.stdout.as_bytes())?;
    out.flush()?;

    let mut err = io::stderr().lock();
    err.write_all(result.stderr.as_bytes())?;
    if !result.stderr.is_empty() && !result.stderr.ends_with('\n') {
        writeln!(err)?;
    }
    writeln!(err, "{}", status_line(result))?;
    Ok(())
}

pub fn print_json(result: &ExecutionResult) -> Result<()> {
    let json = facet_json::to_string(result).map_err(|e| eyre!("Failed to encode result: {e}"))?;
    println!("{json}");
    Ok(())
}

fn status_line(result: &ExecutionResult) -> String {
    let elapsed = format!("{}ms", result.elapsed_ms);
    if result.timed_out {
        format!("{} {}", "timed out".yellow().bold(), elapsed.dimmed())
    } else {
        match result.exit_code {
            Some(0) => format!("{} {}", "exit 0".green().bold(), elapsed.dimmed()),
            Some(code) => format!("{} {}", format!("exit {code}").red().bold(), elapsed.dimmed()),
            None => format!("{} {}", "no exit code".red().bold(), elapsed.dimmed()),
        }
    }
}

/// Process exit status mirroring the snippet's.
pub fn exit_status(result: &ExecutionResult) -> ExitCode {
    ExitCode::from(exit_byte(result))
}

fn exit_byte(result: &ExecutionResult) -> u8 {
    if result.timed_out {
        return TIMEOUT_EXIT;
    }
    match result.exit_code {
        Some(code) => u8::try_from(code.rem_euclid(256)).unwrap_or(1),
        None => 1,
    }
}

pub fn print_languages(registry: &Registry) {
    let width = registry
        .descriptors()
        .iter()
        .map(|d| d.name().len())
        .max()
        .unwrap_or(0);

    for descriptor in registry.descriptors() {
        println!(
            "{:width$}  {}",
            descriptor.name().bold(),
            descriptor.ids().join(", ").dimmed(),
        );
    }
}

pub fn print_settings(registry: &Registry, values: &ConfigValues) {
    for descriptor in registry.descriptors() {
        println!("{}", descriptor.name().bold().underline());
        for field in descriptor.config_fields() {
            let overridden = values.get_opt(field).is_some();
            let value = values.get(field);
            let value = if field.multiline && value.contains('\n') {
                format!("{}…", value.lines().next().unwrap_or_default())
            } else {
                value.to_string()
            };
            let origin = if overridden { "set" } else { "default" };
            let kind = if field.multiline { ", multiline" } else { "" };

            println!(
                "  {} = {:?} {}",
                field.key.cyan(),
                value,
                format!("({origin}{kind}, {})", field.label).dimmed(),
            );
        }
    }
}

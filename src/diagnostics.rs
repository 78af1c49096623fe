//! Startup dependency checking.
//!
//! The pipeline shells out to an external transcription engine, which in
//! turn needs a decode toolchain (ffmpeg) on PATH for audio container
//! handling. Both are verified before the pipeline starts; absence is a
//! fatal startup condition.

use crate::defaults;
use crate::error::{LivecapError, Result};
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok,
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
}

/// Check if a command exists and is executable.
fn check_command(command: &str) -> CheckResult {
    match Command::new(command).arg("-version").output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!("'{}' found but -version failed", command)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Check the engine program. Whisper-style CLIs vary in flag conventions,
/// so any successful spawn counts as present.
fn check_engine(program: &str) -> CheckResult {
    match Command::new(program).arg("--help").output() {
        Ok(_) => CheckResult::Ok,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", program, e)),
    }
}

/// Print a dependency report for the `check` subcommand.
///
/// Returns true if every required dependency is present.
pub fn check_dependencies(engine_program: &str) -> bool {
    let mut all_ok = true;

    print!("{} (decode toolchain): ", defaults::DECODE_TOOL);
    match check_command(defaults::DECODE_TOOL) {
        CheckResult::Ok => println!("ok"),
        CheckResult::NotFound => {
            println!("NOT FOUND");
            println!("  install ffmpeg and make sure it is on PATH");
            all_ok = false;
        }
        CheckResult::Warning(msg) => println!("warning: {}", msg),
    }

    print!("{} (transcription engine): ", engine_program);
    match check_engine(engine_program) {
        CheckResult::Ok => println!("ok"),
        CheckResult::NotFound => {
            println!("NOT FOUND");
            println!("  set engine.program in the config or pass --engine");
            all_ok = false;
        }
        CheckResult::Warning(msg) => println!("warning: {}", msg),
    }

    all_ok
}

/// Verify startup dependencies, failing fast with a diagnostic.
pub fn ensure_startup_dependencies(engine_program: &str) -> Result<()> {
    if check_command(defaults::DECODE_TOOL) == CheckResult::NotFound {
        return Err(LivecapError::EngineUnavailable {
            program: defaults::DECODE_TOOL.to_string(),
            message: "decode toolchain not found on PATH".to_string(),
        });
    }
    if check_engine(engine_program) == CheckResult::NotFound {
        return Err(LivecapError::EngineUnavailable {
            program: engine_program.to_string(),
            message: "not found on PATH".to_string(),
        });
    }
    Ok(())
}

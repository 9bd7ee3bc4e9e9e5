//! `archpro doctor`

use anyhow::{Context, Result};

use crate::doctor::run_checks;
use crate::{App, ExitCode, emit_jcs};

/// Run the checks; any failed check exits with `ExitCode::INTERNAL`.
pub fn execute_doctor_command(app: &App, json: bool) -> Result<ExitCode> {
    let output = run_checks(
        &app.config,
        app.credentials.as_ref(),
        &app.catalog,
        &app.store,
    );

    if json {
        let json_output = emit_jcs(&output).context("Failed to emit doctor JSON")?;
        println!("{json_output}");
    } else {
        print!("{}", output.to_text());
        if !output.ok {
            println!("\nSome checks failed. Please address the issues above.");
        }
    }

    Ok(if output.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::INTERNAL
    })
}

//! Run command implementation: apply a JSON action script.

use super::output::{JsonRunResult, describe_outcome};
use super::{CliError, ConfigArgs, OutputFormat};
use claimgrid::game::{Action, GameState};
use claimgrid::render::render_ascii;
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed, the config is
/// invalid, or an action selects a player that does not exist.
pub(crate) fn execute(
    config: &ConfigArgs,
    actions: PathBuf,
    format: OutputFormat,
    trace: bool,
) -> Result<(), CliError> {
    let text = fs::read_to_string(&actions)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", actions.display())))?;
    let script: Vec<Action> = serde_json::from_str(&text)?;

    let mut game = GameState::new(config.resolve()?)?;
    let mut outcomes = Vec::with_capacity(script.len());

    for (step, action) in script.into_iter().enumerate() {
        let outcome = game.apply(action)?;
        if trace && format == OutputFormat::Text {
            println!("{step:>4}: {}", describe_outcome(&outcome));
        }
        outcomes.push(outcome);
    }

    let applied = outcomes.iter().filter(|o| o.is_applied()).count();
    let rejected = outcomes.len() - applied;
    let snapshot = game.snapshot();

    match format {
        OutputFormat::Text => {
            if trace {
                println!();
            }
            print!("{}", render_ascii(&snapshot, std::io::stdout().is_terminal()));
            println!();
            println!("Actions: {applied} applied, {rejected} rejected");
        }
        OutputFormat::Json => {
            let result = JsonRunResult {
                applied,
                rejected,
                outcomes: trace.then_some(outcomes.as_slice()),
                state: &snapshot,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

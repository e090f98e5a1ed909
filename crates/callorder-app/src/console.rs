//! Console call simulator.
//!
//! Each input line is one caller turn: an all-digit line counts as keypad
//! presses, anything else as recognized speech, and a blank line as silence.
//! The call ends on a terminal directive or at end of input.

use std::io::{BufRead, Write};

use callorder_core::catalog::Catalog;
use callorder_core::error::{CallOrderError, Result};
use callorder_dialog::{DialogEngine, DialogError, ResponseDirective, TurnSignals};

/// Classify one console line the way a telephony gather would report it.
pub fn signals_for_line(line: &str) -> TurnSignals {
    let trimmed = line.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        TurnSignals::digits(trimmed)
    } else {
        TurnSignals::speech(trimmed)
    }
}

fn render(directive: &ResponseDirective, output: &mut impl Write) -> Result<()> {
    match directive {
        ResponseDirective::Collect {
            prompt,
            expected_digits,
            ..
        } => {
            writeln!(output, "<< {}", prompt)?;
            write!(output, "[speak or key {} digit(s)] >> ", expected_digits)?;
        }
        ResponseDirective::Terminal { text, .. } => {
            writeln!(output, "<< {}", text)?;
            writeln!(output, "[call ended]")?;
        }
    }
    output.flush()?;
    Ok(())
}

/// Run one simulated call. Returns the number of caller turns taken.
///
/// The call's session is dropped from the engine once the call ends.
pub async fn run_call(
    engine: &DialogEngine,
    catalog: &Catalog,
    call_id: &str,
    input: impl BufRead,
    mut output: impl Write,
) -> std::result::Result<usize, DialogError> {
    let greeting = engine.start_call(call_id, catalog).await?;
    render(&greeting, &mut output)?;

    let mut turns = 0;
    for line in input.lines() {
        let line = line.map_err(CallOrderError::from)?;
        let utterance = signals_for_line(&line).into_utterance();
        let directive = engine.handle_turn(call_id, catalog, &utterance).await?;
        turns += 1;
        render(&directive, &mut output)?;
        if directive.is_terminal() {
            engine.sessions().remove(call_id)?;
            return Ok(turns);
        }
    }

    writeln!(output).map_err(CallOrderError::from)?;
    tracing::info!(call_id = %call_id, turns, "Caller hung up");
    engine.sessions().remove(call_id)?;
    Ok(turns)
}

use crate::game::SessionResult;
use crate::{BatchResult, SimulationError};
use std::io::Write;

const WIDTH: usize = 80;

/// Writes every transition of every session, one per line, under a `session #i` header.
pub fn write_history(sessions: &[SessionResult], mut writer: impl Write) -> std::io::Result<()> {
    for (id, session) in sessions.iter().enumerate() {
        let header = format!("session #{}", id + 1);
        writeln!(writer, "{:-^WIDTH$}", header)?;
        for transition in session.transitions() {
            writeln!(writer, "{}", transition)?;
        }
        writeln!(
            writer,
            "{} rounds, {} -> {} ({})",
            session.rounds(),
            session.starting_balance(),
            session.final_balance(),
            session.end
        )?;
    }
    writeln!(writer, "{}", "-".repeat(WIDTH))?;
    writer.flush()
}

/// Writes the whole batch, summary and sessions, as pretty printed JSON.
pub fn write_batch_json(batch: &BatchResult, mut writer: impl Write) -> Result<(), SimulationError> {
    serde_json::to_writer_pretty(&mut writer, batch)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

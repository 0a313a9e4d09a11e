use anyhow::Result;
use std::io::{BufRead, Write};

use finrag_core::traits::{ChunkStore, TextGenerator};

use crate::engine::{AnswerMode, RagEngine};

pub const GOODBYE: &str = "Goodbye!";

pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Question/answer loop over `input` until `exit`/`quit` or end of input.
///
/// Turns are independent. A failed turn is reported and the loop moves on.
/// Returns the number of questions answered.
pub async fn run_chat<S, G, R, W>(engine: &RagEngine<S, G>, input: R, mut out: W) -> Result<usize>
where
    S: ChunkStore,
    G: TextGenerator,
    R: BufRead,
    W: Write,
{
    let mut answered = 0usize;
    let mut lines = input.lines();
    loop {
        write!(out, "\nYou: ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        if is_exit_command(&line) {
            writeln!(out, "{GOODBYE}")?;
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        match engine.answer(question).await {
            Ok(answer) => {
                writeln!(out, "Advisor: {}", answer.text.trim_end())?;
                if answer.mode == AnswerMode::Grounded {
                    for source in &answer.sources {
                        writeln!(out, "  source: {source}")?;
                    }
                }
                answered += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "query failed");
                writeln!(out, "Error: {e:#}")?;
            }
        }
    }
    Ok(answered)
}

//! Interactive conflict resolution on the terminal.

use parking_lot::Mutex;
use slotlock_engine::{ConflictReport, Resolution, ResolutionPolicy};
use std::io::{self, BufRead, BufReader, Write};

/// Asks the user to pick `1` (keep existing) or `2` (apply mine).
///
/// Prompts are serialized so concurrent actors never interleave on screen.
/// End of input keeps the existing booking.
pub struct ConsolePolicy<R, W> {
    io: Mutex<(R, W)>,
}

impl ConsolePolicy<BufReader<io::Stdin>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsolePolicy<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
        }
    }

    fn prompt(&self, report: &ConflictReport) -> io::Result<Resolution> {
        let mut guard = self.io.lock();
        let (input, output) = &mut *guard;

        writeln!(output)?;
        writeln!(output, "=== CONFLICT DETECTED ===")?;
        writeln!(output, "{}", report.conflict)?;
        writeln!(output, "  current:   {}", report.current)?;
        writeln!(
            output,
            "  your edit: {} \"{}\"",
            report.attempted.window, report.attempted.subject
        )?;
        writeln!(output, "  they changed: {:?}", report.their_changes())?;
        writeln!(output, "  you changed:  {:?}", report.my_changes())?;

        let mut line = String::new();
        loop {
            writeln!(output, "1) keep the existing booking")?;
            writeln!(output, "2) apply my changes on top")?;
            write!(output, "choice> ")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(Resolution::KeepExisting);
            }
            match line.trim() {
                "1" => return Ok(Resolution::KeepExisting),
                "2" => return Ok(Resolution::ApplyMine(report.my_changes())),
                other => writeln!(output, "unrecognized choice {:?}", other)?,
            }
        }
    }
}

impl<R, W> ResolutionPolicy for ConsolePolicy<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    /// Prompt and return the user's choice.
    ///
    /// `ResolutionPolicy` cannot fail, so an I/O error on the console is
    /// logged and answered with `KeepExisting`. To the caller this is
    /// indistinguishable from the user typing `1`; the warning in the log is
    /// the only trace of it.
    fn decide(&self, report: &ConflictReport) -> Resolution {
        self.prompt(report).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "console unavailable, keeping existing booking");
            Resolution::KeepExisting
        })
    }
}

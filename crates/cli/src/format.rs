//! Human and JSON rendering of a demo run.

use serde_json::{json, Value};
use slotlock_engine::{ActorFailure, ActorOutcome, ActorReport};

use crate::demo::DemoRun;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

pub fn format_run(run: &DemoRun, mode_label: &str, output: OutputMode) -> String {
    match output {
        OutputMode::Human => format_human(run, mode_label),
        OutputMode::Json => {
            serde_json::to_string_pretty(&to_json(run, mode_label)).unwrap_or_else(|e| {
                format!("{{\"error\": \"failed to serialize report: {}\"}}", e)
            })
        }
    }
}

fn format_human(run: &DemoRun, mode_label: &str) -> String {
    let seeded = &run.seeded;
    let mut lines = vec![
        format!("mode: {}", mode_label),
        format!("room: {} (capacity {})", seeded.room.name, seeded.room.capacity),
        format!(
            "organizer: {} {}, colleague: {} {}",
            seeded.organizer.first_name,
            seeded.organizer.last_name,
            seeded.colleague.first_name,
            seeded.colleague.last_name
        ),
        format!("seeded: {}", seeded.booking),
        String::new(),
    ];

    for actor in &run.report.actors {
        lines.push(format_actor(actor));
    }
    lines.push(String::new());

    match run.report.record(run.seeded.booking.id) {
        Some(b) => lines.push(format!("final: {}", b)),
        None => lines.push("final: (deleted)".to_string()),
    }

    lines.push("commit log:".to_string());
    for entry in &run.commit_log {
        lines.push(format!(
            "  {} v{} {:?} at {}",
            entry.id,
            entry.version,
            entry.kind,
            entry.at.format("%H:%M:%S%.3f")
        ));
    }

    let violations = run.report.overlap_violations();
    if violations.is_empty() {
        lines.push("overlap check: ok".to_string());
    } else {
        for (a, b) in violations {
            lines.push(format!("overlap check: {} intersects {}", a, b));
        }
    }

    lines.join("\n")
}

fn format_actor(actor: &ActorReport) -> String {
    let ms = actor.elapsed.as_millis();
    match &actor.result {
        Ok(ActorOutcome::Committed { version, attempts }) => format!(
            "{}: committed v{} after {} attempt(s) in {} ms",
            actor.name, version, attempts, ms
        ),
        Ok(ActorOutcome::Abandoned { current }) => format!(
            "{}: kept existing v{} in {} ms",
            actor.name, current.version, ms
        ),
        Err(ActorFailure::Error(e)) => {
            format!("{}: (error) [{}] {} in {} ms", actor.name, e.error_code(), e, ms)
        }
        Err(failure @ ActorFailure::Panicked(_)) => format!("{}: (error) {}", actor.name, failure),
    }
}

fn to_json(run: &DemoRun, mode_label: &str) -> Value {
    let actors: Vec<Value> = run
        .report
        .actors
        .iter()
        .map(|actor| {
            let result = match &actor.result {
                Ok(outcome) => json!(outcome),
                Err(ActorFailure::Error(e)) => json!({
                    "error": e.error_code(),
                    "message": e.to_string(),
                }),
                Err(failure @ ActorFailure::Panicked(_)) => json!({
                    "error": "Panicked",
                    "message": failure.to_string(),
                }),
            };
            json!({
                "name": actor.name,
                "target": actor.target,
                "elapsed_ms": actor.elapsed.as_millis() as u64,
                "result": result,
            })
        })
        .collect();

    json!({
        "mode": mode_label,
        "actors": actors,
        "final_records": run.report.final_records,
        "commit_log": run.commit_log,
        "overlap_violations": run.report.overlap_violations(),
    })
}

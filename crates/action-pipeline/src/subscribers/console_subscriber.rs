use crate::event_emitter::{Event, Subscriber};
use crate::run_summary::RunSummary;
use async_trait::async_trait;
use orbit_common::color;
use orbit_task_runner::{TaskResult, TaskStatus};
use std::io::{self, Write};

pub fn format_task_result(result: &TaskResult) -> String {
    let status = match result.status {
        TaskStatus::Passed if result.cached => color::muted_light("(cached)"),
        TaskStatus::Passed => color::success("(passed)"),
        TaskStatus::Failed => match (result.code, result.cached) {
            (Some(code), true) => color::failure(format!("(failed with code {code}, cached)")),
            (Some(code), false) => color::failure(format!("(failed with code {code})")),
            _ => color::failure("(failed)"),
        },
        TaskStatus::TimedOut => color::failure("(timed out)"),
        TaskStatus::Cancelled => color::caution("(cancelled)"),
        TaskStatus::Skipped => color::caution("(skipped, a dependency failed)"),
    };

    let mut message = format!("{} {} {status}", color::muted(">"), color::label(&result.task_id));
    let output = result.terminal_output.trim_end();

    if !output.is_empty() {
        message.push('\n');
        message.push_str(output);
    }

    message
}

pub fn format_run_summary(summary: &RunSummary) -> String {
    let failed = summary.get_failed();
    let skipped = summary.get_skipped();
    let passed = summary.results.len() - failed.len() - skipped.len();

    let mut lines = vec![format!(
        "{} {} passed ({} cached), {} failed, {} skipped in {:.2}s",
        if summary.is_success() {
            color::success("Success:")
        } else {
            color::failure("Failure:")
        },
        passed,
        summary.count_cached(),
        failed.len(),
        skipped.len(),
        summary.duration.as_secs_f64(),
    )];

    if !failed.is_empty() {
        lines.push(format!(
            "Failed: {}",
            failed
                .iter()
                .map(|result| color::label(&result.task_id))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    if !skipped.is_empty() {
        lines.push(format!(
            "Skipped: {}",
            skipped
                .iter()
                .map(|result| color::label(&result.task_id))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    if !summary.cache_warnings.is_empty() {
        lines.push(color::caution(format!(
            "{} cache operations failed and were skipped",
            summary.cache_warnings.len()
        )));
    }

    lines.join("\n")
}

/// Prints each task's captured output once it completes, so output of
/// concurrent tasks never interleaves, followed by a summary.
pub struct ConsoleSubscriber<W: Write + Send + Sync = io::Stdout> {
    out: W,
}

impl ConsoleSubscriber {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send + Sync> ConsoleSubscriber<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }
}

#[async_trait]
impl<W: Write + Send + Sync> Subscriber for ConsoleSubscriber<W> {
    async fn on_emit<'data>(&mut self, event: &Event<'data>) -> miette::Result<()> {
        let message = match event {
            Event::TaskFinished { result } => format_task_result(result),
            Event::PipelineFinished { summary } => format!("\n{}", format_run_summary(summary)),
            _ => return Ok(()),
        };

        // A closed stdout shouldn't fail the run
        let _ = writeln!(self.out, "{message}");
        let _ = self.out.flush();

        Ok(())
    }
}

//! Operator-facing console rendering for the CLI subcommands.

use crate::core::{BatchOutcome, BroadcastOutcome, SendReport, TaskPreview};
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Asks before a consuming run, since fetched tasks leave the upstream
/// queue whether or not their sends succeed.
pub fn confirm_consume() -> bool {
    Confirm::new()
        .with_prompt("Fetching will consume the upstream task queue. Continue?")
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Spinner shown while a batch or fetch is in flight.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

pub fn print_batch_outcome(outcome: &BatchOutcome) {
    for line in &outcome.details {
        println!("  {line}");
    }

    let mut summary = format!(
        "{} {} sent | {} {} failed",
        outcome.sent.to_string().green().bold(),
        "✓".green(),
        outcome.failed.to_string().red().bold(),
        "✗".red(),
    );
    if outcome.skipped > 0 {
        summary.push_str(&format!(
            " | {} without a number",
            outcome.skipped.to_string().yellow().bold()
        ));
    }
    if outcome.dry_run {
        summary.push_str(&format!(" {}", "(dry-run)".yellow()));
    }
    println!("{summary}");
}

pub fn print_previews(previews: &[TaskPreview]) {
    if previews.is_empty() {
        println!("{}", "No pending tasks in the queue".green());
        return;
    }

    println!("{} pending task(s):", previews.len());
    for task in previews {
        let destination = match &task.destination {
            Some(phone) => phone.normal(),
            None => "no configured number".yellow(),
        };
        println!(
            "  [{}] {}: {} -> {} (created by {})",
            task.id.as_deref().unwrap_or("-"),
            task.titulo,
            task.asignado,
            destination,
            task.creador,
        );
    }
}

pub fn print_send_report(report: &SendReport) {
    match report.error_message.as_deref() {
        None => println!(
            "{} notification {} sent to {} ({})",
            "✓".green(),
            report.id,
            report.enviado_a,
            report.twilio_sid.as_deref().unwrap_or("-"),
        ),
        Some(error) => println!(
            "{} notification {} failed: {}",
            "✗".red(),
            report.id,
            error,
        ),
    }
}

pub fn print_broadcast_outcome(outcome: &BroadcastOutcome) {
    for result in &outcome.results {
        if result.success {
            println!("  {} {} ({})", "✓".green(), result.number, result.detail);
        } else {
            println!("  {} {}: {}", "✗".red(), result.number, result.detail);
        }
    }
    println!(
        "{} of {} recipient(s) reached, {} failed",
        outcome.sent.to_string().green().bold(),
        outcome.requested,
        outcome.failed.to_string().red().bold(),
    );
}

//! Terminal output utilities

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use repomirror_sync::ReconcileReport;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Create a spinner
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(template.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print the end-of-run summary: counts, then one line per failed project.
/// `done` is printed when nothing failed.
pub fn report(title: &str, done: &str, report: &ReconcileReport) {
    let summary = Summary::of(report, done);

    header(title);
    for (key, value) in &summary.counts {
        kv(key, value);
    }
    if let Some(done) = &summary.done {
        success(done);
    }
    for line in &summary.failures {
        error(line);
    }
}

/// Rendered content of a run summary
#[derive(Debug, PartialEq, Eq)]
struct Summary {
    counts: Vec<(&'static str, String)>,
    done: Option<String>,
    failures: Vec<String>,
}

impl Summary {
    fn of(report: &ReconcileReport, done: &str) -> Self {
        let failures = report.failures();
        let mut counts = vec![
            ("Attempted", report.attempted().to_string()),
            ("Succeeded", report.succeeded().len().to_string()),
        ];

        if failures.is_empty() {
            return Self {
                counts,
                done: Some(done.to_string()),
                failures: Vec::new(),
            };
        }

        counts.push(("Failed", failures.len().to_string()));
        Self {
            counts,
            done: None,
            failures: failures
                .into_iter()
                .map(|(name, err)| format!("{}: {}", name, err))
                .collect(),
        }
    }
}

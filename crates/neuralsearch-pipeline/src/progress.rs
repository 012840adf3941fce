use indicatif::{ProgressBar, ProgressStyle};

/// Spinner counting processed records; hidden when `enabled` is false.
pub(crate) fn spinner(enabled: bool, unit: &str) -> ProgressBar {
    if !enabled { return ProgressBar::hidden(); }
    let pb = ProgressBar::new_spinner();
    let template = format!("{{spinner:.green}} [{{elapsed_precise}}] {{pos}} {unit} {{msg}}");
    pb.set_style(ProgressStyle::default_spinner().template(&template).unwrap_or_else(|_| ProgressStyle::default_spinner()));
    pb
}

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner for a single provider call that may take a while.
pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bar counting copied files of one container; the message shows the
/// file currently being copied.
pub fn container_progress(container: &str, total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:40.cyan/dim}] {pos}/{len} {wide_msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_prefix(container.to_string());
    pb
}

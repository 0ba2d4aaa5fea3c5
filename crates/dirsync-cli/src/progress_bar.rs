//! Terminal progress bars for the comparison and sync phases

use std::sync::Mutex;

use dirsync_core::{Phase, Progress};
use indicatif::{ProgressBar, ProgressStyle};

/// Draws one bar per phase on stderr.
///
/// Phases with a known total get a bar, the others a spinner that counts
/// visited items.
#[derive(Default)]
pub struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:>20} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg} {pos} items")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl Progress for TerminalProgress {
    fn start(&self, phase: Phase, total: Option<u64>) {
        let bar = match total {
            Some(len) => ProgressBar::new(len).with_style(bar_style()),
            None => ProgressBar::new_spinner().with_style(spinner_style()),
        };
        bar.set_message(phase.to_string());

        let mut slot = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = slot.replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn advance(&self, delta: u64) {
        let slot = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = slot.as_ref() {
            bar.inc(delta);
        }
    }

    fn finish(&self) {
        let mut slot = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
    }
}

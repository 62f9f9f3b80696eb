use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Mutex, PoisonError};

use crate::core::progress::ProgressReporter;

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// 终端进度条，每个任务创建一个新的进度条，输出到 stderr
#[derive(Default)]
pub struct IndicatifProgress {
    bar: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// 不绘制的进度条（用于 JSON 输出或非终端）
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: true,
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.as_ref() {
            f(bar);
        }
    }
}

impl ProgressReporter for IndicatifProgress {
    fn begin(&self, task: &str, total: u64) {
        let bar = ProgressBar::with_draw_target(
            Some(total),
            if self.hidden {
                ProgressDrawTarget::hidden()
            } else {
                ProgressDrawTarget::stderr()
            },
        );
        bar.set_style(progress_style());
        bar.set_message(task.to_string());

        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = guard.replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn sub_task(&self, name: &str) {
        let name = name.to_string();
        self.with_bar(|bar| bar.set_message(name));
    }

    fn worked(&self, units: u64) {
        self.with_bar(|bar| bar.inc(units));
    }

    fn done(&self) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = guard.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_tracks_position() {
        let progress = IndicatifProgress::hidden();
        progress.begin("task", 3);
        progress.worked(2);

        let position = progress
            .bar
            .lock()
            .unwrap()
            .as_ref()
            .map(|bar| bar.position());
        assert_eq!(position, Some(2));

        progress.done();
        assert!(progress.bar.lock().unwrap().is_none());
    }
}

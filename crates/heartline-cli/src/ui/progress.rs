//! Progress indicators for long-running operations using indicatif.

use std::time::Duration;

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

use super::context::UiContext;
use super::theme::Theme;

/// A spinner shown while the shared ledger is contacted.
///
/// Only animates in pretty mode on a TTY; elsewhere it is silent so plain
/// and JSON output stay stable.
pub struct Spinner {
    bar: Option<IndicatifBar>,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(ctx: &UiContext, message: &str) -> Self {
        let bar = if ctx.allows_animation() {
            let template = if ctx.color {
                "{spinner:.magenta} {msg}..."
            } else {
                "{spinner} {msg}..."
            };
            ProgressStyle::default_spinner()
                .template(template)
                .ok()
                .map(|style| {
                    let pb = IndicatifBar::new_spinner();
                    pb.set_style(
                        style.tick_strings(Theme::default().spinner_frames(ctx.unicode)),
                    );
                    pb.set_message(message.to_string());
                    pb
                })
        } else {
            None
        };

        Self { bar }
    }

    /// Begin animating.
    pub fn start(&self) {
        if let Some(bar) = &self.bar {
            bar.enable_steady_tick(Duration::from_millis(80));
        }
    }

    /// Clear the spinner without printing anything.
    pub fn clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(bar) = &self.bar {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
    }
}

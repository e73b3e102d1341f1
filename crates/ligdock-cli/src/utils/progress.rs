use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use ligdock::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK: Duration = Duration::from_millis(80);
const DONE_MESSAGE: &str = "✓ Done";

/// Renders workflow progress events as a single spinner / bar on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr())
            .with_style(spinner_style())
            .with_message("Starting...");
        bar.finish_and_clear();

        Self {
            bar: Arc::new(Mutex::new(bar)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let shared = Arc::clone(&self.bar);

        Box::new(move |event: Progress| {
            let Ok(bar) = shared.lock() else {
                warn!("Progress display lock was poisoned; dropping event.");
                return;
            };
            apply(&bar, event);
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(bar: &ProgressBar, event: Progress) {
    match event {
        Progress::PhaseStart { name } => {
            bar.reset();
            bar.set_length(0);
            bar.set_style(spinner_style());
            bar.set_message(name.to_string());
            bar.enable_steady_tick(SPINNER_TICK);
        }
        Progress::PhaseFinish => {
            bar.disable_steady_tick();
            bar.finish_with_message(DONE_MESSAGE);
        }
        Progress::TaskStart { total_steps } => {
            // The phase name stays as the bar's label.
            let label = bar.message();
            bar.disable_steady_tick();
            bar.reset();
            bar.set_style(bar_style());
            bar.set_length(total_steps);
            bar.set_message(label);
        }
        Progress::TaskIncrement => bar.inc(1),
        Progress::TaskFinish => {
            if let Some(total) = bar.length() {
                bar.set_position(total.max(bar.position()));
            }
            bar.finish();
        }
        Progress::ItemFailed { item, reason } => {
            bar.println(format!("  ✗ {item}: {reason}"));
        }
        Progress::Message(text) if bar.is_finished() => bar.set_message(text),
        Progress::Message(text) => bar.println(format!("  {text}")),
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} ligands ({remaining})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("remaining", |state: &ProgressState, out: &mut dyn std::fmt::Write| {
            let _ = write!(out, "{}s left", state.eta().as_secs());
        })
        .progress_chars("=> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn new_handler_starts_idle() {
        let handler = CliProgressHandler::new();
        let bar = handler.bar.lock().unwrap();
        assert_eq!(bar.length(), Some(0));
        assert!(bar.is_finished());
    }

    #[test]
    fn docking_phase_drives_the_bar() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Docking" });
        {
            let bar = handler.bar.lock().unwrap();
            assert_eq!(bar.message(), "Docking");
            assert!(!bar.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 3 });
        {
            let bar = handler.bar.lock().unwrap();
            assert_eq!(bar.length(), Some(3));
            assert_eq!(bar.position(), 0);
            assert_eq!(bar.message(), "Docking");
        }

        callback(Progress::TaskIncrement);
        callback(Progress::ItemFailed {
            item: "ligand_2".to_string(),
            reason: "grid generation: autogrid4 exited with exit code 1".to_string(),
        });
        assert_eq!(handler.bar.lock().unwrap().position(), 1);

        callback(Progress::TaskFinish);
        {
            let bar = handler.bar.lock().unwrap();
            assert!(bar.is_finished());
            assert_eq!(bar.position(), 3);
        }

        callback(Progress::PhaseFinish);
        assert_eq!(handler.bar.lock().unwrap().message(), DONE_MESSAGE);
    }

    #[test]
    fn callback_can_run_on_another_thread() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Extracting best poses",
            });
            callback(Progress::TaskIncrement);
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let bar = handler.bar.lock().unwrap();
        assert!(bar.is_finished());
        assert_eq!(bar.message(), DONE_MESSAGE);
    }
}

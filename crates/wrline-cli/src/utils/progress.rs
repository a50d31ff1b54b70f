use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};
use wrline::engine::progress::{Progress, ProgressCallback};

const SPINNER_TICK_MS: u64 = 100;

/// Renders analysis progress as one line per stage.
///
/// A stage line counts timesteps while the stage runs and, once it finishes,
/// states how many values the stage left undefined. Finished lines stay on
/// screen, so the run ends with a per-stage summary.
#[derive(Clone)]
pub struct CliProgressHandler {
    multi: MultiProgress,
    stages: Arc<Mutex<Vec<ProgressBar>>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            stages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let multi = self.multi.clone();
        let stages = self.stages.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut stages) = stages.lock() else {
                warn!("Stage list mutex was poisoned. Cannot update progress.");
                return;
            };
            let running = stages.last().filter(|bar| !bar.is_finished()).cloned();

            match progress {
                Progress::PhaseStart { name } => {
                    if let Some(stale) = running {
                        stale.abandon_with_message("interrupted");
                    }
                    let bar = multi.add(
                        ProgressBar::new_spinner()
                            .with_style(Self::spinner_style())
                            .with_prefix(format!("[{}] {}", stages.len() + 1, name)),
                    );
                    bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    stages.push(bar);
                }
                Progress::TaskStart { total } => {
                    if let Some(bar) = running {
                        bar.disable_steady_tick();
                        bar.set_style(Self::timestep_style());
                        bar.set_length(total);
                        bar.set_position(0);
                    }
                }
                Progress::TaskIncrement { amount } => {
                    if let Some(bar) = running {
                        bar.inc(amount);
                    }
                }
                Progress::TaskFinish => {
                    if let Some(bar) = running {
                        if let Some(total) = bar.length() {
                            bar.set_position(total);
                        }
                    }
                }
                Progress::PhaseFinish { undefined } => {
                    if let Some(bar) = running {
                        bar.disable_steady_tick();
                        bar.set_style(Self::summary_style());
                        bar.finish_with_message(stage_summary(undefined));
                    }
                }
                Progress::Message(msg) => {
                    if let Err(e) = multi.println(format!("  {}", msg)) {
                        debug!("Could not print progress message: {}", e);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {prefix}")
            .expect("Failed to create spinner style template")
    }

    fn timestep_style() -> ProgressStyle {
        ProgressStyle::with_template("  {prefix:<24} [{bar:30.cyan/blue}] timestep {pos}/{len}")
            .expect("Failed to create timestep style template")
            .progress_chars("=> ")
    }

    fn summary_style() -> ProgressStyle {
        ProgressStyle::with_template("  {prefix:<24} {msg}")
            .expect("Failed to create summary style template")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_summary(undefined: usize) -> String {
    match undefined {
        0 => "✓ all values defined".to_string(),
        1 => "✓ 1 value undefined (nan)".to_string(),
        n => format!("✓ {} values undefined (nan)", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn hidden_handler() -> CliProgressHandler {
        CliProgressHandler::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn stages_are_numbered_in_the_order_they_start() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Midpoints" });
        callback(Progress::PhaseFinish { undefined: 0 });
        callback(Progress::PhaseStart { name: "Twist" });

        let stages = handler.stages.lock().unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].prefix(), "[1] Midpoints");
        assert_eq!(stages[1].prefix(), "[2] Twist");
        assert!(stages[0].is_finished());
        assert!(!stages[1].is_finished());
    }

    #[test]
    fn running_stage_counts_timesteps() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Central axis" });
        callback(Progress::TaskStart { total: 8 });
        callback(Progress::TaskIncrement { amount: 3 });
        {
            let stages = handler.stages.lock().unwrap();
            assert_eq!(stages[0].length(), Some(8));
            assert_eq!(stages[0].position(), 3);
        }

        callback(Progress::TaskFinish);
        let stages = handler.stages.lock().unwrap();
        assert_eq!(stages[0].position(), 8);
        assert!(!stages[0].is_finished());
    }

    #[test]
    fn finished_stage_reports_its_undefined_values() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Twist" });
        callback(Progress::PhaseFinish { undefined: 0 });
        callback(Progress::PhaseStart { name: "Central axis" });
        callback(Progress::PhaseFinish { undefined: 10 });
        callback(Progress::PhaseStart { name: "Writhe" });
        callback(Progress::PhaseFinish { undefined: 1 });

        let stages = handler.stages.lock().unwrap();
        assert_eq!(stages[0].message(), "✓ all values defined");
        assert_eq!(stages[1].message(), "✓ 10 values undefined (nan)");
        assert_eq!(stages[2].message(), "✓ 1 value undefined (nan)");
    }

    #[test]
    fn events_without_a_running_stage_are_ignored() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::TaskIncrement { amount: 1 });
        callback(Progress::PhaseFinish { undefined: 2 });
        callback(Progress::Message("Analysing 40 base pairs".to_string()));

        assert!(handler.stages.lock().unwrap().is_empty());
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart { name: "Register angles" });
            callback(Progress::TaskStart { total: 2 });
            callback(Progress::TaskIncrement { amount: 2 });
            callback(Progress::PhaseFinish { undefined: 0 });
        })
        .join()
        .unwrap();

        let stages = handler.stages.lock().unwrap();
        assert!(stages[0].is_finished());
        assert_eq!(stages[0].position(), 2);
    }
}

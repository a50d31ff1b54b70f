#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    /// End of a stage; `undefined` counts the values it could not compute.
    PhaseFinish { undefined: usize },

    TaskStart { total: u64 },
    TaskIncrement { amount: u64 },
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Optional observer for long-running stages.
///
/// Stages report through this type only; with no callback installed every
/// report is a no-op, so the numeric core runs without I/O side effects.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::PhaseStart { name: "Twist" });
        reporter.report(Progress::PhaseFinish { undefined: 0 });
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let events = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|p| {
                events.lock().unwrap().push(format!("{:?}", p));
            }));
            reporter.report(Progress::TaskStart { total: 3 });
            reporter.report(Progress::TaskIncrement { amount: 1 });
        }
        let events = events.into_inner().unwrap();
        assert_eq!(events, vec!["TaskStart { total: 3 }", "TaskIncrement { amount: 1 }"]);
    }
}

//! Timed build steps with a terminal spinner.
//!
//! The compiler runs on the main thread, so the spinner cannot animate on
//! its own. Programs poll their cancellation token between files instead,
//! and [`ProgressToken`] uses those polls to repaint.

use std::cell::{Cell, RefCell};
use std::io::IsTerminal;
use std::rc::Rc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::info;
use tsdual_toolchain::CancellationToken;

use crate::error::BuildResult;

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Repaints the active spinner whenever the compiler checks for
/// cancellation. Never requests cancellation.
pub struct ProgressToken {
    spinner: RefCell<Option<ProgressBar>>,
    next_frame: Cell<Instant>,
    interactive: bool,
}

impl ProgressToken {
    fn new(interactive: bool) -> Self {
        ProgressToken {
            spinner: RefCell::new(None),
            next_frame: Cell::new(Instant::now()),
            interactive,
        }
    }

    fn attach(&self, spinner: Option<ProgressBar>) {
        *self.spinner.borrow_mut() = spinner;
    }
}

impl CancellationToken for ProgressToken {
    fn is_cancellation_requested(&self) -> bool {
        if self.interactive {
            if let Some(spinner) = self.spinner.borrow().as_ref() {
                let now = Instant::now();
                if now >= self.next_frame.get() {
                    spinner.tick();
                    self.next_frame.set(now + FRAME_INTERVAL);
                }
            }
        }
        false
    }
}

pub struct Progress {
    token: Rc<ProgressToken>,
}

impl Progress {
    /// Spinners are drawn only when stderr is a terminal.
    pub fn new() -> Self {
        Self::with_terminal(std::io::stderr().is_terminal())
    }

    pub fn with_terminal(interactive: bool) -> Self {
        Progress {
            token: Rc::new(ProgressToken::new(interactive)),
        }
    }

    pub fn token(&self) -> Rc<ProgressToken> {
        Rc::clone(&self.token)
    }

    /// Runs `work` as the step `name`, reporting how long it took.
    pub fn step<T>(&self, name: &str, work: impl FnOnce() -> BuildResult<T>) -> BuildResult<T> {
        self.step_in(name, None, work)
    }

    /// Like [`Progress::step`], labelled with the project it works on.
    pub fn step_in<T>(
        &self,
        name: &str,
        project: Option<&str>,
        work: impl FnOnce() -> BuildResult<T>,
    ) -> BuildResult<T> {
        let label = match project {
            Some(project) => format!("[{}] {}", project, name),
            None => name.to_string(),
        };
        let spinner = self.token.interactive.then(|| spinner(&label));
        self.token.attach(spinner.clone());

        let start = Instant::now();
        let result = work();
        let elapsed_ms = start.elapsed().as_millis() as u64;
        self.token.attach(None);

        match &result {
            Ok(_) => {
                info!(step = name, project = project.unwrap_or_default(), elapsed_ms, "step finished");
                if let Some(spinner) = spinner {
                    spinner.set_style(finished_style());
                    spinner.finish_with_message(format!("✔ {} ({}ms)", label, elapsed_ms));
                }
            }
            Err(_) => {
                if let Some(spinner) = spinner {
                    spinner.set_style(finished_style());
                    spinner.abandon_with_message(format!("✖ {}", label));
                }
            }
        }
        result
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner(label: &str) -> ProgressBar {
    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("{}... ", label));
    spinner.tick();
    spinner
}

fn finished_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;

    #[test]
    fn test_token_never_cancels() {
        let progress = Progress::with_terminal(false);
        let token = progress.token();
        assert!(!token.is_cancellation_requested());
        let seen = progress
            .step("Working", || Ok(token.is_cancellation_requested()))
            .unwrap();
        assert!(!seen);
    }

    #[test]
    fn test_step_passes_results_through() {
        let progress = Progress::with_terminal(false);
        assert_eq!(progress.step("Counting", || Ok(3)).unwrap(), 3);
        let error = progress
            .step_in("Failing", Some("core"), || -> BuildResult<()> { Err(BuildError::EmptyProjectOrder) })
            .unwrap_err();
        assert!(matches!(error, BuildError::EmptyProjectOrder));
    }

    #[test]
    fn test_interactive_token_repaints_attached_spinner() {
        let token = ProgressToken::new(true);
        token.attach(Some(ProgressBar::hidden()));
        let before = token.next_frame.get();
        assert!(!token.is_cancellation_requested());
        assert!(token.next_frame.get() > before);
        // within the frame interval nothing is repainted
        let scheduled = token.next_frame.get();
        assert!(!token.is_cancellation_requested());
        assert_eq!(token.next_frame.get(), scheduled);
    }
}

use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

pub struct StepSpinner {
    bar: Option<ProgressBar>,
    start: Instant,
    step: usize,
    total_steps: usize,
    step_start: Instant,
}

impl StepSpinner {
    pub fn new(total_steps: usize) -> Self {
        let now = Instant::now();
        Self {
            bar: None,
            start: now,
            step: 0,
            total_steps,
            step_start: now,
        }
    }

    pub fn step(&mut self, description: &str) {
        self.clear();

        self.step += 1;
        self.step_start = Instant::now();

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            bar.set_style(style.tick_chars(TICK_CHARS));
        }
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(format!(
            "[{}/{}] {}...",
            self.step, self.total_steps, description
        ));

        self.bar = Some(bar);
    }

    pub fn complete_step(&mut self, description: &str, substeps: &[String]) {
        self.clear();
        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            description,
            self.step_start.elapsed().as_secs_f64()
        );
        for substep in substeps {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", substep);
        }
    }

    pub fn fail_step(&mut self, description: &str, reason: &str) {
        self.clear();
        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[31m✗\x1b[0m {:<44} {:>5.1}s",
            description,
            self.step_start.elapsed().as_secs_f64()
        );
        let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", reason);
    }

    pub fn finish(mut self, failed: usize) {
        self.clear();
        print_footer(self.start.elapsed(), failed);
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn print_footer(elapsed: Duration, failed: usize) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(
        stderr,
        "  \x1b[2m╺━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╸\x1b[0m"
    );
    let _ = writeln!(stderr);
    let total = format!("Total: {:.2}s", elapsed.as_secs_f64());
    if failed == 0 {
        let _ = writeln!(stderr, "  \x1b[32m✓\x1b[0m Batching complete {total:>32}");
    } else {
        let _ = writeln!(
            stderr,
            "  \x1b[33m!\x1b[0m Finished with {failed} failed {:<10} {total:>20}",
            if failed == 1 { "directory" } else { "directories" }
        );
    }
    let _ = writeln!(stderr);
}

pub enum Progress {
    Interactive(StepSpinner),
    Silent,
}

impl Progress {
    pub fn new(interactive: bool, total_steps: usize) -> Self {
        if interactive {
            Self::Interactive(StepSpinner::new(total_steps))
        } else {
            Self::Silent
        }
    }

    pub fn step(&mut self, description: &str) {
        if let Self::Interactive(s) = self {
            s.step(description);
        }
    }

    pub fn complete_step(&mut self, description: &str, substeps: &[String]) {
        if let Self::Interactive(s) = self {
            s.complete_step(description, substeps);
        }
    }

    pub fn fail_step(&mut self, description: &str, reason: &str) {
        if let Self::Interactive(s) = self {
            s.fail_step(description, reason);
        }
    }

    pub fn finish(self, failed: usize) {
        if let Self::Interactive(s) = self {
            s.finish(failed);
        }
    }
}

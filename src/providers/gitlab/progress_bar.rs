use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::Level;

/// Progress indication for the three phases of a dashboard run
///
/// Bars are hidden while info logging is on, since log lines written under a
/// ticking bar get overdrawn.
pub struct PhaseProgress {
    pb: ProgressBar,
    hidden: bool,
}

impl PhaseProgress {
    /// Start Phase 1: latest pipeline and its jobs
    pub fn start_phase_1() -> Self {
        Self::start_phase_1_with(log::log_enabled!(Level::Info))
    }

    fn start_phase_1_with(hidden: bool) -> Self {
        let pb = spinner("Phase 1/3: Fetching latest pipeline and jobs...", hidden);
        Self { pb, hidden }
    }

    /// Finish Phase 1 and start Phase 2, a counted bar over the test reports
    pub fn finish_phase_1_start_phase_2(self, job_count: usize, report_count: usize) -> Self {
        self.pb
            .finish_with_message(format!("✓ Phase 1/3: Fetched {job_count} jobs"));

        let pb = ProgressBar::with_draw_target(Some(report_count as u64), draw_target(self.hidden));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message("Phase 2/3: Fetching test reports");
        if !self.hidden {
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
        }

        Self {
            pb,
            hidden: self.hidden,
        }
    }

    /// Advance the Phase 2 bar by one report
    pub fn report_fetched(&self) {
        self.pb.inc(1);
    }

    /// Finish Phase 2 and start Phase 3
    pub fn finish_phase_2_start_phase_3(self) -> Self {
        let fetched = self.pb.position();
        self.pb
            .finish_with_message(format!("✓ Phase 2/3: Fetched {fetched} test reports"));

        let pb = spinner("Phase 3/3: Aggregating dashboard data...", self.hidden);
        Self {
            pb,
            hidden: self.hidden,
        }
    }

    /// Finish Phase 3
    pub fn finish_phase_3(self) {
        self.pb
            .finish_with_message("✓ Phase 3/3: Dashboard data ready");
    }
}

fn draw_target(hidden: bool) -> ProgressDrawTarget {
    if hidden {
        ProgressDrawTarget::hidden()
    } else {
        ProgressDrawTarget::stderr()
    }
}

fn spinner(message: &'static str, hidden: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(draw_target(hidden));
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    if !hidden {
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_stay_hidden_through_all_phases_when_logging() {
        let progress = PhaseProgress::start_phase_1_with(true);
        assert!(progress.pb.is_hidden());

        let progress = progress.finish_phase_1_start_phase_2(3, 2);
        assert!(progress.pb.is_hidden());
        progress.report_fetched();
        progress.report_fetched();
        assert_eq!(progress.pb.position(), 2);

        let progress = progress.finish_phase_2_start_phase_3();
        assert!(progress.pb.is_hidden());
        progress.finish_phase_3();
    }

    #[test]
    fn hidden_draw_target_is_hidden() {
        assert!(draw_target(true).is_hidden());
    }
}

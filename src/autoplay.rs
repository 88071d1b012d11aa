// Autoplay timer
//
// Tracks when the next automatic advance is due. The timer does not sleep on its
// own; the carousel driver sleeps until `deadline()` and then calls `poll()`.

use std::time::Duration;
use tokio::time::Instant;

/// Fixed-period auto-advance timer, suspended by hover or a hidden page.
///
/// The phase restarts from zero on every committed index change, so each slide
/// gets the same dwell time however it was reached. Suspending drops the phase;
/// resuming starts a fresh period.
#[derive(Debug, Clone)]
pub struct AutoplayTimer {
    period: Duration,
    enabled: bool,
    hovered: bool,
    hidden: bool,
    phase_start: Option<Instant>,
}

impl AutoplayTimer {
    /// Create a stopped timer
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            enabled: false,
            hovered: false,
            hidden: false,
            phase_start: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enabled and neither hovered nor hidden
    pub fn is_running(&self) -> bool {
        self.phase_start.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        self.enabled = true;
        self.sync(now);
        tracing::debug!("Autoplay started, period {:?}", self.period);
    }

    pub fn stop(&mut self) {
        self.enabled = false;
        self.phase_start = None;
        tracing::debug!("Autoplay stopped");
    }

    /// Suspend for hover. Returns true if the timer was running.
    pub fn pause(&mut self, now: Instant) -> bool {
        let was_running = self.is_running();
        self.hovered = true;
        self.sync(now);
        was_running
    }

    /// End a hover suspension. Returns true if the timer is running again.
    pub fn resume(&mut self, now: Instant) -> bool {
        let was_running = self.is_running();
        self.hovered = false;
        self.sync(now);
        !was_running && self.is_running()
    }

    /// Track page visibility. Returns true if the running state changed.
    pub fn set_visible(&mut self, visible: bool, now: Instant) -> bool {
        let was_running = self.is_running();
        self.hidden = !visible;
        self.sync(now);
        was_running != self.is_running()
    }

    /// Restart the period from `now`; no effect while not running
    pub fn reset_on_index_change(&mut self, now: Instant) {
        if self.phase_start.is_some() {
            self.phase_start = Some(now);
        }
    }

    /// Instant of the next advance
    pub fn deadline(&self) -> Option<Instant> {
        self.phase_start.map(|start| start + self.period)
    }

    /// True if an advance is due at `now`; the next period starts at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.phase_start = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Fraction of the current period elapsed, for progress indicators.
    ///
    /// Zero while not running.
    pub fn progress(&self, now: Instant) -> f32 {
        match self.phase_start {
            Some(start) if !self.period.is_zero() => {
                let elapsed = now.saturating_duration_since(start);
                (elapsed.as_secs_f32() / self.period.as_secs_f32()).min(1.0)
            }
            _ => 0.0,
        }
    }

    fn sync(&mut self, now: Instant) {
        let should_run = self.enabled && !self.hovered && !self.hidden;
        match (should_run, self.phase_start.is_some()) {
            (true, false) => self.phase_start = Some(now),
            (false, true) => self.phase_start = None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(4500);

    #[test]
    fn test_new_timer_is_stopped() {
        let timer = AutoplayTimer::new(PERIOD);
        assert!(!timer.is_running());
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.progress(Instant::now()), 0.0);
    }

    #[test]
    fn test_fires_once_per_period() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(PERIOD);
        timer.start(t0);

        assert!(!timer.poll(t0 + Duration::from_millis(4499)));
        assert!(timer.poll(t0 + PERIOD));
        assert!(!timer.poll(t0 + PERIOD + Duration::from_millis(10)));
        assert_eq!(timer.deadline(), Some(t0 + PERIOD * 2));
    }

    #[test]
    fn test_index_change_restarts_phase() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(PERIOD);
        timer.start(t0);

        let jump_at = t0 + Duration::from_millis(3000);
        timer.reset_on_index_change(jump_at);

        assert_eq!(timer.progress(jump_at), 0.0);
        assert!(!timer.poll(t0 + PERIOD));
        assert_eq!(timer.deadline(), Some(jump_at + PERIOD));
    }

    #[test]
    fn test_pause_and_resume_restart_from_zero() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(PERIOD);
        timer.start(t0);

        assert!(timer.pause(t0 + Duration::from_millis(2000)));
        assert!(!timer.poll(t0 + PERIOD * 3));
        assert_eq!(timer.progress(t0 + Duration::from_millis(2500)), 0.0);

        let resumed = t0 + Duration::from_millis(6000);
        assert!(timer.resume(resumed));
        assert_eq!(timer.progress(resumed), 0.0);
        assert_eq!(timer.deadline(), Some(resumed + PERIOD));
    }

    #[test]
    fn test_hidden_page_suspends_even_without_hover() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(PERIOD);
        timer.start(t0);

        assert!(timer.set_visible(false, t0));
        assert!(!timer.is_running());

        // un-hovering does not restart a hidden page
        assert!(!timer.resume(t0));
        assert!(!timer.is_running());

        assert!(timer.set_visible(true, t0));
        assert!(timer.is_running());
    }

    #[test]
    fn test_stop_ignores_resume() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(PERIOD);
        timer.start(t0);
        timer.stop();

        assert!(!timer.resume(t0));
        assert!(!timer.is_running());
        assert!(!timer.poll(t0 + PERIOD));
    }

    #[test]
    fn test_progress_is_clamped() {
        let t0 = Instant::now();
        let mut timer = AutoplayTimer::new(PERIOD);
        timer.start(t0);

        assert!((timer.progress(t0 + Duration::from_millis(2250)) - 0.5).abs() < 1e-4);
        assert_eq!(timer.progress(t0 + PERIOD * 2), 1.0);
    }
}

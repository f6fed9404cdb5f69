// Play clock that can be paused without counting the paused time

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct PlayTimer {
    accumulated: Duration,         // Time banked before the current run
    running_since: Option<Instant>, // Set while the clock runs
    paused: bool,
}

impl PlayTimer {
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    pub fn resume(&mut self) {
        self.resume_at(Instant::now());
    }

    /// Freeze the clock for good (game over)
    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    #[cfg(test)]
    pub fn reset(&mut self) {
        *self = PlayTimer::default();
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn start_at(&mut self, now: Instant) {
        self.accumulated = Duration::ZERO;
        self.running_since = Some(now);
        self.paused = false;
    }

    pub(crate) fn pause_at(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
            self.paused = true;
        }
    }

    pub(crate) fn resume_at(&mut self, now: Instant) {
        if self.paused {
            self.running_since = Some(now);
            self.paused = false;
        }
    }

    pub(crate) fn stop_at(&mut self, now: Instant) {
        self.pause_at(now);
        self.paused = false;
    }

    pub(crate) fn elapsed_at(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .running_since
                .map(|since| now.saturating_duration_since(since))
                .unwrap_or_default()
    }
}

/// Render a duration as `m:ss.mmm`, or `h:mm:ss.mmm` past the hour
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    if hours == 0 {
        format!("{minutes}:{seconds:02}.{millis:03}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_time_is_not_counted() {
        let t0 = Instant::now();
        let mut timer = PlayTimer::default();
        timer.start_at(t0);
        timer.pause_at(t0 + Duration::from_secs(2));
        assert!(timer.is_paused());
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_at(t0 + Duration::from_secs(9)), Duration::from_secs(2));
        timer.resume_at(t0 + Duration::from_secs(10));
        assert_eq!(timer.elapsed_at(t0 + Duration::from_secs(11)), Duration::from_secs(3));
    }

    #[test]
    fn stop_freezes_and_resume_does_not_restart() {
        let t0 = Instant::now();
        let mut timer = PlayTimer::default();
        timer.start_at(t0);
        timer.stop_at(t0 + Duration::from_millis(1500));
        timer.resume_at(t0 + Duration::from_secs(5));
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_at(t0 + Duration::from_secs(60)), Duration::from_millis(1500));
    }

    #[test]
    fn reset_clears_everything() {
        let mut timer = PlayTimer::default();
        timer.start();
        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }

    #[test]
    fn formats_minutes_and_hours() {
        assert_eq!(format_elapsed(Duration::from_millis(0)), "0:00.000");
        assert_eq!(format_elapsed(Duration::from_millis(65_042)), "1:05.042");
        assert_eq!(format_elapsed(Duration::from_millis(3_723_004)), "1:02:03.004");
    }
}

//! Stopwatch.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::component::{Component, ComponentRef, Finalizer, text};

/// Shows the time elapsed since `start`, in tenths of a second.
///
/// Finalizing stops the clock.
pub struct Stopwatch {
    start: Instant,
    stopped: Mutex<Option<Instant>>,
}

impl Stopwatch {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            stopped: Mutex::new(None),
        }
    }

    pub fn elapsed(&self) -> Duration {
        let stopped = *self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        stopped
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.start)
    }
}

impl Component for Stopwatch {
    fn body(&self) -> Option<ComponentRef> {
        Some(Arc::new(text(format_elapsed(self.elapsed()))))
    }

    fn as_finalizer(&self) -> Option<&dyn Finalizer> {
        Some(self)
    }
}

impl Finalizer for Stopwatch {
    fn finalize(&self) {
        self.stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert_with(Instant::now);
    }
}

pub fn stopwatch(start: Instant) -> Stopwatch {
    Stopwatch::new(start)
}

/// Format `elapsed`, truncated to 100ms, as `300ms`, `1.5s`, `2m0s` or
/// `1h0m7.2s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let tenths = elapsed.as_millis() / 100;
    if tenths == 0 {
        return "0s".to_string();
    }
    if tenths < 10 {
        return format!("{}ms", tenths * 100);
    }

    let secs = tenths / 10;
    let fraction = tenths % 10;
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&seconds.to_string());
    if fraction > 0 {
        out.push_str(&format!(".{fraction}"));
    }
    out.push('s');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        let cases = [
            (0, "0s"),
            (99, "0s"),
            (300, "300ms"),
            (1_000, "1s"),
            (1_234, "1.2s"),
            (62_300, "1m2.3s"),
            (120_000, "2m0s"),
            (3_607_200, "1h0m7.2s"),
        ];
        for (millis, want) in cases {
            assert_eq!(format_elapsed(Duration::from_millis(millis)), want, "{millis}ms");
        }
    }

    #[test]
    fn test_finalized_stopwatch_stops() {
        let start = Instant::now() - Duration::from_secs(3);
        let watch = stopwatch(start);
        watch.finalize();
        let frozen = watch.elapsed();

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(watch.elapsed(), frozen);
        assert!(frozen >= Duration::from_secs(3));
        assert_eq!(
            watch.body().unwrap().render(0, 0),
            format_elapsed(frozen)
        );
    }
}

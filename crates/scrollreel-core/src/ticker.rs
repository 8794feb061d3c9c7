//! The single frame clock shared by smooth scrolling, scroll triggers and
//! tweens
//!
//! Every subsystem reads the same [`Frame`], so scroll emulation and
//! animation can never drift apart.

use std::time::Duration;

use serde::Serialize;

use crate::config::TickerConfig;

/// One tick of the shared clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub index: u64,
    /// Seconds of clock time since the first frame
    pub time: f64,
    /// Seconds since the previous frame, after lag smoothing
    pub delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LagSmoothing {
    threshold: f64,
    adjusted: f64,
}

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    lag: Option<LagSmoothing>,
    interval: Duration,
    last_now: Option<f64>,
    time: f64,
    index: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(&TickerConfig::default())
    }
}

impl FrameScheduler {
    pub fn new(config: &TickerConfig) -> Self {
        let lag = config.lag_smoothing.then(|| LagSmoothing {
            threshold: config.lag_threshold_ms as f64 / 1000.0,
            adjusted: config.adjusted_lag_ms as f64 / 1000.0,
        });
        let interval = if config.fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_micros(1_000_000 / config.fps as u64)
        };
        Self {
            lag,
            interval,
            last_now: None,
            time: 0.0,
            index: 0,
        }
    }

    /// Target time between frames for a real-time driver
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn lag_smoothing(&self) -> bool {
        self.lag.is_some()
    }

    /// Produce the next frame for host time `now` (seconds, monotonic)
    ///
    /// The first frame has a zero delta. With lag smoothing off, long gaps
    /// pass through unchanged so animation catches up in one step.
    pub fn advance(&mut self, now: f64) -> Frame {
        let raw = self.last_now.map_or(0.0, |last| (now - last).max(0.0));
        self.last_now = Some(now);

        let delta = match self.lag {
            Some(lag) if raw > lag.threshold => lag.adjusted,
            _ => raw,
        };
        self.time += delta;
        self.index += 1;

        Frame {
            index: self.index,
            time: self.time,
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_has_zero_delta() {
        let mut ticker = FrameScheduler::default();
        let frame = ticker.advance(12.0);
        assert_eq!(frame.index, 1);
        assert_eq!(frame.delta, 0.0);
        assert_eq!(frame.time, 0.0);
    }

    #[test]
    fn test_long_gap_passes_through_without_lag_smoothing() {
        let mut ticker = FrameScheduler::default();
        assert!(!ticker.lag_smoothing());
        ticker.advance(0.0);
        let frame = ticker.advance(2.0);
        assert_eq!(frame.delta, 2.0);
        assert_eq!(frame.time, 2.0);
    }

    #[test]
    fn test_lag_smoothing_clamps_long_gap() {
        let config = TickerConfig {
            lag_smoothing: true,
            ..Default::default()
        };
        let mut ticker = FrameScheduler::new(&config);
        ticker.advance(0.0);
        let frame = ticker.advance(2.0);
        assert!((frame.delta - 0.033).abs() < 1e-9);
        let frame = ticker.advance(2.25);
        assert!((frame.delta - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_time_never_runs_backwards() {
        let mut ticker = FrameScheduler::default();
        ticker.advance(5.0);
        let frame = ticker.advance(4.0);
        assert_eq!(frame.delta, 0.0);
    }

    #[test]
    fn test_interval_from_fps() {
        let config = TickerConfig {
            fps: 50,
            ..Default::default()
        };
        assert_eq!(FrameScheduler::new(&config).interval(), Duration::from_millis(20));
    }
}

//! Smooth scroll emulation
//!
//! Raw wheel input moves a target position; the virtual scroll position
//! chases it once per frame, either by exponential damping (`lerp` mode)
//! or along an eased curve of fixed duration. Call `scroll_by()` for input
//! and `raf()` every frame; `raf()` reports the new position only when it
//! moved, which is the signal scroll triggers recompute on.

use tracing::trace;

use crate::config::ScrollConfig;
use crate::easing::Ease;
use crate::ticker::Frame;
use crate::timing::{damp, lerp};

/// Snap distance for damped scrolling, in px
const SETTLE_PX: f64 = 0.5;

/// Active fixed-duration scroll animation
#[derive(Debug, Clone)]
struct ActiveAnimation {
    /// Clock time the animation started
    start: f64,
    from: f64,
    to: f64,
    duration: f64,
    easing: Ease,
}

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    config: ScrollConfig,
    /// Current fixed-duration animation (if any)
    animation: Option<ActiveAnimation>,
    /// Virtual scroll position, always up-to-date
    current: f64,
    /// Where the position is heading
    target: f64,
    /// Maximum scroll position
    limit: f64,
    /// Wheel delta accumulated since the last frame
    pending_delta: f64,
}

impl Default for SmoothScroll {
    fn default() -> Self {
        Self::new(ScrollConfig::default(), 0.0)
    }
}

impl SmoothScroll {
    pub fn new(config: ScrollConfig, limit: f64) -> Self {
        Self {
            config,
            animation: None,
            current: 0.0,
            target: 0.0,
            limit: limit.max(0.0),
            pending_delta: 0.0,
        }
    }

    /// Update the maximum scroll position, e.g. after a layout refresh
    pub fn set_limit(&mut self, limit: f64) {
        self.limit = limit.max(0.0);
        self.target = self.target.min(self.limit);
        self.current = self.current.min(self.limit);
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    fn is_smooth(&self) -> bool {
        self.config.smooth_enabled && (self.config.duration_ms > 0 || self.config.lerp > 0.0)
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some() || (self.current - self.target).abs() > 0.0
    }

    /// Whether the next `raf()` may move the position
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.is_animating() || self.pending_delta != 0.0
    }

    #[inline]
    pub fn current_scroll(&self) -> f64 {
        self.current
    }

    pub fn target_scroll(&self) -> f64 {
        self.target
    }

    /// Jump to `position` immediately (no animation)
    pub fn set_scroll(&mut self, position: f64) {
        let position = position.clamp(0.0, self.limit);
        self.animation = None;
        self.pending_delta = 0.0;
        self.current = position;
        self.target = position;
    }

    /// Queue raw wheel input (positive scrolls down)
    ///
    /// Multiple inputs within one frame are batched together.
    pub fn scroll_by(&mut self, delta: f64) {
        self.pending_delta += delta * self.config.wheel_multiplier;
    }

    /// Aim at an absolute position
    pub fn scroll_to(&mut self, position: f64) {
        self.pending_delta = position - self.target;
    }

    /// Advance one frame; returns the new position if it moved
    pub fn raf(&mut self, frame: &Frame) -> Option<f64> {
        let previous = self.current;

        if self.pending_delta != 0.0 {
            let new_target = (self.target + self.pending_delta).clamp(0.0, self.limit);
            self.pending_delta = 0.0;
            self.target = new_target;

            if !self.is_smooth() {
                self.current = new_target;
                self.animation = None;
            } else if self.config.duration_ms > 0 {
                // A retarget onto the current position stops the running animation
                self.animation = (new_target != self.current).then(|| ActiveAnimation {
                    start: frame.time,
                    from: self.current,
                    to: new_target,
                    duration: self.config.duration_ms as f64 / 1000.0,
                    easing: self.config.easing,
                });
            }
        }

        if let Some(ref anim) = self.animation {
            let t = (frame.time - anim.start) / anim.duration;
            if t >= 1.0 {
                self.current = anim.to;
                self.animation = None;
            } else {
                self.current = lerp(anim.from, anim.to, anim.easing.apply(t));
            }
        } else if self.current != self.target {
            let next = damp(self.current, self.target, self.config.lerp * 60.0, frame.delta);
            self.current = if (self.target - next).abs() < SETTLE_PX {
                self.target
            } else {
                next
            };
        }

        if self.current != previous {
            trace!(position = self.current, target = self.target, "Virtual scroll moved");
            Some(self.current)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(scroll: &mut SmoothScroll, count: u64) -> Vec<Option<f64>> {
        (1..=count)
            .map(|i| {
                scroll.raf(&Frame {
                    index: i,
                    time: i as f64 / 60.0,
                    delta: 1.0 / 60.0,
                })
            })
            .collect()
    }

    #[test]
    fn test_instant_scroll_when_disabled() {
        let config = ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        };
        let mut scroll = SmoothScroll::new(config, 2000.0);
        scroll.scroll_by(100.0);
        assert_eq!(frames(&mut scroll, 1), vec![Some(100.0)]);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_lerp_converges_to_target() {
        let mut scroll = SmoothScroll::new(ScrollConfig::default(), 2000.0);
        scroll.scroll_by(300.0);
        let positions = frames(&mut scroll, 240);

        let first = positions[0].unwrap();
        assert!(first > 0.0 && first < 300.0);
        assert_eq!(scroll.current_scroll(), 300.0);
        assert!(!scroll.needs_update());
        assert_eq!(*positions.last().unwrap(), None);
    }

    #[test]
    fn test_batching_within_frame() {
        let config = ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        };
        let mut scroll = SmoothScroll::new(config, 2000.0);
        scroll.scroll_by(10.0);
        scroll.scroll_by(10.0);
        scroll.scroll_by(10.0);
        frames(&mut scroll, 1);
        assert_eq!(scroll.target_scroll(), 30.0);
    }

    #[test]
    fn test_target_clamped_to_limit() {
        let mut scroll = SmoothScroll::new(ScrollConfig::default(), 100.0);
        scroll.scroll_by(500.0);
        frames(&mut scroll, 1);
        assert_eq!(scroll.target_scroll(), 100.0);
        scroll.scroll_by(-1000.0);
        frames(&mut scroll, 1);
        assert_eq!(scroll.target_scroll(), 0.0);
    }

    #[test]
    fn test_duration_mode_finishes_on_time() {
        let config = ScrollConfig {
            duration_ms: 500,
            ..Default::default()
        };
        let mut scroll = SmoothScroll::new(config, 2000.0);
        scroll.scroll_to(600.0);
        let positions = frames(&mut scroll, 40);
        assert!(positions[0].is_none() || positions[0].unwrap() < 600.0);
        assert_eq!(scroll.current_scroll(), 600.0);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_retarget_to_current_position_stops_animation() {
        let config = ScrollConfig {
            duration_ms: 1000,
            ..Default::default()
        };
        let mut scroll = SmoothScroll::new(config, 2000.0);
        scroll.scroll_to(600.0);
        let mut index = 0;
        let mut step = |scroll: &mut SmoothScroll| {
            index += 1;
            scroll.raf(&Frame {
                index,
                time: index as f64 / 60.0,
                delta: 1.0 / 60.0,
            })
        };
        for _ in 0..20 {
            step(&mut scroll);
        }
        let halted = scroll.current_scroll();
        assert!(halted > 0.0 && halted < 600.0);

        scroll.scroll_to(halted);
        let mut furthest = halted;
        for _ in 0..600 {
            if let Some(position) = step(&mut scroll) {
                furthest = furthest.max(position);
            }
        }
        assert_eq!(scroll.current_scroll(), halted);
        assert_eq!(furthest, halted);
        assert!(!scroll.is_animating());
    }

    #[test]
    fn test_no_report_when_still() {
        let mut scroll = SmoothScroll::new(ScrollConfig::default(), 2000.0);
        assert_eq!(frames(&mut scroll, 3), vec![None, None, None]);
    }

    #[test]
    fn test_set_limit_pulls_position_back() {
        let mut scroll = SmoothScroll::new(ScrollConfig::default(), 2000.0);
        scroll.set_scroll(1500.0);
        scroll.set_limit(1000.0);
        assert_eq!(scroll.current_scroll(), 1000.0);
    }
}

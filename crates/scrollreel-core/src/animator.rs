//! Fire-and-forget tweens driven by the frame clock
//!
//! Used for transitions that are triggered by scroll events rather than
//! scheduled up front. Starting a tween kills any older tween still writing
//! the same element and property, so the latest request always wins.

use tracing::trace;

use crate::style::StyleSink;
use crate::timeline::{Track, Tween};

#[derive(Debug, Default)]
pub struct Animator {
    clock: f64,
    tracks: Vec<Track>,
    started: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `tween` now (plus its own delay and stagger)
    pub fn play(&mut self, tween: &Tween) {
        let start = (self.clock + tween.delay).max(self.clock);
        let fresh = tween.tracks(0, start);

        let before = self.tracks.len();
        self.tracks.retain(|old| {
            !fresh
                .iter()
                .any(|new| new.target == old.target && new.property == old.property)
        });
        let killed = before - self.tracks.len();
        if killed > 0 {
            trace!(killed, "Overwrote running tweens");
        }

        self.tracks.extend(fresh);
        self.started += 1;
    }

    /// Advance the clock and render every started track
    pub fn advance<S: StyleSink + ?Sized>(&mut self, dt: f64, sink: &mut S) {
        self.clock += dt.max(0.0);
        let clock = self.clock;
        for track in &mut self.tracks {
            track.render(clock, sink);
        }
        self.tracks.retain(|t| !t.is_done());
    }

    /// Jump far enough ahead that every running tween completes
    pub fn finish_all<S: StyleSink + ?Sized>(&mut self, sink: &mut S) {
        if let Some(end) = self.tracks.iter().map(Track::end).reduce(f64::max) {
            self.clock = self.clock.max(end);
        }
        for track in &mut self.tracks {
            track.render(f64::INFINITY, sink);
        }
        self.tracks.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn active_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Number of tweens started since creation
    pub fn started(&self) -> u64 {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ElementId;
    use crate::easing::Ease;
    use crate::style::{Property, StyleStore, Value};

    fn slide(target: ElementId, to: f64, duration: f64) -> Tween {
        Tween::new(vec![target])
            .to(Property::X, Value::Px(to))
            .duration(duration)
            .ease(Ease::Linear)
    }

    #[test]
    fn test_tween_runs_to_completion() {
        let target = ElementId(2);
        let mut store = StyleStore::new();
        let mut animator = Animator::new();

        animator.play(&slide(target, 40.0, 0.5));
        animator.advance(0.25, &mut store);
        assert_eq!(store.computed(target, Property::X), Value::Px(20.0));
        animator.advance(0.25, &mut store);
        assert_eq!(store.computed(target, Property::X), Value::Px(40.0));
        assert!(animator.is_idle());
    }

    #[test]
    fn test_delay_postpones_start() {
        let target = ElementId(2);
        let mut store = StyleStore::new();
        let mut animator = Animator::new();

        animator.play(&slide(target, 40.0, 0.5).delay(0.25));
        animator.advance(0.125, &mut store);
        assert!(store.get(target, Property::X).is_none());
        animator.advance(0.375, &mut store);
        assert_eq!(store.computed(target, Property::X), Value::Px(20.0));
    }

    #[test]
    fn test_latest_tween_wins() {
        let target = ElementId(2);
        let mut store = StyleStore::new();
        let mut animator = Animator::new();

        animator.play(&slide(target, 100.0, 1.0));
        animator.advance(0.5, &mut store);
        assert_eq!(store.computed(target, Property::X), Value::Px(50.0));

        animator.play(&slide(target, 0.0, 0.5));
        assert_eq!(animator.active_tracks(), 1);
        animator.finish_all(&mut store);
        assert_eq!(store.computed(target, Property::X), Value::Px(0.0));
        assert_eq!(animator.started(), 2);
    }

    #[test]
    fn test_other_properties_survive_overwrite() {
        let target = ElementId(2);
        let mut animator = Animator::new();

        animator.play(
            &Tween::new(vec![target])
                .to(Property::Opacity, Value::Number(0.0))
                .duration(1.0),
        );
        animator.play(&slide(target, 40.0, 1.0));
        assert_eq!(animator.active_tracks(), 2);
    }
}

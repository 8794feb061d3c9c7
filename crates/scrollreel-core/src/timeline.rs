//! Deterministic timelines
//!
//! A [`Timeline`] is built from tweens placed with a [`Position`]. Every
//! position resolves against the timeline's own accumulated duration at
//! the moment the step is added, so the resulting schedule depends only on
//! the order and content of the steps. Nested timelines are flattened when
//! added.
//!
//! A [`Playhead`] renders a timeline into a [`StyleSink`] as time moves
//! forward.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::document::ElementId;
use crate::easing::Ease;
use crate::style::{Property, StyleSink, Value};
use crate::{Error, Result};

/// Where a step starts
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Position {
    /// At the current end of the timeline
    #[default]
    End,
    /// At an absolute time in seconds
    Absolute(f64),
    /// Offset from the current end (`+=1`, `-=0.5`)
    FromEnd(f64),
    /// Offset from the previous step's start (`<`, `<0.2`)
    PreviousStart(f64),
    /// Offset from the previous step's end (`>`, `>-0.2`)
    PreviousEnd(f64),
    /// Offset from a named label (`intro`, `intro+=0.5`)
    Label(String, f64),
}

fn parse_offset(raw: &str, whole: &str) -> Result<f64> {
    let invalid = || Error::InvalidPosition(whole.to_string());
    if raw.is_empty() {
        return Ok(0.0);
    }
    if let Some(n) = raw.strip_prefix("+=") {
        return n.trim().parse::<f64>().map_err(|_| invalid());
    }
    if let Some(n) = raw.strip_prefix("-=") {
        return n.trim().parse::<f64>().map(|v| -v).map_err(|_| invalid());
    }
    raw.trim().parse::<f64>().map_err(|_| invalid())
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Position::End);
        }
        if s.starts_with("+=") || s.starts_with("-=") {
            return Ok(Position::FromEnd(parse_offset(s, s)?));
        }
        if let Some(rest) = s.strip_prefix('<') {
            return Ok(Position::PreviousStart(parse_offset(rest, s)?));
        }
        if let Some(rest) = s.strip_prefix('>') {
            return Ok(Position::PreviousEnd(parse_offset(rest, s)?));
        }
        if let Ok(t) = s.parse::<f64>() {
            return Ok(Position::Absolute(t));
        }

        let split_at = s.find("+=").or_else(|| s.find("-="));
        let (name, offset) = match split_at {
            Some(idx) => (&s[..idx], parse_offset(&s[idx..], s)?),
            None => (s, 0.0),
        };
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::InvalidPosition(s.to_string()));
        }
        Ok(Position::Label(name.to_string(), offset))
    }
}

/// A property change applied to one or more targets
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub targets: Vec<ElementId>,
    pub props: Vec<(Property, Value)>,
    pub duration: f64,
    pub ease: Ease,
    /// Delay added per target, in target order
    pub stagger: f64,
    /// Shift applied on top of the resolved position; may be negative
    pub delay: f64,
}

impl Tween {
    /// Tween with the default half-second duration
    pub fn new(targets: impl Into<Vec<ElementId>>) -> Self {
        Self {
            targets: targets.into(),
            props: Vec::new(),
            duration: 0.5,
            ease: Ease::default(),
            stagger: 0.0,
            delay: 0.0,
        }
    }

    /// Zero-duration change
    pub fn set(targets: impl Into<Vec<ElementId>>) -> Self {
        Self::new(targets).duration(0.0)
    }

    pub fn to(mut self, property: Property, value: Value) -> Self {
        self.props.push((property, value));
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn stagger(mut self, seconds: f64) -> Self {
        self.stagger = seconds;
        self
    }

    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    /// Length from the first target's start to the last target's end
    pub fn span(&self) -> f64 {
        let extra = self.targets.len().saturating_sub(1) as f64 * self.stagger;
        self.duration + extra
    }

    /// One track per target and property, starting from `start`
    pub(crate) fn tracks(&self, step: usize, start: f64) -> Vec<Track> {
        self.targets
            .iter()
            .enumerate()
            .flat_map(|(i, target)| {
                let target_start = start + i as f64 * self.stagger;
                self.props.iter().map(move |(property, value)| Track {
                    step,
                    target: *target,
                    property: *property,
                    to: value.clone(),
                    start: target_start,
                    duration: self.duration,
                    ease: self.ease,
                    from: None,
                    done: false,
                })
            })
            .collect()
    }
}

/// One target/property pair of a tween, placed in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub step: usize,
    pub target: ElementId,
    pub property: Property,
    pub to: Value,
    pub start: f64,
    pub duration: f64,
    #[serde(serialize_with = "serialize_ease")]
    pub ease: Ease,
    #[serde(skip)]
    from: Option<Value>,
    #[serde(skip)]
    done: bool,
}

fn serialize_ease<S: serde::Serializer>(ease: &Ease, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&ease.to_string())
}

impl Track {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Write this track's value at `time`
    ///
    /// The starting value is read from the sink the first time the track
    /// renders. Returns `false` when `time` is before the start.
    pub(crate) fn render<S: StyleSink + ?Sized>(&mut self, time: f64, sink: &mut S) -> bool {
        if time < self.start || self.done {
            return false;
        }
        let from = self
            .from
            .get_or_insert_with(|| sink.computed(self.target, self.property))
            .clone();

        let t = if self.duration <= 0.0 {
            1.0
        } else {
            ((time - self.start) / self.duration).clamp(0.0, 1.0)
        };
        let value = if t >= 1.0 {
            self.done = true;
            from.interpolate(&self.to, 1.0)
        } else {
            from.interpolate(&self.to, self.ease.apply(t))
        };
        sink.set(self.target, self.property, value);
        true
    }
}

/// Named span of a step inside a timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSpan {
    pub name: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    delay: f64,
    steps: Vec<StepSpan>,
    tracks: Vec<Track>,
    labels: HashMap<String, f64>,
    duration: f64,
    prev_start: f64,
    prev_end: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline whose playback starts after `delay` seconds
    pub fn with_delay(delay: f64) -> Self {
        Self {
            delay: delay.max(0.0),
            ..Self::default()
        }
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// End of the last step, excluding the timeline delay
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// End of the last step, including the timeline delay
    pub fn total_duration(&self) -> f64 {
        self.delay + self.duration
    }

    pub fn steps(&self) -> &[StepSpan] {
        &self.steps
    }

    pub fn step(&self, name: &str) -> Option<&StepSpan> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Tracks in insertion order, times local to the timeline
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn label(&self, name: &str) -> Option<f64> {
        self.labels.get(name).copied()
    }

    fn resolve(&self, position: &Position) -> Result<f64> {
        let at = match position {
            Position::End => self.duration,
            Position::Absolute(t) => *t,
            Position::FromEnd(offset) => self.duration + offset,
            Position::PreviousStart(offset) => self.prev_start + offset,
            Position::PreviousEnd(offset) => self.prev_end + offset,
            Position::Label(name, offset) => {
                let label = self
                    .labels
                    .get(name)
                    .ok_or_else(|| Error::UnknownLabel(name.clone()))?;
                label + offset
            }
        };
        Ok(at.max(0.0))
    }

    fn push_span(&mut self, name: &str, start: f64, end: f64) {
        self.steps.push(StepSpan {
            name: name.to_string(),
            start,
            end,
        });
        self.prev_start = start;
        self.prev_end = end;
        self.duration = self.duration.max(end);
    }

    /// Place a tween at `position`
    pub fn to(&mut self, name: &str, tween: Tween, position: Position) -> Result<&mut Self> {
        let start = (self.resolve(&position)? + tween.delay).max(0.0);
        let end = start + tween.span();
        let step = self.steps.len();
        self.tracks.extend(tween.tracks(step, start));
        self.push_span(name, start, end);
        Ok(self)
    }

    /// Place a zero-duration change at `position`
    pub fn set(&mut self, name: &str, tween: Tween, position: Position) -> Result<&mut Self> {
        self.to(name, tween.duration(0.0), position)
    }

    /// Flatten `child` into this timeline at `position`
    pub fn add(&mut self, name: &str, child: Timeline, position: Position) -> Result<&mut Self> {
        let offset = self.resolve(&position)? + child.delay;
        let step = self.steps.len();
        self.tracks.extend(child.tracks.into_iter().map(|mut track| {
            track.start += offset;
            track.step = step;
            track
        }));
        self.push_span(name, offset, offset + child.duration);
        Ok(self)
    }

    /// Record a label at `position` without adding a step
    pub fn add_label(&mut self, name: &str, position: Position) -> Result<&mut Self> {
        let at = self.resolve(&position)?;
        self.labels.insert(name.to_string(), at);
        Ok(self)
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "timeline: delay {:.2}s, duration {:.2}s",
            self.delay, self.duration
        )?;
        for span in &self.steps {
            writeln!(
                f,
                "  {:>6.2}s .. {:>6.2}s  {}",
                self.delay + span.start,
                self.delay + span.end,
                span.name
            )?;
        }
        Ok(())
    }
}

/// Forward-only renderer for a timeline
#[derive(Debug, Clone)]
pub struct Playhead {
    timeline: Timeline,
    tracks: Vec<Track>,
    time: f64,
}

impl Playhead {
    pub fn new(timeline: Timeline) -> Self {
        let mut tracks = timeline.tracks.clone();
        // Stable sort keeps insertion order for tracks that start together
        tracks.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self {
            timeline,
            tracks,
            time: 0.0,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_finished(&self) -> bool {
        self.time >= self.timeline.total_duration() && self.tracks.iter().all(Track::is_done)
    }

    /// Fraction of the total duration played, in [0, 1]
    pub fn progress(&self) -> f64 {
        let total = self.timeline.total_duration();
        if total <= 0.0 {
            1.0
        } else {
            (self.time / total).clamp(0.0, 1.0)
        }
    }

    pub fn advance<S: StyleSink + ?Sized>(&mut self, dt: f64, sink: &mut S) {
        self.seek(self.time + dt.max(0.0), sink);
    }

    /// Move to `time` (ignored if earlier than the current time) and render
    pub fn seek<S: StyleSink + ?Sized>(&mut self, time: f64, sink: &mut S) {
        if time < self.time {
            return;
        }
        self.time = time;
        let local = time - self.timeline.delay;
        for track in &mut self.tracks {
            if track.start > local {
                break;
            }
            track.render(local, sink);
        }
    }
}

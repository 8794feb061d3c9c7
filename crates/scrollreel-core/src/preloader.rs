//! Preloader sequence
//!
//! Runs once after fonts are ready: split the preloader and hero text,
//! hide every unit, then play one master timeline that reveals the logo,
//! fills the progress bar, wipes the preloader away and brings in the
//! hero.

use rand::Rng;
use tracing::{debug, info};

use crate::config::PreloaderConfig;
use crate::document::{Document, ElementId};
use crate::easing::Ease;
use crate::split::{split_selector, Granularity, SplitOptions, SplitText, TextSplitter};
use crate::style::{Property, StyleSink, Value};
use crate::timeline::{Playhead, Position, Timeline, Tween};
use crate::{Error, Result};

/// Label the button contents are scheduled at
pub const BUTTON_CONTENTS: &str = "button-contents";

/// Label, selector and granularity of every split the sequence animates
pub const SPLIT_TABLE: [(&str, &str, Granularity); 6] = [
    ("logo_chars", ".preloader-logo h1", Granularity::Chars),
    ("footer_lines", ".preloader-footer p", Granularity::Lines),
    ("header_chars", ".header h1", Granularity::Chars),
    ("hero_footer_h3", ".hero-footer h3", Granularity::Lines),
    ("hero_footer_p", ".hero-footer p", Granularity::Lines),
    ("button_labels", ".btn-label span", Granularity::Lines),
];

/// Source of the random part of each progress increment
pub trait IncrementSource {
    /// Next value in [0, 1)
    fn next_unit(&mut self) -> f64;
}

/// Increments drawn from any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomIncrements<R: Rng>(pub R);

impl<R: Rng> IncrementSource for RandomIncrements<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed list of values, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedIncrements {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedIncrements {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }
}

impl IncrementSource for ScriptedIncrements {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Text splits produced for the sequence
#[derive(Debug, Clone)]
pub struct PreloaderSplits {
    pub logo_chars: SplitText,
    pub footer_lines: SplitText,
    pub header_chars: SplitText,
    pub hero_footer_h3: SplitText,
    pub hero_footer_p: SplitText,
    pub button_labels: SplitText,
}

impl PreloaderSplits {
    /// Split every entry of [`SPLIT_TABLE`], masked
    pub fn create<T: TextSplitter + ?Sized>(doc: &mut Document, splitter: &mut T) -> Result<Self> {
        let mut splits = Vec::with_capacity(SPLIT_TABLE.len());
        for (label, selector, granularity) in SPLIT_TABLE {
            splits.push(split_selector(
                doc,
                splitter,
                label,
                selector,
                SplitOptions::masked(granularity),
            )?);
        }

        let mut splits = splits.into_iter();
        let mut next = || {
            splits
                .next()
                .ok_or_else(|| Error::Other("split table exhausted".to_string()))
        };
        Ok(Self {
            logo_chars: next()?,
            footer_lines: next()?,
            header_chars: next()?,
            hero_footer_h3: next()?,
            hero_footer_p: next()?,
            button_labels: next()?,
        })
    }

    /// Hero footer lines, heading first
    pub fn hero_footer_lines(&self) -> Vec<ElementId> {
        let mut lines = self.hero_footer_h3.units.clone();
        lines.extend_from_slice(&self.hero_footer_p.units);
        lines
    }
}

fn select(doc: &Document, selector: &str) -> Result<Vec<ElementId>> {
    let found = doc.query(selector)?;
    if found.is_empty() {
        return Err(Error::ElementNotFound(selector.to_string()));
    }
    Ok(found)
}

/// Hide every split unit and collapse the button
pub fn initial_state<S: StyleSink + ?Sized>(
    doc: &Document,
    splits: &PreloaderSplits,
    sink: &mut S,
) -> Result<()> {
    sink.set_all(&splits.logo_chars.units, Property::X, Value::Percent(100.0));
    for units in [
        &splits.footer_lines.units,
        &splits.header_chars.units,
        &splits.hero_footer_h3.units,
        &splits.hero_footer_p.units,
        &splits.button_labels.units,
    ] {
        sink.set_all(units, Property::Y, Value::Percent(100.0));
    }
    sink.set_all(&select(doc, ".btn-icon")?, Property::ClipCircle, Value::Percent(0.0));
    sink.set_all(&select(doc, ".btn")?, Property::Scale, Value::Number(0.0));
    sink.set_all(
        &select(doc, ".preloader-progress-bar")?,
        Property::ScaleX,
        Value::Number(0.0),
    );
    Ok(())
}

/// Scale targets of the progress bar fill, one per step
///
/// Every step but the last advances by `increment_min` plus a random share
/// of `increment_range`, capped at `increment_cap`; the last step is 1.
/// There is always at least one step.
pub fn fill_targets<I: IncrementSource + ?Sized>(
    config: &PreloaderConfig,
    source: &mut I,
) -> Vec<f64> {
    let steps = config.progress_steps.max(1);
    let mut current: f64 = 0.0;
    (0..steps)
        .map(|i| {
            current = if i + 1 == steps {
                1.0
            } else {
                let increment = config.increment_min + source.next_unit() * config.increment_range;
                (current + increment).min(config.increment_cap)
            };
            current
        })
        .collect()
}

/// Timeline filling `bar` in equal-length steps
pub fn progress_fill<I: IncrementSource + ?Sized>(
    bar: &[ElementId],
    config: &PreloaderConfig,
    source: &mut I,
) -> Result<Timeline> {
    let targets = fill_targets(config, source);
    let step_duration = if targets.is_empty() {
        0.0
    } else {
        config.progress_duration / targets.len() as f64
    };

    let mut tl = Timeline::new();
    for (i, target) in targets.iter().enumerate() {
        tl.to(
            &format!("fill-{}", i + 1),
            Tween::new(bar.to_vec())
                .to(Property::ScaleX, Value::Number(*target))
                .duration(step_duration)
                .ease(Ease::POWER2_OUT),
            Position::End,
        )?;
    }
    debug!(?targets, "Progress fill planned");
    Ok(tl)
}

/// The whole preloader sequence as one timeline
pub fn build_master<I: IncrementSource + ?Sized>(
    doc: &Document,
    splits: &PreloaderSplits,
    config: &PreloaderConfig,
    source: &mut I,
) -> Result<Timeline> {
    let progress = select(doc, ".preloader-progress")?;
    let bar = select(doc, ".preloader-progress-bar")?;
    let mask = select(doc, ".preloader-mask")?;
    let hero_img = select(doc, ".hero-img")?;
    let btn = select(doc, ".btn")?;
    let btn_icon = select(doc, ".btn-icon")?;

    let logo = &splits.logo_chars.units;
    let footer = &splits.footer_lines.units;

    let mut tl = Timeline::with_delay(config.delay);
    tl.to(
        "logo-in",
        Tween::new(logo.clone())
            .to(Property::X, Value::Percent(0.0))
            .stagger(0.05)
            .duration(1.0)
            .ease(Ease::POWER4_IN_OUT),
        Position::End,
    )?
    .to(
        "footer-in",
        Tween::new(footer.clone())
            .to(Property::Y, Value::Percent(0.0))
            .stagger(0.1)
            .duration(1.0)
            .ease(Ease::POWER4_IN_OUT),
        Position::Absolute(0.25),
    )?
    .add("progress", progress_fill(&bar, config, source)?, Position::PreviousStart(0.0))?
    .set(
        "progress-bg",
        Tween::set(progress.clone()).to(Property::BackgroundColor, Value::Color("#fff".to_string())),
        Position::End,
    )?
    .to(
        "logo-out",
        Tween::new(logo.clone())
            .to(Property::X, Value::Percent(-100.0))
            .stagger(0.05)
            .duration(1.0)
            .ease(Ease::POWER4_IN_OUT),
        Position::FromEnd(-0.5),
    )?
    .to(
        "footer-out",
        Tween::new(footer.clone())
            .to(Property::Y, Value::Percent(-100.0))
            .stagger(0.1)
            .duration(1.0)
            .ease(Ease::POWER4_IN_OUT),
        Position::PreviousStart(0.0),
    )?
    .to(
        "progress-fade",
        Tween::new(progress)
            .to(Property::Opacity, Value::Number(0.0))
            .duration(0.5)
            .ease(Ease::POWER3_OUT),
        Position::FromEnd(-0.25),
    )?
    .to(
        "mask",
        Tween::new(mask)
            .to(Property::Scale, Value::Number(6.0))
            .duration(2.5)
            .ease(Ease::POWER3_OUT),
        Position::PreviousStart(0.0),
    )?
    .to(
        "hero-img",
        Tween::new(hero_img)
            .to(Property::Scale, Value::Number(1.0))
            .duration(1.5)
            .ease(Ease::POWER3_OUT),
        Position::PreviousStart(0.0),
    )?
    .to(
        "header-in",
        Tween::new(splits.header_chars.units.clone())
            .to(Property::Y, Value::Percent(0.0))
            .stagger(0.05)
            .duration(1.0)
            .ease(Ease::POWER4_OUT)
            .delay(-2.0),
        Position::End,
    )?
    .to(
        "hero-footer-in",
        Tween::new(splits.hero_footer_lines())
            .to(Property::Y, Value::Percent(0.0))
            .stagger(0.1)
            .duration(1.0)
            .ease(Ease::POWER4_OUT),
        Position::FromEnd(-1.5),
    )?
    .to(
        "btn",
        Tween::new(btn)
            .to(Property::Scale, Value::Number(1.0))
            .duration(1.0)
            .ease(Ease::POWER4_OUT),
        Position::PreviousStart(0.0),
    )?
    .add_label(BUTTON_CONTENTS, Position::FromEnd(-1.25))?
    .to(
        "btn-icon",
        Tween::new(btn_icon)
            .to(Property::ClipCircle, Value::Percent(100.0))
            .duration(1.0)
            .ease(Ease::POWER2_OUT),
        Position::Label(BUTTON_CONTENTS.to_string(), 0.0),
    )?
    .to(
        "btn-labels",
        Tween::new(splits.button_labels.units.clone())
            .to(Property::Y, Value::Percent(0.0))
            .duration(1.0)
            .ease(Ease::POWER4_OUT),
        Position::Label(BUTTON_CONTENTS.to_string(), 0.0),
    )?;

    Ok(tl)
}

/// A started preloader: splits applied, initial state written, master
/// timeline ready to play
#[derive(Debug, Clone)]
pub struct Preloader {
    splits: PreloaderSplits,
    playhead: Playhead,
}

impl Preloader {
    pub fn start<T, S, I>(
        doc: &mut Document,
        splitter: &mut T,
        sink: &mut S,
        config: &PreloaderConfig,
        source: &mut I,
    ) -> Result<Self>
    where
        T: TextSplitter + ?Sized,
        S: StyleSink + ?Sized,
        I: IncrementSource + ?Sized,
    {
        let splits = PreloaderSplits::create(doc, splitter)?;
        initial_state(doc, &splits, sink)?;
        let timeline = build_master(doc, &splits, config, source)?;
        info!(
            steps = timeline.steps().len(),
            tracks = timeline.tracks().len(),
            total = timeline.total_duration(),
            "Preloader started"
        );
        Ok(Self {
            splits,
            playhead: Playhead::new(timeline),
        })
    }

    pub fn splits(&self) -> &PreloaderSplits {
        &self.splits
    }

    pub fn timeline(&self) -> &Timeline {
        self.playhead.timeline()
    }

    pub fn advance<S: StyleSink + ?Sized>(&mut self, dt: f64, sink: &mut S) {
        self.playhead.advance(dt, sink);
    }

    pub fn is_finished(&self) -> bool {
        self.playhead.is_finished()
    }

    pub fn progress(&self) -> f64 {
        self.playhead.progress()
    }
}

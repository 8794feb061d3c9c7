//! Scroll observers
//!
//! A trigger maps a scroll range, defined by element edges meeting
//! viewport edges, to a progress value in [0, 1] and to enter / leave
//! crossings. Triggers may pin their element to the viewport for the
//! length of the range, optionally reserving that length as extra page
//! height (pin spacing) so that following content is pushed down.
//!
//! `refresh()` resolves every range against the current layout; `update()`
//! is called with each new scroll position and returns the events it
//! produced.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::document::{Document, ElementId};
use crate::timing::progress_in;
use crate::{Error, Result};

/// A point on an element's or the viewport's vertical extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Top,
    Center,
    Bottom,
    Px(f64),
    Percent(f64),
}

impl Anchor {
    fn resolve(&self, extent: f64) -> f64 {
        match self {
            Anchor::Top => 0.0,
            Anchor::Center => extent / 2.0,
            Anchor::Bottom => extent,
            Anchor::Px(px) => *px,
            Anchor::Percent(pct) => extent * pct / 100.0,
        }
    }

    fn parse(raw: &str, whole: &str) -> Result<Self> {
        let invalid = || Error::InvalidScrollPosition(whole.to_string());
        Ok(match raw {
            "top" => Anchor::Top,
            "center" => Anchor::Center,
            "bottom" => Anchor::Bottom,
            _ => {
                if let Some(n) = raw.strip_suffix("px") {
                    Anchor::Px(n.parse().map_err(|_| invalid())?)
                } else if let Some(n) = raw.strip_suffix('%') {
                    Anchor::Percent(n.parse().map_err(|_| invalid())?)
                } else {
                    return Err(invalid());
                }
            }
        })
    }
}

/// Scroll distance unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    /// Viewport heights
    Vh(f64),
}

impl Length {
    fn resolve(&self, viewport_height: f64) -> f64 {
        match self {
            Length::Px(px) => *px,
            Length::Vh(vh) => vh * viewport_height / 100.0,
        }
    }
}

/// Start or end of a trigger range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollPosition {
    /// Scroll offset at which the element anchor meets the viewport anchor
    Edge { element: Anchor, viewport: Anchor },
    /// Distance past the resolved start (`+=300vh`)
    Distance(Length),
}

impl ScrollPosition {
    pub const TOP_TOP: ScrollPosition = ScrollPosition::Edge {
        element: Anchor::Top,
        viewport: Anchor::Top,
    };
    pub const TOP_BOTTOM: ScrollPosition = ScrollPosition::Edge {
        element: Anchor::Top,
        viewport: Anchor::Bottom,
    };
    pub const BOTTOM_TOP: ScrollPosition = ScrollPosition::Edge {
        element: Anchor::Bottom,
        viewport: Anchor::Top,
    };

    /// Distance in viewport heights (`vh(3.0)` is `+=300vh`)
    pub fn vh(heights: f64) -> Self {
        ScrollPosition::Distance(Length::Vh(heights * 100.0))
    }
}

impl FromStr for ScrollPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidScrollPosition(s.to_string());

        if let Some(distance) = s.strip_prefix("+=") {
            let length = if let Some(n) = distance.strip_suffix("vh") {
                Length::Vh(n.trim().parse().map_err(|_| invalid())?)
            } else if let Some(n) = distance.strip_suffix("px") {
                Length::Px(n.trim().parse().map_err(|_| invalid())?)
            } else {
                Length::Px(distance.trim().parse().map_err(|_| invalid())?)
            };
            return Ok(ScrollPosition::Distance(length));
        }

        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), Some(viewport), None) => Ok(ScrollPosition::Edge {
                element: Anchor::parse(element, s)?,
                viewport: Anchor::parse(viewport, s)?,
            }),
            _ => Err(invalid()),
        }
    }
}

/// Identifier returned when a trigger is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TriggerId(pub usize);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSpec {
    pub trigger: ElementId,
    pub start: ScrollPosition,
    /// `None` means the trigger's bottom meeting the viewport top
    pub end: Option<ScrollPosition>,
    /// Element the end edge is measured on, instead of `trigger`
    pub end_trigger: Option<ElementId>,
    pub pin: bool,
    pub pin_spacing: bool,
}

impl TriggerSpec {
    pub fn new(trigger: ElementId, start: ScrollPosition) -> Self {
        Self {
            trigger,
            start,
            end: None,
            end_trigger: None,
            pin: false,
            pin_spacing: false,
        }
    }

    pub fn end(mut self, end: ScrollPosition) -> Self {
        self.end = Some(end);
        self
    }

    pub fn end_trigger(mut self, element: ElementId) -> Self {
        self.end_trigger = Some(element);
        self
    }

    /// Pin the trigger element for the range; `spacing` reserves the
    /// pinned distance in the page height
    pub fn pin(mut self, spacing: bool) -> Self {
        self.pin = true;
        self.pin_spacing = spacing;
        self
    }
}

/// Where the scroll position sits relative to a trigger's range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Before,
    Active,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "progress", rename_all = "snake_case")]
pub enum TriggerEventKind {
    /// Progress changed
    Update(f64),
    /// Start crossed while scrolling down
    Enter,
    /// End crossed while scrolling down
    Leave,
    /// End crossed while scrolling up
    EnterBack,
    /// Start crossed while scrolling up
    LeaveBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TriggerEvent {
    pub id: TriggerId,
    #[serde(flatten)]
    pub kind: TriggerEventKind,
}

/// Scroll range of a trigger after layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedRange {
    pub start: f64,
    pub end: f64,
    /// Page height reserved by pinning
    pub spacing: f64,
}

impl ResolvedRange {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone)]
struct Trigger {
    spec: TriggerSpec,
    range: ResolvedRange,
    region: Region,
    progress: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ScrollTriggers {
    triggers: Vec<Trigger>,
    viewport_height: f64,
    page_height: f64,
    scroll: f64,
}

impl ScrollTriggers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Register a trigger; ranges are resolved on the next `refresh()`
    pub fn create(&mut self, spec: TriggerSpec) -> TriggerId {
        let id = TriggerId(self.triggers.len());
        self.triggers.push(Trigger {
            spec,
            range: ResolvedRange {
                start: 0.0,
                end: 0.0,
                spacing: 0.0,
            },
            region: Region::Before,
            progress: 0.0,
        });
        id
    }

    pub fn range(&self, id: TriggerId) -> ResolvedRange {
        self.triggers[id.0].range
    }

    pub fn progress(&self, id: TriggerId) -> f64 {
        self.triggers[id.0].progress
    }

    /// Document height including reserved pin spacing
    pub fn page_height(&self) -> f64 {
        self.page_height
    }

    /// Largest reachable scroll position
    pub fn max_scroll(&self) -> f64 {
        (self.page_height - self.viewport_height).max(0.0)
    }

    /// Resolve every range against the document layout
    ///
    /// Triggers are resolved in creation order; spacing reserved by an
    /// earlier pin pushes down every element laid out below the pinned one.
    pub fn refresh(&mut self, doc: &Document, viewport_height: f64) {
        self.viewport_height = viewport_height;
        // (bottom of pinned element, reserved px)
        let mut spacers: Vec<(f64, f64)> = Vec::new();

        let shifted_top = |spacers: &[(f64, f64)], id: ElementId| {
            let natural = doc.layout(id).top;
            let shift: f64 = spacers
                .iter()
                .filter(|(bottom, _)| natural >= *bottom)
                .map(|(_, px)| px)
                .sum();
            natural + shift
        };
        let edge = |spacers: &[(f64, f64)], id: ElementId, element: Anchor, viewport: Anchor| {
            shifted_top(spacers, id) + element.resolve(doc.layout(id).height)
                - viewport.resolve(viewport_height)
        };

        for trigger in &mut self.triggers {
            let spec = &trigger.spec;
            let start = match spec.start {
                ScrollPosition::Edge { element, viewport } => {
                    edge(&spacers, spec.trigger, element, viewport)
                }
                ScrollPosition::Distance(length) => length.resolve(viewport_height),
            };
            let end_target = spec.end_trigger.unwrap_or(spec.trigger);
            let end = match spec.end.unwrap_or(ScrollPosition::BOTTOM_TOP) {
                ScrollPosition::Edge { element, viewport } => {
                    edge(&spacers, end_target, element, viewport)
                }
                ScrollPosition::Distance(length) => start + length.resolve(viewport_height),
            };
            let end = end.max(start);
            let spacing = if spec.pin && spec.pin_spacing {
                end - start
            } else {
                0.0
            };
            if spacing > 0.0 {
                spacers.push((doc.layout(spec.trigger).bottom(), spacing));
            }
            trigger.range = ResolvedRange { start, end, spacing };
        }

        let natural_height = doc.layout(doc.root()).height;
        let reserved: f64 = spacers.iter().map(|(_, px)| px).sum();
        self.page_height = natural_height + reserved;
        debug!(
            triggers = self.triggers.len(),
            page_height = self.page_height,
            "Scroll triggers refreshed"
        );
    }

    /// Recompute every trigger for `scroll` and collect the events
    ///
    /// Updates come before crossings for the same trigger.
    pub fn update(&mut self, scroll: f64) -> Vec<TriggerEvent> {
        self.scroll = scroll;
        let mut events = Vec::new();

        for (index, trigger) in self.triggers.iter_mut().enumerate() {
            let id = TriggerId(index);
            let range = trigger.range;
            let progress = progress_in(scroll, range.start, range.end);
            let region = if scroll < range.start {
                Region::Before
            } else if scroll < range.end {
                Region::Active
            } else {
                Region::After
            };

            if progress != trigger.progress {
                trigger.progress = progress;
                events.push(TriggerEvent {
                    id,
                    kind: TriggerEventKind::Update(progress),
                });
            }

            use Region::*;
            use TriggerEventKind::*;
            let crossings: &[TriggerEventKind] = match (trigger.region, region) {
                (Before, Active) => &[Enter],
                (Before, After) => &[Enter, Leave],
                (Active, After) => &[Leave],
                (After, Active) => &[EnterBack],
                (After, Before) => &[EnterBack, LeaveBack],
                (Active, Before) => &[LeaveBack],
                _ => &[],
            };
            events.extend(crossings.iter().map(|kind| TriggerEvent { id, kind: *kind }));
            trigger.region = region;
        }

        events
    }

    /// Vertical translation keeping each pinned element in place
    ///
    /// Inside its range a pinned element follows the scroll; past the end
    /// it stays displaced by the full pinned distance.
    pub fn pin_offsets(&self) -> Vec<(ElementId, f64)> {
        self.triggers
            .iter()
            .filter(|t| t.spec.pin)
            .map(|t| {
                let offset = (self.scroll - t.range.start).clamp(0.0, t.range.length());
                (t.spec.trigger, offset)
            })
            .collect()
    }
}

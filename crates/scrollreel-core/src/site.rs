//! Page bootstrap and the per-frame pump
//!
//! [`Site`] owns every piece of page state. The host calls `dom_ready()`
//! once the markup exists, `fonts_ready()` once text can be measured, feeds
//! wheel and resize input, and calls `frame()` from its animation clock.
//! Each frame runs the same fixed order: clock, smooth scroll, scroll
//! triggers, choreography, preloader timeline, scroll tweens.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::animator::Animator;
use crate::choreographer::ScrollChoreographer;
use crate::config::AppConfig;
use crate::document::Document;
use crate::page::{landing_page, layout_page};
use crate::preloader::{IncrementSource, Preloader, RandomIncrements};
use crate::smooth::SmoothScroll;
use crate::split::{GraphemeSplitter, TextSplitter};
use crate::style::{Property, StyleSink, StyleStore, Value};
use crate::ticker::{Frame, FrameScheduler};
use crate::trigger::{ScrollTriggers, TriggerEvent};
use crate::Result;

/// What one call to [`Site::frame`] did
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame: Frame,
    /// New scroll position, if it moved
    pub scroll: Option<f64>,
    pub events: Vec<TriggerEvent>,
}

pub struct Site {
    config: AppConfig,
    doc: Document,
    styles: StyleStore,
    ticker: FrameScheduler,
    scroll: SmoothScroll,
    triggers: ScrollTriggers,
    animator: Animator,
    splitter: Box<dyn TextSplitter>,
    increments: Box<dyn IncrementSource>,
    preloader: Option<Preloader>,
    choreographer: Option<ScrollChoreographer>,
}

impl Site {
    /// Site over the built-in landing page with random fill increments
    pub fn landing(config: AppConfig) -> Self {
        let doc = landing_page(&config.page);
        let splitter = GraphemeSplitter::new(config.page.line_width);
        Self::new(
            config,
            doc,
            Box::new(splitter),
            Box::new(RandomIncrements(StdRng::from_entropy())),
        )
    }

    /// Landing page with fill increments from a seeded generator
    pub fn seeded(config: AppConfig, seed: u64) -> Self {
        let mut site = Self::landing(config);
        site.increments = Box::new(RandomIncrements(StdRng::seed_from_u64(seed)));
        site
    }

    pub fn new(
        config: AppConfig,
        doc: Document,
        splitter: Box<dyn TextSplitter>,
        increments: Box<dyn IncrementSource>,
    ) -> Self {
        Self {
            ticker: FrameScheduler::new(&config.ticker),
            scroll: SmoothScroll::new(config.scroll.clone(), 0.0),
            config,
            doc,
            styles: StyleStore::new(),
            triggers: ScrollTriggers::new(),
            animator: Animator::new(),
            splitter,
            increments,
            preloader: None,
            choreographer: None,
        }
    }

    /// Set up smooth scrolling and the card choreography
    pub fn dom_ready(&mut self) -> Result<()> {
        if self.choreographer.is_some() {
            warn!("Page already initialised, ignoring");
            return Ok(());
        }
        let choreographer = ScrollChoreographer::setup(
            &mut self.doc,
            self.splitter.as_mut(),
            &mut self.triggers,
            &mut self.styles,
            &self.config.choreography,
        )?;
        self.choreographer = Some(choreographer);
        self.refresh();
        info!(
            max_scroll = self.scroll.limit(),
            smooth = self.config.scroll.smooth_enabled,
            "Page ready"
        );
        Ok(())
    }

    /// Start the preloader; returns `false` if it already ran
    pub fn fonts_ready(&mut self) -> Result<bool> {
        if self.preloader.is_some() {
            warn!("Fonts ready reported twice, preloader already started");
            return Ok(false);
        }
        let preloader = Preloader::start(
            &mut self.doc,
            self.splitter.as_mut(),
            &mut self.styles,
            &self.config.preloader,
            self.increments.as_mut(),
        )?;
        self.preloader = Some(preloader);
        Ok(true)
    }

    /// Raw wheel input; positive scrolls down
    pub fn wheel(&mut self, delta: f64) {
        self.scroll.scroll_by(delta);
    }

    pub fn scroll_to(&mut self, position: f64) {
        self.scroll.scroll_to(position);
    }

    /// New viewport size: lay the page out again and re-resolve every
    /// trigger against it
    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.page.viewport_width = width;
        self.config.page.viewport_height = height;
        layout_page(&mut self.doc, &self.config.page);
        self.refresh();
        debug!(width, height, "Viewport resized");
    }

    fn refresh(&mut self) {
        self.triggers
            .refresh(&self.doc, self.config.page.viewport_height);
        self.scroll.set_limit(self.triggers.max_scroll());
        let events = self.triggers.update(self.scroll.current_scroll());
        self.dispatch(&events);
    }

    fn dispatch(&mut self, events: &[TriggerEvent]) {
        if let Some(choreographer) = self.choreographer.as_mut() {
            choreographer.handle(events, &mut self.styles, &mut self.animator);
        }
        for (element, offset) in self.triggers.pin_offsets() {
            if self.styles.get(element, Property::PinY) != Some(&Value::Px(offset)) {
                self.styles.set(element, Property::PinY, Value::Px(offset));
            }
        }
    }

    /// Run one frame at host time `now` (seconds, monotonic)
    pub fn frame(&mut self, now: f64) -> FrameReport {
        let frame = self.ticker.advance(now);

        let scroll = self.scroll.raf(&frame);
        let events = match scroll {
            Some(position) => self.triggers.update(position),
            None => Vec::new(),
        };
        if !events.is_empty() || scroll.is_some() {
            self.dispatch(&events);
        }

        if let Some(preloader) = self.preloader.as_mut() {
            preloader.advance(frame.delta, &mut self.styles);
        }
        self.animator.advance(frame.delta, &mut self.styles);

        FrameReport {
            frame,
            scroll,
            events,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn styles(&self) -> &StyleStore {
        &self.styles
    }

    pub fn triggers(&self) -> &ScrollTriggers {
        &self.triggers
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn preloader(&self) -> Option<&Preloader> {
        self.preloader.as_ref()
    }

    pub fn choreographer(&self) -> Option<&ScrollChoreographer> {
        self.choreographer.as_ref()
    }

    pub fn scroll_position(&self) -> f64 {
        self.scroll.current_scroll()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.needs_update()
    }
}

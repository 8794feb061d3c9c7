//! Scroll-driven card choreography
//!
//! Registers the card observers on a [`ScrollTriggers`] registry and turns
//! the events it reports into style writes and content tweens:
//!
//! - the intro card zooms from a rounded half-size thumbnail to full size
//!   over the intro distance, fading its marquee out on the way;
//! - every card is pinned to the viewport while the next one scrolls over
//!   it, and recedes (shrinks and fades) as it is covered;
//! - later cards arrive with a zoomed image that settles as they reach the
//!   top;
//! - each card's title and description slide in once the card is fully in
//!   place and slide back out when scrolling returns past that point.
//!
//! Whether a card's content is currently shown is tracked by a per-card
//! [`RevealLatch`], so repeated events never restart a transition.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::animator::Animator;
use crate::config::{ChoreographyConfig, PinRelease};
use crate::document::{Document, ElementId};
use crate::easing::Ease;
use crate::split::{wrap_inner, Granularity, SplitOptions, TextSplitter};
use crate::style::{Property, StyleSink, Value};
use crate::timeline::Tween;
use crate::trigger::{
    ScrollPosition, ScrollTriggers, TriggerEvent, TriggerEventKind, TriggerId, TriggerSpec,
};
use crate::{Error, Result};

/// Whether a card's title and description are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealLatch {
    #[default]
    Hidden,
    Revealed,
}

/// What a registered observer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "observer", content = "card", rename_all = "snake_case")]
pub enum Observer {
    /// Zoom of the first card
    Intro,
    /// Pin of card n
    Pin(usize),
    /// Card n being covered by card n + 1
    Recede(usize),
    /// Card n scrolling into view
    Arrival(usize),
    /// Content reveal of card n
    Reveal(usize),
}

impl fmt::Display for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observer::Intro => f.write_str("intro"),
            Observer::Pin(i) => write!(f, "pin[{i}]"),
            Observer::Recede(i) => write!(f, "recede[{i}]"),
            Observer::Arrival(i) => write!(f, "arrival[{i}]"),
            Observer::Reveal(i) => write!(f, "reveal[{i}]"),
        }
    }
}

/// Elements of one card section and its reveal state
#[derive(Debug, Clone)]
pub struct Card {
    pub element: ElementId,
    /// `.card-wrapper`, shrinks and fades as the card recedes
    pub wrapper: ElementId,
    /// `.card-img`
    pub image_wrapper: ElementId,
    /// `.card-img img`
    pub image: ElementId,
    /// Inner spans of the split title
    pub title_chars: Vec<ElementId>,
    pub description: ElementId,
    pub latch: RevealLatch,
}

/// Styles of the intro card at one progress value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntroStyles {
    pub wrapper_scale: f64,
    pub border_radius: f64,
    pub image_scale: f64,
    pub marquee_opacity: f64,
}

pub fn intro_styles(progress: f64) -> IntroStyles {
    let wrapper_scale = 0.5 + 0.5 * progress;
    IntroStyles {
        wrapper_scale,
        border_radius: 400.0 - 375.0 * progress,
        image_scale: 1.5 - 0.5 * progress,
        marquee_opacity: marquee_opacity(wrapper_scale),
    }
}

/// Marquee fades out while the intro image grows from half to three
/// quarters size
pub fn marquee_opacity(scale: f64) -> f64 {
    if scale < 0.5 {
        1.0
    } else if scale > 0.75 {
        0.0
    } else {
        1.0 - (scale - 0.5) / 0.25
    }
}

/// (scale, opacity) of a card being covered
pub fn recede(progress: f64) -> (f64, f64) {
    (1.0 - 0.25 * progress, 1.0 - progress)
}

/// (image scale, border radius) of a card scrolling in
pub fn arrival(progress: f64) -> (f64, f64) {
    (2.0 - progress, 150.0 - 125.0 * progress)
}

/// Tweens sliding a card's content into view
pub fn content_in(card: &Card) -> [Tween; 2] {
    [
        Tween::new(card.title_chars.clone())
            .to(Property::X, Value::Percent(0.0))
            .duration(0.75)
            .ease(Ease::POWER4_OUT),
        Tween::new(vec![card.description])
            .to(Property::X, Value::Px(0.0))
            .to(Property::Opacity, Value::Number(1.0))
            .duration(0.75)
            .delay(0.1)
            .ease(Ease::POWER4_OUT),
    ]
}

/// Tweens sliding a card's content back out
pub fn content_out(card: &Card) -> [Tween; 2] {
    [
        Tween::new(card.title_chars.clone())
            .to(Property::X, Value::Percent(100.0))
            .duration(0.5)
            .ease(Ease::POWER4_OUT),
        Tween::new(vec![card.description])
            .to(Property::X, Value::Px(40.0))
            .to(Property::Opacity, Value::Number(0.0))
            .duration(0.5)
            .ease(Ease::POWER4_OUT),
    ]
}

fn hide_content<S: StyleSink + ?Sized>(card: &Card, sink: &mut S) {
    sink.set_all(&card.title_chars, Property::X, Value::Percent(100.0));
    sink.set(card.description, Property::X, Value::Px(40.0));
    sink.set(card.description, Property::Opacity, Value::Number(0.0));
}

#[derive(Debug, Clone)]
pub struct ScrollChoreographer {
    cards: Vec<Card>,
    marquee: ElementId,
    observers: HashMap<TriggerId, Observer>,
}

impl ScrollChoreographer {
    /// Prepare the cards and register every observer
    ///
    /// Titles are split into chars with an inner span each, content starts
    /// hidden, and every progress-driven observer is rendered at progress 0
    /// so styles are consistent before the first scroll.
    pub fn setup<T, S>(
        doc: &mut Document,
        splitter: &mut T,
        triggers: &mut ScrollTriggers,
        sink: &mut S,
        config: &ChoreographyConfig,
    ) -> Result<Self>
    where
        T: TextSplitter + ?Sized,
        S: StyleSink + ?Sized,
    {
        let elements = doc.query(".card")?;
        if elements.is_empty() {
            return Err(Error::ElementNotFound(".card".to_string()));
        }

        let mut cards = Vec::with_capacity(elements.len());
        for element in &elements {
            let title = doc.query_one_within(*element, ".card-title h1")?;
            let units = splitter.split(doc, title, SplitOptions::plain(Granularity::Chars))?;
            let title_chars = wrap_inner(doc, &units);
            cards.push(Card {
                element: *element,
                wrapper: doc.query_one_within(*element, ".card-wrapper")?,
                image_wrapper: doc.query_one_within(*element, ".card-img")?,
                image: doc.query_one_within(*element, ".card-img img")?,
                title_chars,
                description: doc.query_one_within(*element, ".card-description")?,
                latch: RevealLatch::Hidden,
            });
        }
        let marquee = doc.query_one_within(elements[0], ".card-marquee .marquee")?;

        for card in &cards {
            hide_content(card, sink);
        }

        let mut observers = HashMap::new();
        let last = cards.len() - 1;

        let intro = TriggerSpec::new(cards[0].element, ScrollPosition::TOP_TOP)
            .end(ScrollPosition::vh(config.intro_distance_vh));
        observers.insert(triggers.create(intro), Observer::Intro);

        for (i, card) in cards.iter().enumerate() {
            let spec = TriggerSpec::new(card.element, ScrollPosition::TOP_TOP);
            let spec = if i == last {
                spec.end(ScrollPosition::vh(config.last_pin_vh)).pin(true)
            } else {
                let release = match config.release_pin {
                    PinRelease::Next => cards[i + 1].element,
                    PinRelease::Last => cards[last].element,
                };
                spec.end(ScrollPosition::TOP_TOP).end_trigger(release).pin(false)
            };
            observers.insert(triggers.create(spec), Observer::Pin(i));
        }

        for i in 0..last {
            let spec = TriggerSpec::new(cards[i + 1].element, ScrollPosition::TOP_BOTTOM)
                .end(ScrollPosition::TOP_TOP);
            observers.insert(triggers.create(spec), Observer::Recede(i));
        }

        for (i, card) in cards.iter().enumerate().skip(1) {
            let spec = TriggerSpec::new(card.element, ScrollPosition::TOP_BOTTOM)
                .end(ScrollPosition::TOP_TOP);
            observers.insert(triggers.create(spec), Observer::Arrival(i));
        }

        for (i, card) in cards.iter().enumerate().skip(1) {
            let spec = TriggerSpec::new(card.element, ScrollPosition::TOP_TOP);
            observers.insert(triggers.create(spec), Observer::Reveal(i));
        }

        let mut choreographer = Self {
            cards,
            marquee,
            observers,
        };
        for observer in choreographer.observers.values() {
            choreographer.render(*observer, 0.0, sink);
        }

        info!(
            cards = choreographer.cards.len(),
            observers = choreographer.observers.len(),
            release = ?config.release_pin,
            "Scroll choreography ready"
        );
        Ok(choreographer)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn latch(&self, card: usize) -> RevealLatch {
        self.cards[card].latch
    }

    pub fn observer(&self, id: TriggerId) -> Option<Observer> {
        self.observers.get(&id).copied()
    }

    /// Apply a batch of trigger events in order
    pub fn handle<S: StyleSink + ?Sized>(
        &mut self,
        events: &[TriggerEvent],
        sink: &mut S,
        animator: &mut Animator,
    ) {
        for event in events {
            let Some(observer) = self.observer(event.id) else {
                continue;
            };
            match (observer, event.kind) {
                (Observer::Intro, TriggerEventKind::Update(p)) => {
                    self.set_intro_progress(p, sink, animator);
                }
                (Observer::Reveal(i), TriggerEventKind::Enter) => self.reveal(i, animator),
                (Observer::Reveal(i), TriggerEventKind::LeaveBack) => self.conceal(i, animator),
                (_, TriggerEventKind::Update(p)) => self.render(observer, p, sink),
                _ => {}
            }
        }
    }

    /// Render the intro zoom at `progress` and flip the first card's latch
    /// when progress reaches or leaves 1
    pub fn set_intro_progress<S: StyleSink + ?Sized>(
        &mut self,
        progress: f64,
        sink: &mut S,
        animator: &mut Animator,
    ) {
        self.render(Observer::Intro, progress, sink);
        if progress >= 1.0 {
            self.reveal(0, animator);
        } else {
            self.conceal(0, animator);
        }
    }

    /// Write the progress-driven styles of one observer
    fn render<S: StyleSink + ?Sized>(&self, observer: Observer, progress: f64, sink: &mut S) {
        match observer {
            Observer::Intro => {
                let card = &self.cards[0];
                let styles = intro_styles(progress);
                sink.set(card.image_wrapper, Property::Scale, Value::Number(styles.wrapper_scale));
                sink.set(card.image_wrapper, Property::BorderRadius, Value::Px(styles.border_radius));
                sink.set(card.image, Property::Scale, Value::Number(styles.image_scale));
                sink.set(self.marquee, Property::Opacity, Value::Number(styles.marquee_opacity));
            }
            Observer::Recede(i) => {
                let (scale, opacity) = recede(progress);
                let wrapper = self.cards[i].wrapper;
                sink.set(wrapper, Property::Scale, Value::Number(scale));
                sink.set(wrapper, Property::Opacity, Value::Number(opacity));
            }
            Observer::Arrival(i) => {
                let (scale, radius) = arrival(progress);
                let card = &self.cards[i];
                sink.set(card.image, Property::Scale, Value::Number(scale));
                sink.set(card.image_wrapper, Property::BorderRadius, Value::Px(radius));
            }
            Observer::Pin(_) | Observer::Reveal(_) => {}
        }
    }

    fn reveal(&mut self, index: usize, animator: &mut Animator) {
        let card = &mut self.cards[index];
        if card.latch == RevealLatch::Revealed {
            return;
        }
        card.latch = RevealLatch::Revealed;
        for tween in content_in(card) {
            animator.play(&tween);
        }
        debug!(card = index, "Content in");
    }

    fn conceal(&mut self, index: usize, animator: &mut Animator) {
        let card = &mut self.cards[index];
        if card.latch == RevealLatch::Hidden {
            return;
        }
        card.latch = RevealLatch::Hidden;
        for tween in content_out(card) {
            animator.play(&tween);
        }
        debug!(card = index, "Content out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::page::landing_page;
    use crate::split::GraphemeSplitter;
    use crate::style::StyleStore;

    const VH: f64 = 900.0;

    struct Fixture {
        doc: Document,
        triggers: ScrollTriggers,
        store: StyleStore,
        animator: Animator,
        choreographer: ScrollChoreographer,
    }

    impl Fixture {
        fn new(config: &ChoreographyConfig) -> Self {
            let page = PageConfig {
                viewport_height: VH,
                ..Default::default()
            };
            let mut doc = landing_page(&page);
            let mut triggers = ScrollTriggers::new();
            let mut store = StyleStore::new();
            let choreographer = ScrollChoreographer::setup(
                &mut doc,
                &mut GraphemeSplitter::default(),
                &mut triggers,
                &mut store,
                config,
            )
            .unwrap();
            triggers.refresh(&doc, VH);
            Self {
                doc,
                triggers,
                store,
                animator: Animator::new(),
                choreographer,
            }
        }

        fn scroll(&mut self, position: f64) {
            let events = self.triggers.update(position);
            self.choreographer
                .handle(&events, &mut self.store, &mut self.animator);
            self.animator.finish_all(&mut self.store);
        }

        fn id_of(&self, wanted: Observer) -> TriggerId {
            (0..self.triggers.len())
                .map(TriggerId)
                .find(|id| self.choreographer.observer(*id) == Some(wanted))
                .unwrap()
        }

        fn content(&self, card: usize) -> Vec<(ElementId, Vec<(Property, Value)>)> {
            let card = &self.choreographer.cards()[card];
            card.title_chars
                .iter()
                .chain(std::iter::once(&card.description))
                .map(|id| (*id, self.store.snapshot(*id)))
                .collect()
        }
    }

    #[test]
    fn test_intro_styles_at_sample_points() {
        let cases = [
            (0.0, 0.5, 400.0, 1.5, 1.0),
            (0.5, 0.75, 212.5, 1.25, 0.0),
            (0.75, 0.875, 118.75, 1.125, 0.0),
            (1.0, 1.0, 25.0, 1.0, 0.0),
        ];
        for (p, scale, radius, image, marquee) in cases {
            let styles = intro_styles(p);
            assert!((styles.wrapper_scale - scale).abs() < 1e-9, "p={p}");
            assert!((styles.border_radius - radius).abs() < 1e-9, "p={p}");
            assert!((styles.image_scale - image).abs() < 1e-9, "p={p}");
            assert!((styles.marquee_opacity - marquee).abs() < 1e-9, "p={p}");
        }
    }

    #[test]
    fn test_marquee_opacity_boundaries() {
        assert_eq!(marquee_opacity(0.3), 1.0);
        assert_eq!(marquee_opacity(0.5), 1.0);
        assert!((marquee_opacity(0.625) - 0.5).abs() < 1e-9);
        assert_eq!(marquee_opacity(0.75), 0.0);
        assert_eq!(marquee_opacity(0.9), 0.0);
    }

    #[test]
    fn test_recede_and_arrival_maps() {
        assert_eq!(recede(0.0), (1.0, 1.0));
        assert_eq!(recede(0.5), (0.875, 0.5));
        assert_eq!(recede(1.0), (0.75, 0.0));
        assert_eq!(arrival(0.0), (2.0, 150.0));
        assert_eq!(arrival(0.5), (1.5, 87.5));
        assert_eq!(arrival(1.0), (1.0, 25.0));
    }

    #[test]
    fn test_setup_initial_styles() {
        let fx = Fixture::new(&ChoreographyConfig::default());
        let cards = fx.choreographer.cards();
        assert_eq!(cards.len(), 4);

        let intro = &cards[0];
        assert_eq!(fx.store.number(intro.image_wrapper, Property::Scale), 0.5);
        assert_eq!(fx.store.computed(intro.image_wrapper, Property::BorderRadius), Value::Px(400.0));
        assert_eq!(fx.store.number(intro.image, Property::Scale), 1.5);
        assert_eq!(fx.store.number(cards[2].image, Property::Scale), 2.0);

        for card in cards {
            assert_eq!(card.latch, RevealLatch::Hidden);
            assert!(!card.title_chars.is_empty());
            assert!(card.title_chars.iter().all(|c| fx.doc.element(*c).tag == "span"));
            assert_eq!(fx.store.number(card.description, Property::Opacity), 0.0);
        }
        let aurora: String = cards[0]
            .title_chars
            .iter()
            .filter_map(|c| fx.doc.text(*c))
            .collect();
        assert_eq!(aurora, "Aurora");
    }

    #[test]
    fn test_intro_latch_fires_once_per_transition() {
        let mut fx = Fixture::new(&ChoreographyConfig::default());
        let mut latches = Vec::new();
        for p in [0.0, 0.5, 1.0, 1.0, 0.5, 0.0] {
            fx.choreographer
                .set_intro_progress(p, &mut fx.store, &mut fx.animator);
            latches.push(fx.choreographer.latch(0));
        }
        use RevealLatch::*;
        assert_eq!(latches, vec![Hidden, Hidden, Revealed, Revealed, Hidden, Hidden]);
        // one content-in pair and one content-out pair
        assert_eq!(fx.animator.started(), 4);
    }

    #[test]
    fn test_intro_round_trip_restores_content() {
        let mut fx = Fixture::new(&ChoreographyConfig::default());
        let before = fx.content(0);
        let intro = fx.triggers.range(fx.id_of(Observer::Intro));

        fx.scroll(intro.end);
        assert_eq!(fx.choreographer.latch(0), RevealLatch::Revealed);
        let card = &fx.choreographer.cards()[0];
        assert_eq!(fx.store.number(card.description, Property::Opacity), 1.0);
        assert_eq!(fx.store.computed(card.title_chars[0], Property::X), Value::Percent(0.0));

        fx.scroll(0.0);
        assert_eq!(fx.choreographer.latch(0), RevealLatch::Hidden);
        assert_eq!(fx.content(0), before);
    }

    #[test]
    fn test_reveal_on_enter_and_leave_back() {
        let mut fx = Fixture::new(&ChoreographyConfig::default());
        let top = fx.doc.layout(fx.choreographer.cards()[2].element).top;
        let before = fx.content(2);

        fx.scroll(top - 10.0);
        assert_eq!(fx.choreographer.latch(2), RevealLatch::Hidden);
        fx.scroll(top + 10.0);
        assert_eq!(fx.choreographer.latch(2), RevealLatch::Revealed);
        let started = fx.animator.started();
        fx.scroll(top + 20.0);
        assert_eq!(fx.animator.started(), started);

        fx.scroll(top - 10.0);
        assert_eq!(fx.choreographer.latch(2), RevealLatch::Hidden);
        assert_eq!(fx.content(2), before);
    }

    #[test]
    fn test_pin_plans() {
        let fx = Fixture::new(&ChoreographyConfig::default());
        let cards = fx.choreographer.cards();
        let last = cards.len() - 1;

        for i in 0..last {
            let range = fx.triggers.range(fx.id_of(Observer::Pin(i)));
            assert_eq!(range.start, fx.doc.layout(cards[i].element).top);
            assert_eq!(range.end, fx.doc.layout(cards[i + 1].element).top);
            assert_eq!(range.spacing, 0.0);
        }
        let range = fx.triggers.range(fx.id_of(Observer::Pin(last)));
        assert_eq!(range.length(), VH);
        assert_eq!(range.spacing, VH);
        assert_eq!(
            fx.triggers.page_height(),
            fx.doc.layout(fx.doc.root()).height + VH
        );
    }

    #[test]
    fn test_pins_held_until_last_card() {
        let config = ChoreographyConfig {
            release_pin: PinRelease::Last,
            ..Default::default()
        };
        let fx = Fixture::new(&config);
        let cards = fx.choreographer.cards();
        let last_top = fx.doc.layout(cards[cards.len() - 1].element).top;
        for i in 0..cards.len() - 1 {
            let range = fx.triggers.range(fx.id_of(Observer::Pin(i)));
            assert_eq!(range.end, last_top);
        }
    }

    #[test]
    fn test_recede_follows_next_card_entry() {
        let mut fx = Fixture::new(&ChoreographyConfig::default());
        let cards = fx.choreographer.cards().to_vec();
        let next_top = fx.doc.layout(cards[2].element).top;

        fx.scroll(next_top - VH / 2.0);
        assert_eq!(fx.store.number(cards[1].wrapper, Property::Scale), 0.875);
        assert_eq!(fx.store.number(cards[1].wrapper, Property::Opacity), 0.5);
        assert_eq!(fx.store.number(cards[2].image, Property::Scale), 1.5);
        assert_eq!(
            fx.store.computed(cards[2].image_wrapper, Property::BorderRadius),
            Value::Px(87.5)
        );
    }

    #[test]
    fn test_missing_cards_is_an_error() {
        let mut doc = Document::new();
        let err = ScrollChoreographer::setup(
            &mut doc,
            &mut GraphemeSplitter::default(),
            &mut ScrollTriggers::new(),
            &mut StyleStore::new(),
            &ChoreographyConfig::default(),
        );
        assert!(matches!(err, Err(Error::ElementNotFound(s)) if s == ".card"));
    }
}

//! The built-in landing page markup
//!
//! Preloader overlays sit above a full-height hero; one full-height card
//! section per configured title follows the hero.

use tracing::debug;

use crate::config::PageConfig;
use crate::document::{Document, ElementId};

const BRAND: &str = "Scrollreel";
const PRELOADER_FOOTER: &str =
    "Motion studies for the open web, sequenced frame by frame and released one card at a time";
const HERO_FOOTER_HEADING: &str = "Crafted in motion";
const HERO_FOOTER_BODY: &str =
    "Scroll to move through the collection. Each piece arrives as the last one recedes";
const BUTTON_LABEL: &str = "Explore";

/// Build the landing page and lay it out for the configured viewport
pub fn landing_page(config: &PageConfig) -> Document {
    let mut doc = Document::new();
    let body = doc.root();

    let overlay =
        |doc: &mut Document, parent: ElementId, classes: &str| doc.append(parent, "div", classes, None);

    let progress = overlay(&mut doc, body, "preloader-progress");
    overlay(&mut doc, progress, "preloader-progress-bar");
    let logo = overlay(&mut doc, body, "preloader-logo");
    doc.append(logo, "h1", "", Some(BRAND));
    let footer = overlay(&mut doc, body, "preloader-footer");
    doc.append(footer, "p", "", Some(PRELOADER_FOOTER));
    overlay(&mut doc, body, "preloader-mask");

    let hero = overlay(&mut doc, body, "hero");
    let hero_img = overlay(&mut doc, hero, "hero-img");
    doc.append(hero_img, "img", "", None);
    let header = overlay(&mut doc, hero, "header");
    doc.append(header, "h1", "", Some(BRAND));
    let hero_footer = overlay(&mut doc, hero, "hero-footer");
    doc.append(hero_footer, "h3", "", Some(HERO_FOOTER_HEADING));
    doc.append(hero_footer, "p", "", Some(HERO_FOOTER_BODY));
    let btn = doc.append(hero_footer, "div", "btn", None);
    doc.append(btn, "div", "btn-icon", None);
    let label = doc.append(btn, "div", "btn-label", None);
    doc.append(label, "span", "", Some(BUTTON_LABEL));

    for (index, title) in config.card_titles.iter().enumerate() {
        let card = doc.append(body, "section", "card", None);

        let marquee_box = doc.append(card, "div", "card-marquee", None);
        let marquee = doc.append(marquee_box, "div", "marquee", None);
        doc.append(marquee, "h1", "", Some(format!("{title} {title} {title}").as_str()));

        let wrapper = doc.append(card, "div", "card-wrapper", None);
        let content = doc.append(wrapper, "div", "card-content", None);
        let title_box = doc.append(content, "div", "card-title", None);
        doc.append(title_box, "h1", "", Some(title.as_str()));
        let description = doc.append(content, "div", "card-description", None);
        doc.append(
            description,
            "p",
            "",
            Some(format!("{title}: study {:02} of the collection", index + 1).as_str()),
        );
        let img = doc.append(wrapper, "div", "card-img", None);
        doc.append(img, "img", "", None);
    }

    layout_page(&mut doc, config);
    debug!(
        elements = doc.len(),
        cards = config.card_titles.len(),
        "Landing page built"
    );
    doc
}

/// Place the page sections for the configured viewport height
///
/// Preloader overlays and the hero fill the first viewport; every `.card`
/// takes one viewport below it, in document order.
pub fn layout_page(doc: &mut Document, config: &PageConfig) {
    let vh = config.viewport_height;
    for selector in [
        ".preloader-progress",
        ".preloader-logo",
        ".preloader-footer",
        ".preloader-mask",
        ".hero",
    ] {
        for id in doc.query(selector).unwrap_or_default() {
            doc.set_layout(id, 0.0, vh);
        }
    }

    let cards = doc.query(".card").unwrap_or_default();
    for (index, card) in cards.iter().enumerate() {
        doc.set_layout(*card, vh * (index + 1) as f64, vh);
    }
    let root = doc.root();
    doc.set_layout(root, 0.0, vh * (cards.len() + 1) as f64);
}

//! Text splitting into independently animatable units
//!
//! A split replaces an element's text with child elements, one per
//! grapheme (`char` class) or per wrapped line (`line` class). Units keep
//! reading order, which is what staggered tweens iterate over.

use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::document::{Document, ElementId};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Chars,
    Lines,
}

impl Granularity {
    /// Class marker given to every produced unit
    pub fn class(&self) -> &'static str {
        match self {
            Granularity::Chars => "char",
            Granularity::Lines => "line",
        }
    }
}

/// How a split lays out its units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOptions {
    pub granularity: Granularity,
    /// Wrap each unit in an overflow mask element (`char-mask` / `line-mask`)
    pub mask: bool,
}

impl SplitOptions {
    pub fn masked(granularity: Granularity) -> Self {
        Self {
            granularity,
            mask: true,
        }
    }

    pub fn plain(granularity: Granularity) -> Self {
        Self {
            granularity,
            mask: false,
        }
    }
}

/// A labeled split of every element matching one selector
#[derive(Debug, Clone)]
pub struct SplitText {
    pub label: String,
    pub selector: String,
    pub granularity: Granularity,
    pub sources: Vec<ElementId>,
    pub units: Vec<ElementId>,
}

/// Breaks an element's text into unit elements
pub trait TextSplitter {
    fn split(
        &mut self,
        doc: &mut Document,
        target: ElementId,
        options: SplitOptions,
    ) -> Result<Vec<ElementId>>;
}

/// Splitter using grapheme clusters for chars and display-width word
/// wrapping for lines
#[derive(Debug, Clone)]
pub struct GraphemeSplitter {
    /// Line box width in terminal-style columns
    line_width: usize,
}

impl Default for GraphemeSplitter {
    fn default() -> Self {
        Self { line_width: 48 }
    }
}

impl GraphemeSplitter {
    pub fn new(line_width: usize) -> Self {
        Self {
            line_width: line_width.max(1),
        }
    }

    fn wrap_lines(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let needed = if current.is_empty() {
                    word.width()
                } else {
                    current.width() + 1 + word.width()
                };
                if needed > self.line_width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }
        lines
    }
}

impl TextSplitter for GraphemeSplitter {
    fn split(
        &mut self,
        doc: &mut Document,
        target: ElementId,
        options: SplitOptions,
    ) -> Result<Vec<ElementId>> {
        let text = doc.text(target).unwrap_or_default().to_string();
        let pieces: Vec<String> = match options.granularity {
            Granularity::Chars => text
                .graphemes(true)
                .filter(|g| !g.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Granularity::Lines => self.wrap_lines(&text),
        };

        let class = options.granularity.class();
        let mask_class = format!("{}-mask", class);
        let units = pieces
            .iter()
            .map(|piece| {
                let parent = if options.mask {
                    doc.append(target, "div", &mask_class, None)
                } else {
                    target
                };
                doc.append(parent, "div", class, Some(piece.as_str()))
            })
            .collect();

        doc.set_text(target, None);
        Ok(units)
    }
}

/// Split every element matching `selector` and collect the units under
/// one label
pub fn split_selector<S: TextSplitter + ?Sized>(
    doc: &mut Document,
    splitter: &mut S,
    label: &str,
    selector: &str,
    options: SplitOptions,
) -> Result<SplitText> {
    let sources = doc.query(selector)?;
    if sources.is_empty() {
        return Err(Error::ElementNotFound(selector.to_string()));
    }

    let mut units = Vec::new();
    for source in &sources {
        units.extend(splitter.split(doc, *source, options)?);
    }
    debug!(label, selector, units = units.len(), "Split text");

    Ok(SplitText {
        label: label.to_string(),
        selector: selector.to_string(),
        granularity: options.granularity,
        sources,
        units,
    })
}

/// Move each unit's text into an inner `span`, returning the spans
///
/// The outer unit keeps the stagger transform while the span carries the
/// slide and fade, so the two never write the same element.
pub fn wrap_inner(doc: &mut Document, units: &[ElementId]) -> Vec<ElementId> {
    units
        .iter()
        .map(|unit| {
            let text = doc.text(*unit).map(str::to_string);
            doc.set_text(*unit, None);
            doc.append(*unit, "span", "", text.as_deref())
        })
        .collect()
}

pub mod animator;
pub mod choreographer;
pub mod config;
pub mod document;
pub mod easing;
pub mod error;
pub mod page;
pub mod preloader;
pub mod site;
pub mod smooth;
pub mod split;
pub mod style;
pub mod ticker;
pub mod timeline;
pub mod timing;
pub mod trigger;

pub use animator::Animator;
pub use choreographer::{Observer, RevealLatch, ScrollChoreographer};
pub use config::{AppConfig, PinRelease, ScrollConfig};
pub use document::{Document, ElementId};
pub use easing::Ease;
pub use error::{Error, Result};
pub use preloader::{IncrementSource, Preloader, RandomIncrements, ScriptedIncrements};
pub use site::{FrameReport, Site};
pub use smooth::SmoothScroll;
pub use split::{GraphemeSplitter, TextSplitter};
pub use style::{Property, StyleSink, StyleStore, Value};
pub use ticker::{Frame, FrameScheduler};
pub use timeline::{Playhead, Position, Timeline, Tween};
pub use trigger::{ScrollPosition, ScrollTriggers, TriggerEvent, TriggerSpec};

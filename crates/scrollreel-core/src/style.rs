//! Animatable style properties and the store they are written to

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::document::ElementId;
use crate::timing::lerp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Horizontal translation
    X,
    /// Vertical translation
    Y,
    /// Vertical offset holding a pinned element in the viewport
    PinY,
    Scale,
    /// Horizontal scale only (progress bar fill)
    ScaleX,
    Opacity,
    BorderRadius,
    /// Radius of a centered `circle()` clip path
    ClipCircle,
    BackgroundColor,
}

impl Property {
    /// Value an element has before anything was written to it
    pub fn initial(&self) -> Value {
        match self {
            Property::X | Property::Y | Property::PinY | Property::BorderRadius => Value::Px(0.0),
            Property::Scale | Property::ScaleX | Property::Opacity => Value::Number(1.0),
            Property::ClipCircle => Value::Percent(100.0),
            Property::BackgroundColor => Value::Color("transparent".to_string()),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Property::X => "x",
            Property::Y => "y",
            Property::PinY => "pin-y",
            Property::Scale => "scale",
            Property::ScaleX => "scale-x",
            Property::Opacity => "opacity",
            Property::BorderRadius => "border-radius",
            Property::ClipCircle => "clip-circle",
            Property::BackgroundColor => "background-color",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Value {
    Number(f64),
    Px(f64),
    Percent(f64),
    Color(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) | Value::Px(v) | Value::Percent(v) => Some(*v),
            Value::Color(_) => None,
        }
    }

    /// Interpolate toward `to`
    ///
    /// A unitless number adopts the unit of the other side; other unit
    /// mismatches and colors jump to `to` once `t` reaches 1.
    pub fn interpolate(&self, to: &Value, t: f64) -> Value {
        use Value::*;
        match (self, to) {
            (Number(a), Number(b)) => Number(lerp(*a, *b, t)),
            (Px(a), Px(b)) | (Number(a), Px(b)) | (Px(a), Number(b)) => Px(lerp(*a, *b, t)),
            (Percent(a), Percent(b)) | (Number(a), Percent(b)) | (Percent(a), Number(b)) => {
                Percent(lerp(*a, *b, t))
            }
            _ if t >= 1.0 => to.clone(),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", round(*v)),
            Value::Px(v) => write!(f, "{}px", round(*v)),
            Value::Percent(v) => write!(f, "{}%", round(*v)),
            Value::Color(c) => f.write_str(c),
        }
    }
}

fn round(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Destination for computed styles
pub trait StyleSink {
    fn get(&self, target: ElementId, property: Property) -> Option<&Value>;

    fn set(&mut self, target: ElementId, property: Property, value: Value);

    /// Current value, falling back to the property's initial value
    fn computed(&self, target: ElementId, property: Property) -> Value {
        self.get(target, property)
            .cloned()
            .unwrap_or_else(|| property.initial())
    }

    fn set_all(&mut self, targets: &[ElementId], property: Property, value: Value) {
        for target in targets {
            self.set(*target, property, value.clone());
        }
    }
}

/// In-memory style table keyed by element and property
#[derive(Debug, Clone, Default)]
pub struct StyleStore {
    values: BTreeMap<(ElementId, Property), Value>,
    writes: u64,
}

impl StyleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of writes so far
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Numeric value of a property, initial value if never written
    pub fn number(&self, target: ElementId, property: Property) -> f64 {
        self.computed(target, property).as_f64().unwrap_or(0.0)
    }

    /// Every property written to `target`
    pub fn snapshot(&self, target: ElementId) -> Vec<(Property, Value)> {
        self.values
            .range((target, Property::X)..=(target, Property::BackgroundColor))
            .map(|((_, property), value)| (*property, value.clone()))
            .collect()
    }
}

impl StyleSink for StyleStore {
    fn get(&self, target: ElementId, property: Property) -> Option<&Value> {
        self.values.get(&(target, property))
    }

    fn set(&mut self, target: ElementId, property: Property, value: Value) {
        self.writes += 1;
        self.values.insert((target, property), value);
    }
}

//! Easing curves for tweens
//!
//! Maps linear progress in [0, 1] to eased progress in [0, 1]. Names follow
//! the familiar `powerN.in` / `powerN.out` / `powerN.inOut` notation so that
//! sequences read the same way a designer writes them down.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which end of the curve is slowed down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EaseDirection {
    In,
    Out,
    InOut,
}

/// Easing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    /// No easing
    Linear,
    /// Polynomial curve; `power1` is quadratic, `power4` is quintic
    Power(u8, EaseDirection),
}

impl Default for Ease {
    fn default() -> Self {
        Ease::Power(1, EaseDirection::Out)
    }
}

impl Ease {
    pub const POWER2_OUT: Ease = Ease::Power(2, EaseDirection::Out);
    pub const POWER3_OUT: Ease = Ease::Power(3, EaseDirection::Out);
    pub const POWER4_OUT: Ease = Ease::Power(4, EaseDirection::Out);
    pub const POWER4_IN_OUT: Ease = Ease::Power(4, EaseDirection::InOut);

    /// Apply the easing function to a progress value
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Ease::Linear => t,
            Ease::Power(power, direction) => {
                let exp = i32::from(power) + 1;
                match direction {
                    EaseDirection::In => t.powi(exp),
                    EaseDirection::Out => 1.0 - (1.0 - t).powi(exp),
                    EaseDirection::InOut => {
                        if t < 0.5 {
                            (2.0 * t).powi(exp) / 2.0
                        } else {
                            1.0 - (2.0 * (1.0 - t)).powi(exp) / 2.0
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::Linear => f.write_str("none"),
            Ease::Power(power, direction) => {
                let suffix = match direction {
                    EaseDirection::In => "in",
                    EaseDirection::Out => "out",
                    EaseDirection::InOut => "inOut",
                };
                write!(f, "power{}.{}", power, suffix)
            }
        }
    }
}

impl FromStr for Ease {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "none" || s == "linear" {
            return Ok(Ease::Linear);
        }

        let (name, direction) = match s.split_once('.') {
            Some((name, dir)) => (name, dir),
            None => (s, "out"),
        };
        let direction = match direction {
            "in" => EaseDirection::In,
            "out" => EaseDirection::Out,
            "inOut" => EaseDirection::InOut,
            _ => return Err(Error::UnknownEase(s.to_string())),
        };
        let power = name
            .strip_prefix("power")
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=4).contains(n))
            .ok_or_else(|| Error::UnknownEase(s.to_string()))?;

        Ok(Ease::Power(power, direction))
    }
}

impl TryFrom<String> for Ease {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Ease> for String {
    fn from(ease: Ease) -> Self {
        ease.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_eases() -> Vec<Ease> {
        let mut eases = vec![Ease::Linear];
        for power in 1..=4 {
            for direction in [EaseDirection::In, EaseDirection::Out, EaseDirection::InOut] {
                eases.push(Ease::Power(power, direction));
            }
        }
        eases
    }

    #[test]
    fn test_easing_boundaries() {
        for ease in all_eases() {
            assert!((ease.apply(0.0) - 0.0).abs() < 1e-9, "{} at t=0", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{} at t=1", ease);
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for ease in all_eases() {
            let mut prev = 0.0;
            for i in 0..=20 {
                let t = i as f64 / 20.0;
                let v = ease.apply(t);
                assert!(v >= prev, "{} not monotonic at t={}", ease, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_in_out_is_symmetric() {
        let ease = Ease::POWER4_IN_OUT;
        assert!((ease.apply(0.5) - 0.5).abs() < 1e-9);
        assert!((ease.apply(0.2) + ease.apply(0.8) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_is_fast_early() {
        assert!(Ease::POWER4_OUT.apply(0.25) > 0.25);
        assert!(Ease::Power(2, EaseDirection::In).apply(0.25) < 0.25);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("power4.inOut".parse::<Ease>().unwrap(), Ease::POWER4_IN_OUT);
        assert_eq!("power2.out".parse::<Ease>().unwrap(), Ease::POWER2_OUT);
        assert_eq!("power3".parse::<Ease>().unwrap(), Ease::POWER3_OUT);
        assert_eq!("none".parse::<Ease>().unwrap(), Ease::Linear);
        assert!("power9.out".parse::<Ease>().is_err());
        assert!("bounce.out".parse::<Ease>().is_err());
        assert!("power2.sideways".parse::<Ease>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        for ease in all_eases() {
            assert_eq!(ease.to_string().parse::<Ease>().unwrap(), ease);
        }
    }
}

//! Factory presets.
//!
//! Read-only; storing user presets is the host's business.

use crate::error::{Error, Result};
use crate::params::ReverbParams;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub params: ReverbParams,
}

const fn preset(name: &'static str, amount: f32, input_gain: f32, time: f32, diffusion: f32, lp: f32) -> Preset {
    Preset { name, params: ReverbParams::new(amount, input_gain, time, diffusion, lp) }
}

/// amount, input gain, time, diffusion, lp
pub const FACTORY_PRESETS: [Preset; 10] = [
    preset("Default", 0.50, 0.50, 0.50, 0.625, 0.70),
    preset("Small Room", 0.30, 0.40, 0.20, 0.50, 0.50),
    preset("Large Hall", 0.50, 0.50, 0.60, 0.625, 0.60),
    preset("Cathedral", 0.60, 0.45, 0.80, 0.70, 0.50),
    preset("Ambient Pad", 0.80, 0.50, 0.85, 0.80, 0.40),
    preset("Shimmer", 0.60, 0.60, 0.75, 0.70, 0.90),
    preset("Vintage Plate", 0.40, 0.60, 0.40, 0.70, 0.35),
    preset("Tight Ambience", 0.25, 0.45, 0.15, 0.55, 0.65),
    preset("Dark Space", 0.55, 0.50, 0.70, 0.65, 0.25),
    preset("Infinite", 0.70, 0.40, 0.95, 0.75, 0.45),
];

#[inline]
pub fn by_index(index: usize) -> Option<&'static Preset> {
    FACTORY_PRESETS.get(index)
}

/// Case-insensitive lookup; `-` and `_` match spaces.
pub fn by_name(name: &str) -> Result<&'static Preset> {
    let wanted = name.trim().replace(['-', '_'], " ");
    FACTORY_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| Error::UnknownPreset(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preset_matches_init_defaults() {
        assert_eq!(FACTORY_PRESETS[0].params, ReverbParams::DEFAULT);
    }

    #[test]
    fn presets_are_in_range() {
        for p in &FACTORY_PRESETS {
            assert_eq!(p.params, p.params.clamped(), "{}", p.name);
        }
    }

    #[test]
    fn lookup_by_name_is_forgiving() {
        assert_eq!(by_name("cathedral").unwrap().name, "Cathedral");
        assert_eq!(by_name("dark-space").unwrap().name, "Dark Space");
        assert_eq!(by_name("TIGHT_AMBIENCE").unwrap().name, "Tight Ambience");
        assert!(matches!(by_name("Bathroom"), Err(Error::UnknownPreset(_))));
    }

    #[test]
    fn lookup_by_index() {
        assert_eq!(by_index(9).map(|p| p.name), Some("Infinite"));
        assert!(by_index(10).is_none());
    }
}

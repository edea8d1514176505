//! The five reverb controls as a plain value type.
//!
//! All controls are normalized to [0, 1]. [`ReverbParams`] is what presets,
//! ramps and the FFI layer pass around; the reverb itself clamps again on
//! every setter, so an unclamped block is harmless.

use core::str::FromStr;

use fdnverb_core::dsp::clamp01;

use crate::error::Error;

/// Identifies one control.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// Wet/dry mix (0 = dry, 1 = wet).
    Amount,
    /// Gain into the diffusers.
    InputGain,
    /// Feedback gain of the two long delays (0 = short, 1 = endless).
    Time,
    /// Allpass coefficient of every diffuser (0 = sparse, 1 = dense).
    Diffusion,
    /// Low-pass coefficient inside the feedback loop (0 = dark, 1 = bright).
    Lowpass,
}

impl ParamId {
    pub const ALL: [ParamId; 5] =
        [ParamId::Amount, ParamId::InputGain, ParamId::Time, ParamId::Diffusion, ParamId::Lowpass];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            ParamId::Amount => 0,
            ParamId::InputGain => 1,
            ParamId::Time => 2,
            ParamId::Diffusion => 3,
            ParamId::Lowpass => 4,
        }
    }

    /// Stable identifier, used for CLI flags and host parameter ids.
    pub const fn name(self) -> &'static str {
        match self {
            ParamId::Amount => "amount",
            ParamId::InputGain => "input_gain",
            ParamId::Time => "time",
            ParamId::Diffusion => "diffusion",
            ParamId::Lowpass => "lp",
        }
    }
}

impl FromStr for ParamId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        ParamId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| Error::UnknownParameter(s.to_string()))
    }
}

/// A full set of reverb controls.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReverbParams {
    pub amount: f32,
    pub input_gain: f32,
    pub time: f32,
    pub diffusion: f32,
    pub lp: f32,
}

impl ReverbParams {
    pub const DEFAULT: ReverbParams =
        ReverbParams { amount: 0.5, input_gain: 0.5, time: 0.5, diffusion: 0.625, lp: 0.7 };

    pub const fn new(amount: f32, input_gain: f32, time: f32, diffusion: f32, lp: f32) -> Self {
        Self { amount, input_gain, time, diffusion, lp }
    }

    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Amount => self.amount,
            ParamId::InputGain => self.input_gain,
            ParamId::Time => self.time,
            ParamId::Diffusion => self.diffusion,
            ParamId::Lowpass => self.lp,
        }
    }

    pub fn set(&mut self, id: ParamId, value: f32) {
        let slot = match id {
            ParamId::Amount => &mut self.amount,
            ParamId::InputGain => &mut self.input_gain,
            ParamId::Time => &mut self.time,
            ParamId::Diffusion => &mut self.diffusion,
            ParamId::Lowpass => &mut self.lp,
        };
        *slot = value;
    }

    /// Every field clamped into [0, 1].
    pub fn clamped(self) -> Self {
        Self {
            amount: clamp01(self.amount),
            input_gain: clamp01(self.input_gain),
            time: clamp01(self.time),
            diffusion: clamp01(self.diffusion),
            lp: clamp01(self.lp),
        }
    }
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_names() {
        for id in ParamId::ALL {
            assert_eq!(id.name().parse::<ParamId>().unwrap(), id);
            assert_eq!(ParamId::ALL[id.index()], id);
        }
        assert_eq!("Input-Gain".parse::<ParamId>().unwrap(), ParamId::InputGain);
        assert_eq!(
            "wetness".parse::<ParamId>().unwrap_err(),
            Error::UnknownParameter("wetness".into())
        );
    }

    #[test]
    fn get_and_set_address_the_same_field() {
        let mut p = ReverbParams::default();
        for (i, id) in ParamId::ALL.into_iter().enumerate() {
            p.set(id, i as f32 * 0.1);
        }
        for (i, id) in ParamId::ALL.into_iter().enumerate() {
            assert_eq!(p.get(id), i as f32 * 0.1);
        }
    }

    #[test]
    fn clamped_pins_every_field() {
        let p = ReverbParams::new(-1.0, 2.0, 0.5, 1.5, -0.1).clamped();
        assert_eq!(p, ReverbParams::new(0.0, 1.0, 0.5, 1.0, 0.0));
    }
}

//! Storage encodings for the ring buffer.
//!
//! The encoding only decides how many bytes each stored sample costs; all
//! processing happens in `f32`. Pick one per engine through the type
//! parameter:
//!
//! - [`Float32`] : passthrough, 4 bytes per sample
//! - [`Fixed16`] : 16-bit offset-binary code, step 1/32768
//! - [`Fixed12`] : 12-bit offset-binary code (held in a `u16`), step 1/2048
//!
//! Fixed-point encodings map the nominal [-1, 1] range onto codes centered at
//! mid-scale and clip anything outside to the nearest representable code.

use core::fmt::Debug;

use crate::dsp::clamp;

/// A sample encoding used by [`FxEngine`](crate::engine::FxEngine).
pub trait SampleFormat: Copy + Debug + Default + 'static {
    /// What one buffer slot holds.
    type Word: Copy + Debug + Send + Sync + 'static;

    /// The word that decodes to silence.
    const ZERO: Self::Word;

    fn compress(value: f32) -> Self::Word;
    fn decompress(word: Self::Word) -> f32;
}

/// Full-precision passthrough.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Float32;

impl SampleFormat for Float32 {
    type Word = f32;
    const ZERO: f32 = 0.0;

    #[inline]
    fn compress(value: f32) -> f32 {
        value
    }

    #[inline]
    fn decompress(word: f32) -> f32 {
        word
    }
}

/// 16-bit fixed point, mid-scale 32768.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Fixed16;

impl Fixed16 {
    const MID: f32 = 32_768.0;
    const MAX_CODE: f32 = 65_535.0;
}

impl SampleFormat for Fixed16 {
    type Word = u16;
    const ZERO: u16 = 32_768;

    #[inline]
    fn compress(value: f32) -> u16 {
        quantize(value, Self::MID, Self::MAX_CODE)
    }

    #[inline]
    fn decompress(word: u16) -> f32 {
        (f32::from(word) - Self::MID) / Self::MID
    }
}

/// 12-bit fixed point, mid-scale 2048.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Fixed12;

impl Fixed12 {
    const MID: f32 = 2_048.0;
    const MAX_CODE: f32 = 4_095.0;
}

impl SampleFormat for Fixed12 {
    type Word = u16;
    const ZERO: u16 = 2_048;

    #[inline]
    fn compress(value: f32) -> u16 {
        quantize(value, Self::MID, Self::MAX_CODE)
    }

    #[inline]
    fn decompress(word: u16) -> f32 {
        (f32::from(word) - Self::MID) / Self::MID
    }
}

/// Round `value * mid + mid` to the nearest code in `[0, max_code]`.
#[inline]
fn quantize(value: f32, mid: f32, max_code: f32) -> u16 {
    // +0.5 then truncation rounds to nearest; the code is already non-negative
    let code = clamp(value * mid + mid + 0.5, 0.0, max_code);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        code as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sweep() -> impl Iterator<Item = f32> {
        (0..=400_u16).map(|i| (f32::from(i) - 200.0) / 200.0)
    }

    #[test]
    fn float32_is_passthrough() {
        for v in [0.123_45, -3.5, 0.0, 1.0e-12] {
            assert_eq!(Float32::decompress(Float32::compress(v)), v);
        }
    }

    #[test]
    fn fixed16_round_trip_within_one_step() {
        for v in sweep() {
            let back = Fixed16::decompress(Fixed16::compress(v));
            assert_abs_diff_eq!(back, v, epsilon = 1.0 / 32_768.0);
        }
    }

    #[test]
    fn fixed12_round_trip_within_one_step() {
        for v in sweep() {
            let back = Fixed12::decompress(Fixed12::compress(v));
            assert_abs_diff_eq!(back, v, epsilon = 1.0 / 2_048.0);
        }
    }

    #[test]
    fn codes_are_centered_at_mid_scale() {
        assert_eq!(Fixed16::compress(0.0), Fixed16::ZERO);
        assert_eq!(Fixed16::compress(0.5), 49_152);
        assert_eq!(Fixed12::compress(0.0), Fixed12::ZERO);
        assert_eq!(Fixed12::compress(0.5), 3_072);
        assert_eq!(Fixed16::decompress(Fixed16::ZERO), 0.0);
        assert_eq!(Fixed12::decompress(Fixed12::ZERO), 0.0);
    }

    #[test]
    fn out_of_range_clips_to_extremes() {
        assert_eq!(Fixed16::compress(2.0), 65_535);
        assert_eq!(Fixed16::compress(-7.0), 0);
        assert_eq!(Fixed12::compress(1.5), 4_095);
        assert_eq!(Fixed12::compress(-1.5), 0);

        assert_abs_diff_eq!(Fixed16::decompress(Fixed16::compress(2.0)), 1.0, epsilon = 1.0 / 32_768.0);
        assert_abs_diff_eq!(Fixed16::decompress(Fixed16::compress(-2.0)), -1.0, epsilon = 1.0 / 32_768.0);
        assert_abs_diff_eq!(Fixed12::decompress(Fixed12::compress(9.0)), 1.0, epsilon = 1.0 / 2_048.0);
        assert_abs_diff_eq!(Fixed12::decompress(Fixed12::compress(-9.0)), -1.0, epsilon = 1.0 / 2_048.0);
    }
}

//! Transmit power boost for short frames
//!
//! Regulatory limits cap the mean power over a 1 ms window. A frame shorter
//! than the reference 1 ms may therefore transmit proportionally louder, by
//! 10*log10(1000/duration) dB. The boost is tabulated in 0.1 dB steps, with
//! a fine-grained table where the curve is steep and a coarse one above
//! 200 us; [`linear_gain`] turns a dB-domain adjustment back into the linear
//! factor the TX power registers want.

use crate::lut;

/// Frame duration carrying no boost, in microseconds.
const REFERENCE_DURATION_US: u16 = 1000;

/// Largest boost the hardware can apply, in 0.1 dB steps.
pub const BOOST_MAX: u8 = 113;

const FINE_BASE_US: u16 = 70;
const FINE_STEP_US: u16 = 10;
const FINE_MAX_US: u16 = 200;
/// Boost for durations from 70 to 200 us in 10 us steps, 0.1 dB units,
/// capped at [`BOOST_MAX`].
const FINE_TABLE: [u8; 14] = [113, 110, 105, 100, 96, 92, 89, 85, 82, 80, 77, 74, 72, 70];

const COARSE_BASE_US: u16 = 200;
const COARSE_STEP_US: u16 = 25;
/// Boost for durations from 200 to 1000 us in 25 us steps, 0.1 dB units.
const COARSE_TABLE: [u8; 33] = [
    70, 65, 60, 56, 52, 49, 46, 43, 40, 37, 35, 32, 30, 28, 26, 24, 22, 20,
    19, 17, 15, 14, 12, 11, 10, 8, 7, 6, 5, 3, 2, 1, 0,
];

/// Base-2 exponent of one 0.25 dB power step, with 18 fractional bits.
const QUARTER_DB_EXP: i32 = 21_771;

/// TX power boost for a frame of the given duration, in 0.1 dB steps
///
/// Durations at or above the 1 ms reference get no boost; durations below
/// the fine table get the maximum. In between, the nearest table entry is
/// used, rounding past the midpoint of a step.
pub fn boost(frame_duration_us: u16) -> u8 {
    if frame_duration_us >= REFERENCE_DURATION_US {
        return 0;
    }
    if frame_duration_us < FINE_BASE_US {
        return FINE_TABLE[0];
    }

    let (base, step, table): (u16, u16, &[u8]) = if frame_duration_us <= FINE_MAX_US {
        (FINE_BASE_US, FINE_STEP_US, &FINE_TABLE)
    } else {
        (COARSE_BASE_US, COARSE_STEP_US, &COARSE_TABLE)
    };

    let offset = frame_duration_us - base;
    let mut index = (offset / step) as usize;
    if (offset % step) * 2 > step {
        index += 1;
    }

    table[index]
}

/// Linear power scale factor for a gain in 0.25 dB steps, scaled by 2^8
///
/// `linear_gain(0) == 256`; four steps (1 dB) multiply the factor by about
/// 1.26. Used to fold a boost into the TX power coarse/fine register
/// settings.
pub fn linear_gain(quarter_db: i32) -> u32 {
    lut::pow2(quarter_db.saturating_mul(QUARTER_DB_EXP))
}

//! Received signal level estimation from CIA diagnostics
//!
//! DW3000 User Manual 4.7.1-4.7.2: the receiver reports the accumulated
//! channel power and the first-path amplitudes of the channel impulse
//! response; the signal level in dBm follows as
//! 10*log10(power * 2^exp / n^2), corrected for the DGC gain and a
//! per-configuration calibration constant. The estimate is quite accurate up
//! to -85 dBm and underestimates above that.
//!
//! Everything here is integer math on top of [`lut`], returning Q8.8 dBm.

use fixed::types::I8F8;

use crate::lut::{self, LUT_LOG_SHIFT};

/// Level reported when no estimate is possible.
///
/// Returned for empty diagnostics (zero power or zero accumulation count);
/// saturated results land here as well.
pub const INVALID_SIGNAL_POWER: I8F8 = I8F8::MIN;

/// Lowest RX preamble code running at 64 MHz PRF. Codes below use 16 MHz.
const PRF64_FIRST_CODE: u8 = 9;

/// Calibration offsets in Q8.8 dB.
const OFFSET_PRF64: i32 = 31155; // 121.7 dB
const OFFSET_PRF16: i32 = 29133; // 113.8 dB
/// STS preambles use the 64 MHz constant lowered by 1.0 dB.
const OFFSET_STS_ADJUST: i32 = 256;

/// One DGC decision step is worth 6 dB, in Q8.8.
const DGC_STEP: i32 = 6 * 256;

/// Converts a log2 value scaled by 2^15 into Q8.8 decibels.
///
/// 10/log2(10) in Q8.8 is 770.64; folding the 2^15 log scaling into the
/// shift gives 12330 / 2^19.
const DB_Q8_MULT: i64 = 12_330;
const DB_Q8_SHIFT: u32 = 19;

/// Estimates the received signal level in dBm (Q8.8)
///
/// `power` is the accumulated channel power, `accum_count` the number of
/// accumulated preamble symbols, `pow2_exp` the power-of-two exponent the
/// hardware scaled the accumulator by, `dgc_decision` the applied digital
/// gain step in [0, 7], and `rx_code` the RX preamble code that selects the
/// PRF calibration constant.
///
/// Returns [`INVALID_SIGNAL_POWER`] when `power` or `accum_count` is zero.
/// Results below the representable minimum saturate instead of wrapping.
pub fn rx_signal_power(
    power: u32,
    accum_count: u16,
    pow2_exp: u8,
    dgc_decision: u8,
    rx_code: u8,
    sts: bool,
) -> I8F8 {
    if power == 0 || accum_count == 0 {
        return INVALID_SIGNAL_POWER;
    }

    let n = accum_count as u32;
    let log2_ratio = (((pow2_exp as u32) << LUT_LOG_SHIFT) as i64) + lut::log2(power) as i64
        - 2 * lut::log2(n) as i64;

    let mut level = (log2_ratio * DB_Q8_MULT) >> DB_Q8_SHIFT;
    level += (DGC_STEP * dgc_decision as i32) as i64;
    level -= calibration_offset(rx_code, sts) as i64;

    I8F8::from_bits(level.clamp(i16::MIN as i64, i16::MAX as i64) as i16)
}

/// Estimates the first-path signal level in dBm (Q8.8)
///
/// `f1`, `f2`, `f3` are the three first-path amplitude magnitudes. They carry
/// two fractional bits, so each is divided by four before being squared and
/// summed into the channel power estimate.
pub fn first_path_signal_power(
    f1: u32,
    f2: u32,
    f3: u32,
    accum_count: u16,
    dgc_decision: u8,
    rx_code: u8,
    sts: bool,
) -> I8F8 {
    let f1 = (f1 >> 2) as u64;
    let f2 = (f2 >> 2) as u64;
    let f3 = (f3 >> 2) as u64;

    let power = (f1 * f1 + f2 * f2 + f3 * f3).min(u32::MAX as u64) as u32;

    rx_signal_power(power, accum_count, 0, dgc_decision, rx_code, sts)
}

fn calibration_offset(rx_code: u8, sts: bool) -> i32 {
    if rx_code >= PRF64_FIRST_CODE {
        if sts {
            OFFSET_PRF64 - OFFSET_STS_ADJUST
        } else {
            OFFSET_PRF64
        }
    } else {
        OFFSET_PRF16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dbm(level: I8F8) -> f32 {
        level.to_num::<f32>()
    }

    #[test]
    fn empty_diagnostics_are_invalid() {
        assert_eq!(rx_signal_power(0, 65, 21, 0, 9, false), INVALID_SIGNAL_POWER);
        assert_eq!(rx_signal_power(47, 0, 21, 0, 9, false), INVALID_SIGNAL_POWER);
        assert_eq!(
            first_path_signal_power(0, 0, 0, 65, 0, 9, false),
            INVALID_SIGNAL_POWER
        );
    }

    #[test]
    fn channel_power_reference_values() {
        // 10*log10(47 * 2^21 / 65^2) - 121.7 = -78.02 dBm
        let level = rx_signal_power(47, 65, 21, 0, 9, false);
        assert!((dbm(level) + 78.0).abs() < 0.05, "got {}", dbm(level));

        // One DGC step adds 6 dB: 38.10 + 6 - 121.7 = -77.60 dBm
        let level = rx_signal_power(13, 65, 21, 1, 9, false);
        assert!((dbm(level) + 77.6).abs() < 0.05, "got {}", dbm(level));
    }

    #[test]
    fn prf_selection_by_rx_code() {
        let prf64 = rx_signal_power(47, 65, 21, 0, 9, false);
        let prf16 = rx_signal_power(47, 65, 21, 0, 8, false);

        // Same diagnostics, 7.9 dB apart through the calibration constant.
        assert!((dbm(prf16) - dbm(prf64) - 7.9).abs() < 0.01);

        // STS segments lower the 64 MHz constant by exactly 1 dB.
        let sts = rx_signal_power(47, 65, 21, 0, 9, true);
        assert!((dbm(sts) - dbm(prf64) - 1.0).abs() < 0.01);

        // The STS adjustment does not apply at 16 MHz PRF.
        let sts16 = rx_signal_power(47, 65, 21, 0, 8, true);
        assert_eq!(sts16, prf16);
    }

    #[test]
    fn saturates_to_minimum() {
        // n^2 dominates the tiny power value; the true result is near
        // -149 dBm, far below what Q8.8 can carry.
        let level = rx_signal_power(4, 65535, 21, 0, 9, false);
        assert_eq!(level, INVALID_SIGNAL_POWER);
    }

    #[test]
    fn first_path_reference_value() {
        let level = first_path_signal_power(0x26d9, 0x27ea, 0x159e, 0x3f, 3, 10, true);
        assert!((dbm(level) + 67.04).abs() < 0.05, "got {}", dbm(level));
    }
}

//! Fixed-point base-2 logarithm and exponent approximations
//!
//! The receive path needs 10*log10() style conversions and the TX power path
//! needs the inverse, on targets without a floating point unit. Both are done
//! here with 33-entry lookup tables and integer arithmetic only.

/// Number of fractional bits in scaled log2 values.
pub const LUT_LOG_SHIFT: u32 = 15;

/// Returned by [`decibel`] when the input has no representable level.
pub const DECIBEL_INVALID: u16 = 0xffff;

/// log2(1 + i/32) << LUT_LOG_SHIFT, for i in 0..=32.
const LOG2_TABLE: [u16; 33] = [
    0, 1455, 2866, 4236, 5568, 6863, 8124, 9352, 10549, 11716, 12855, 13968,
    15055, 16117, 17156, 18173, 19168, 20143, 21098, 22034, 22952, 23852,
    24736, 25604, 26455, 27292, 28114, 28922, 29717, 30498, 31267, 32024,
    32768,
];

/// 2^(i/32) << 15, for i in 0..=32.
const POW2_TABLE: [u32; 33] = [
    32768, 33486, 34219, 34968, 35734, 36516, 37316, 38133, 38968, 39821,
    40693, 41584, 42495, 43425, 44376, 45348, 46341, 47356, 48393, 49452,
    50535, 51642, 52773, 53928, 55109, 56316, 57549, 58809, 60097, 61413,
    62757, 64132, 65536,
];

/// log2(10) << LUT_LOG_SHIFT.
const LOG2_10: u64 = 108_853;

/// Number of fractional bits in [`pow2`] exponents.
const POW2_FRAC_SHIFT: u32 = 18;

/// Approximates log2(x), scaled by 2^[`LUT_LOG_SHIFT`]
///
/// The position of the most significant set bit is the integer part; the five
/// bits below it index [`LOG2_TABLE`]. When the residual below those five bits
/// exceeds a quarter of a table step, the midpoint of the two neighbouring
/// entries is used instead of the lower one.
///
/// log2 is undefined for zero; `log2(0)` returns 0 and callers that care must
/// check first, as [`decibel`] does.
pub fn log2(x: u32) -> u32 {
    if x == 0 {
        return 0;
    }

    let z = 31 - x.leading_zeros();
    let frac = x - (1 << z);

    let interpolated = if z > 5 {
        let idx = (frac >> (z - 5)) as usize;
        let residual = frac & ((1 << (z - 5)) - 1);
        if residual * 4 > 1 << (z - 5) {
            (LOG2_TABLE[idx] as u32 + LOG2_TABLE[idx + 1] as u32 + 1) / 2
        } else {
            LOG2_TABLE[idx] as u32
        }
    } else {
        // Fewer than five bits below the MSB, no residual to interpolate.
        LOG2_TABLE[(frac << (5 - z)) as usize] as u32
    };

    interpolated + (z << LUT_LOG_SHIFT)
}

/// Approximates 10*log10(x) in units of 0.01 dB
///
/// Returns [`DECIBEL_INVALID`] for `x == 0`.
pub fn decibel(x: u32) -> u16 {
    if x == 0 {
        return DECIBEL_INVALID;
    }
    ((log2(x) as u64 * 1000 + LOG2_10 / 2) / LOG2_10) as u16
}

/// Approximates 2^exponent, where the exponent carries 18 fractional bits
///
/// The integer part of the exponent becomes a shift, to the right for
/// negative exponents; the fractional part is rounded to the nearest
/// [`POW2_TABLE`] entry. The result is scaled by 2^8, so `pow2(0) == 256`.
/// Exponents outside what a u32 result can carry saturate to `u32::MAX`
/// or 0.
pub fn pow2(exponent: i32) -> u32 {
    let mut int = exponent >> POW2_FRAC_SHIFT;
    let frac = (exponent - (int << POW2_FRAC_SHIFT)) as u32;

    let mut idx = ((frac + (1 << (POW2_FRAC_SHIFT - 6))) >> (POW2_FRAC_SHIFT - 5)) as usize;
    if idx == 32 {
        int += 1;
        idx = 0;
    }

    let scaled = POW2_TABLE[idx] as u64;
    let value = if int >= 0 {
        if int > 16 {
            return u32::MAX;
        }
        scaled << int
    } else {
        if int < -23 {
            return 0;
        }
        scaled >> -int as u32
    };

    (value >> 7) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log2_exact_powers_of_two() {
        assert_eq!(log2(1), 0);
        assert_eq!(log2(2), 1 << LUT_LOG_SHIFT);
        assert_eq!(log2(1024), 10 << LUT_LOG_SHIFT);
        assert_eq!(log2(1 << 31), 31 << LUT_LOG_SHIFT);
    }

    #[test]
    fn log2_stays_within_one_table_step() {
        let max_step = (LOG2_TABLE[1] - LOG2_TABLE[0]) as f64;

        let mut check = |x: u32| {
            let approx = log2(x) as f64;
            let exact = (x as f64).log2() * f64::from(1u32 << LUT_LOG_SHIFT);
            assert!(
                (approx - exact).abs() <= max_step,
                "log2({}) = {}, expected about {}",
                x,
                approx,
                exact
            );
        };

        for x in 1..=4096 {
            check(x);
        }
        for x in (0x0010_0000..=0xffff_ffffu32).step_by(0x000f_fff7) {
            check(x);
        }
        check(u32::MAX);
    }

    #[test]
    fn decibel_of_zero_is_invalid() {
        assert_eq!(decibel(0), DECIBEL_INVALID);
    }

    #[test]
    fn decibel_known_values() {
        // 10*log10(1000) = 30 dB, in 0.01 dB units.
        assert_eq!(decibel(1000), 3000);
        // 10*log10(2) = 3.01 dB.
        assert_eq!(decibel(2), 301);
        assert_eq!(decibel(1), 0);
    }

    #[test]
    fn pow2_integer_exponents() {
        assert_eq!(pow2(0), 256);
        assert_eq!(pow2(1 << POW2_FRAC_SHIFT), 512);
        assert_eq!(pow2(3 << POW2_FRAC_SHIFT), 2048);
        assert_eq!(pow2(-(1 << POW2_FRAC_SHIFT)), 128);
    }

    #[test]
    fn pow2_saturates() {
        assert_eq!(pow2(i32::MAX), u32::MAX);
        assert_eq!(pow2(i32::MIN), 0);
    }

    #[test]
    fn pow2_tracks_float_reference() {
        for step in -128..=128 {
            let exponent = step * (1 << (POW2_FRAC_SHIFT - 5));
            let approx = pow2(exponent) as f64 / 256.0;
            let exact = 2f64.powf(exponent as f64 / f64::from(1u32 << POW2_FRAC_SHIFT));
            let relative = (approx - exact).abs() / exact;
            assert!(
                relative < 0.02,
                "pow2({}) = {}, expected about {}",
                exponent,
                approx,
                exact
            );
        }
    }
}

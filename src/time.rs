//! Time-related types based on the DW3000's system time
//!
//! The chip runs two clocks off the same oscillator: the 40-bit timestamp
//! counter reported in the TX/RX time registers, and the truncated 32-bit
//! device-time (DTU) clock used for event scheduling. One device time unit is
//! 1/(128 * 499.2 MHz) s, about 15.65 ps; both counters wrap.

use core::ops::{Add, Sub};

#[cfg(feature = "defmt")]
use defmt::Format;

/// The maximum value of 40-bit system time stamps.
pub const TIME_MAX: u64 = 0xffffffffff;

/// Device time units per 10 microseconds (63897.6 DTU per microsecond).
const DTU_PER_10US: u64 = 638_976;

/// Converts microseconds to device time units on the 32-bit scheduling clock.
///
/// The result is truncated to 32 bits, which is the wrapping the clock itself
/// performs.
pub fn dtu_from_us(us: u32) -> u32 {
    ((us as u64 * DTU_PER_10US + 5) / 10) as u32
}

/// Converts a signed device-time difference to whole microseconds.
///
/// The argument is the 32-bit narrowing of a 64-bit subtraction of two clock
/// snapshots, so it stays correct across clock wraparound.
pub fn us_from_dtu(dtu: i32) -> i32 {
    ((dtu as i64 * 10) / DTU_PER_10US as i64) as i32
}

/// Represents an instant in time
///
/// Internally uses the same 40-bit timestamps that the DW3000 uses. Reading
/// one out of the hardware goes through [`ranging::tx_timestamp`] or
/// [`ranging::rx_timestamp`].
///
/// [`ranging::tx_timestamp`]: crate::ranging::tx_timestamp
/// [`ranging::rx_timestamp`]: crate::ranging::rx_timestamp
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Instant(u64);

impl Instant {
    /// Creates a new instance of `Instant`
    ///
    /// The given value must fit in a 40-bit timestamp, so:
    /// 0 <= `value` <= 2^40 - 1
    ///
    /// Returns `Some(...)`, if `value` is within the valid range, `None` if it
    /// isn't.
    ///
    /// # Example
    ///
    /// ``` rust
    /// use dw3000_ranging::time::{
    ///     TIME_MAX,
    ///     Instant,
    /// };
    ///
    /// let valid_instant   = Instant::new(TIME_MAX);
    /// let invalid_instant = Instant::new(TIME_MAX + 1);
    ///
    /// assert!(valid_instant.is_some());
    /// assert!(invalid_instant.is_none());
    /// ```
    pub fn new(value: u64) -> Option<Self> {
        if value <= TIME_MAX {
            Some(Instant(value))
        } else {
            None
        }
    }

    /// Decodes a timestamp from its 5-byte field layout
    ///
    /// The chip carries timestamps least-significant byte first. Five bytes
    /// always fit in 40 bits, so this cannot fail.
    ///
    /// # Example
    ///
    /// ``` rust
    /// use dw3000_ranging::time::Instant;
    ///
    /// let instant = Instant::from_le_bytes([0x11, 0x22, 0x33, 0x44, 0x55]);
    /// assert_eq!(instant.value(), 0x5544332211);
    /// ```
    pub fn from_le_bytes(bytes: [u8; 5]) -> Self {
        let mut value = 0u64;
        for (i, byte) in bytes.iter().enumerate() {
            value |= (*byte as u64) << (8 * i);
        }
        Instant(value)
    }

    /// Encodes the timestamp into its 5-byte field layout
    ///
    /// Exact inverse of [`Instant::from_le_bytes`] for all 40-bit values.
    pub fn to_le_bytes(self) -> [u8; 5] {
        let mut bytes = [0; 5];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (self.0 >> (8 * i)) as u8;
        }
        bytes
    }

    /// Returns the raw 40-bit timestamp
    ///
    /// The returned value is guaranteed to be in the following range:
    /// 0 <= `value` <= 2^40 - 1
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the amount of time passed between the two `Instant`s
    ///
    /// Assumes that `&self` represents a later time than the argument
    /// `earlier`. Please make sure that this is the case, as this method has no
    /// way of knowing (DW3000 timestamps can overflow, so comparing the
    /// numerical value of the timestamp doesn't tell anything about order).
    ///
    /// # Example
    ///
    /// ``` rust
    /// use dw3000_ranging::time::{
    ///     TIME_MAX,
    ///     Instant,
    /// };
    ///
    /// // `unwrap`ing here is okay, since we're passing constants that we know
    /// // are in the valid range.
    /// let instant_1 = Instant::new(TIME_MAX - 50).unwrap();
    /// let instant_2 = Instant::new(TIME_MAX).unwrap();
    /// let instant_3 = Instant::new(49).unwrap();
    ///
    /// // Works as expected, if the later timestamp is larger than the earlier
    /// // one.
    /// let duration = instant_2.duration_since(instant_1);
    /// assert_eq!(duration.value(), 50);
    ///
    /// // Still works as expected, if the later timestamp is the numerically
    /// // smaller value.
    /// let duration = instant_3.duration_since(instant_2);
    /// assert_eq!(duration.value(), 50);
    /// ```
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        if self.value() >= earlier.value() {
            Duration(self.value() - earlier.value())
        } else {
            Duration(TIME_MAX - earlier.value() + self.value() + 1)
        }
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Self::Output {
        // Both `Instant` and `Duration` are guaranteed to contain 40-bit
        // numbers, so this addition will never overflow.
        let value = (self.value() + rhs.value()) % (TIME_MAX + 1);

        // We made sure to keep the result of the addition within `TIME_MAX`, so
        // the following will never panic.
        Instant::new(value).unwrap()
    }
}

impl Sub<Duration> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Duration) -> Self::Output {
        // Adding the modular complement of `rhs` avoids an intermediate
        // negative value while wrapping the same way the counter does.
        let value = (self.value() + (TIME_MAX + 1 - rhs.value())) % (TIME_MAX + 1);

        // We made sure to keep the result within `TIME_MAX`, so the following
        // will never panic.
        Instant::new(value).unwrap()
    }
}

/// A duration between two instants in DW3000 system time
///
/// Internally uses the same 40-bit timestamps that the DW3000 uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Duration(u64);

impl Duration {
    /// Creates a new instance of `Duration`
    ///
    /// The given value must fit in a 40-bit timestamp, so:
    /// 0 <= `value` <= 2^40 - 1
    ///
    /// Returns `Some(...)`, if `value` is within the valid range, `None` if it
    /// isn't.
    ///
    /// # Example
    ///
    /// ``` rust
    /// use dw3000_ranging::time::{
    ///     TIME_MAX,
    ///     Duration,
    /// };
    ///
    /// let valid_duration   = Duration::new(TIME_MAX);
    /// let invalid_duration = Duration::new(TIME_MAX + 1);
    ///
    /// assert!(valid_duration.is_some());
    /// assert!(invalid_duration.is_none());
    /// ```
    pub fn new(value: u64) -> Option<Self> {
        if value <= TIME_MAX {
            Some(Duration(value))
        } else {
            None
        }
    }

    /// Creates an instance of `Duration` from a number of nanoseconds, rounding to the nearest
    ///
    /// On the DW3000, the TX_TIME/RX_TIME registers have a resolution of 40-bits
    /// and a unit of 1/(128*499.2*10^6) seconds. This means that 1 nanosecond
    /// is 63.8976 DW3000 time units.
    ///
    /// We do this with fixed point arithmetic, where
    /// (dividend + (divisor / 2)) / divisor
    pub fn from_nanos(nanos: u32) -> Self {
        // `nanos` takes up at most 32 bits before it is cast to `u64`. That
        // means the result of the multiplication fits within 38 bits, so the
        // following should never panic.
        Duration::new((nanos as u64 * 638976 + 5000) / 10000).unwrap()
    }

    /// Returns the raw 40-bit timestamp
    ///
    /// The returned value is guaranteed to be in the following range:
    /// 0 <= `value` <= 2^40 - 1
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_add_duration() {
        let instant = Instant::new(0).unwrap();
        let duration = Duration::new(1).unwrap();

        let result = instant + duration;

        assert_eq!(result.value(), 1);
    }

    #[test]
    fn instant_sub_duration() {
        let instant = Instant::new(1).unwrap();
        let duration = Duration::new(1).unwrap();

        let result = instant - duration;

        assert_eq!(result.value(), 0);
    }

    #[test]
    fn instant_sub_duration_wraps() {
        let instant = Instant::new(10).unwrap();
        let duration = Duration::new(11).unwrap();

        let result = instant - duration;

        assert_eq!(result.value(), TIME_MAX);
    }

    #[test]
    fn instant_duration_since() {
        let instant_1 = Instant::new(1).unwrap();
        let instant_2 = Instant::new(0).unwrap();

        let result = instant_1.duration_since(instant_2);

        assert_eq!(result.value(), 1);
    }

    #[test]
    fn duration_from_nanos() {
        let duration = Duration::from_nanos(1);

        assert_eq!(duration.value(), 64);

        let duration = Duration::from_nanos(6);

        assert_eq!(duration.value(), 383);
    }

    #[test]
    fn timestamp_codec_round_trip() {
        for value in [0, 1, 0x0123456789, TIME_MAX] {
            let instant = Instant::new(value).unwrap();
            let decoded = Instant::from_le_bytes(instant.to_le_bytes());
            assert_eq!(decoded.value(), value);
        }
    }

    #[test]
    fn timestamp_codec_byte_order() {
        let instant = Instant::from_le_bytes([0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(instant.value(), 0x5544332211);
        assert_eq!(instant.to_le_bytes(), [0x11, 0x22, 0x33, 0x44, 0x55]);
    }

    #[test]
    fn dtu_us_conversions() {
        assert_eq!(dtu_from_us(0), 0);
        assert_eq!(dtu_from_us(10), 638_976);
        assert_eq!(dtu_from_us(1), 63_898);

        assert_eq!(us_from_dtu(638_976), 10);
        assert_eq!(us_from_dtu(-638_976), -10);
    }

    #[test]
    fn dtu_difference_survives_wraparound() {
        let before: u32 = u32::MAX - 1000;
        let after: u32 = before.wrapping_add(638_976);

        let diff = (after as i64 - before as i64) as i32;
        assert_eq!(us_from_dtu(diff), 10);
    }

    // Reply-time arithmetic of a single-sided two-way-ranging exchange, with
    // the response timestamps wrapping the 40-bit counter.
    #[test]
    fn two_way_ranging_round_trip_time() {
        let t1 = Instant::new(TIME_MAX - 10_000).unwrap();
        let t4 = Instant::new(90_000).unwrap();
        let t2 = Instant::new(TIME_MAX - 5_000).unwrap();
        let t3 = t2 + Duration::new(55_000).unwrap();

        let t_round = t4.duration_since(t1);
        let t_reply = t3.duration_since(t2);

        assert_eq!(t_round.value(), 100_001);
        assert_eq!(t_reply.value(), 55_000);
        assert_eq!((t_round.value() - t_reply.value()) / 2, 22_500);
    }
}

//! Configuration types for ranging exchanges
//!
//! This module houses the datastructures that describe the frames of a
//! two-way-ranging exchange: data rate, preamble length and STS segment
//! length. The timing computations in [`ranging`] take them as pure inputs,
//! immutable for the duration of one computation.
//!
//! [`ranging`]: crate::ranging

#[cfg(feature = "defmt")]
use defmt::Format;

/// Timing-relevant description of the frames of a ranging exchange
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangingConfig {
    /// The bitrate of the frames exchanged.
    pub bit_rate: BitRate,
    /// The length of the preamble.
    pub preamble_length: PreambleLength,
    /// The length of the scrambled timestamp sequence.
    pub sts_len: StsLen,
}

impl Default for RangingConfig {
    fn default() -> Self {
        RangingConfig {
            bit_rate: Default::default(),
            preamble_length: Default::default(),
            sts_len: Default::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// The bitrate at which a message is transmitted
pub enum BitRate {
    /// 850 kilobits per second.
    Kbps850 = 0b01,
    /// 6.8 megabits per second.
    Kbps6800 = 0b10,
}

impl Default for BitRate {
    fn default() -> Self {
        BitRate::Kbps6800
    }
}

impl BitRate {
    /// Extra frame airtime over the 6.8 Mbps baseline, in microseconds
    ///
    /// The payload and PHY header stretch considerably at the lower rate;
    /// the response timeout has to cover it.
    pub fn rx_delay_us(&self) -> u32 {
        match self {
            BitRate::Kbps850 => 200,
            BitRate::Kbps6800 => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// An enum that specifies the length of the preamble.
///
/// Longer preambles improve the reception quality and thus range.
/// This comes at the cost of longer transmission times and thus power
/// consumption and bandwidth use.
///
/// For the bit pattern, see table 16 in the user manual. Two bits TXPSR, then
/// two bits PE.
pub enum PreambleLength {
    /// 64 symbols of preamble.
    /// Only supported at Bitrate::Kbps6800.
    Symbols64 = 0b0100,
    /// 128 symbols of preamble.
    /// Unofficial extension from decawave.
    Symbols128 = 0b0101,
    /// 256 symbols of preamble.
    /// Unofficial extension from decawave.
    Symbols256 = 0b0110,
    /// 512 symbols of preamble.
    /// Unofficial extension from decawave.
    Symbols512 = 0b0111,
    /// 1024 symbols of preamble.
    Symbols1024 = 0b1000,
    /// 1536 symbols of preamble.
    /// Unofficial extension from decawave.
    Symbols1536 = 0b1001,
    /// 2048 symbols of preamble.
    /// Unofficial extension from decawave.
    Symbols2048 = 0b1010,
    /// 4096 symbols of preamble.
    Symbols4096 = 0b1100,
}

impl Default for PreambleLength {
    fn default() -> Self {
        PreambleLength::Symbols64
    }
}

impl PreambleLength {
    /// Extra frame airtime over a 128-symbol preamble, in microseconds
    ///
    /// One preamble symbol is close to a microsecond at either PRF; lengths
    /// at or below the baseline contribute nothing.
    pub fn rx_delay_us(&self) -> u32 {
        match self {
            PreambleLength::Symbols64 => 0,
            PreambleLength::Symbols128 => 0,
            PreambleLength::Symbols256 => 128,
            PreambleLength::Symbols512 => 384,
            PreambleLength::Symbols1024 => 896,
            PreambleLength::Symbols1536 => 1408,
            PreambleLength::Symbols2048 => 1920,
            PreambleLength::Symbols4096 => 3968,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// The length of the scrambled timestamp sequence (STS) segment
///
/// The discriminant is the length code used by the timing computations:
/// the segment is `32 << code` symbols long.
pub enum StsLen {
    /// 32 symbols.
    Symbols32 = 0,
    /// 64 symbols.
    Symbols64 = 1,
    /// 128 symbols.
    Symbols128 = 2,
    /// 256 symbols.
    Symbols256 = 3,
    /// 512 symbols.
    Symbols512 = 4,
    /// 1024 symbols.
    Symbols1024 = 5,
    /// 2048 symbols.
    Symbols2048 = 6,
}

impl Default for StsLen {
    fn default() -> Self {
        StsLen::Symbols64
    }
}

impl StsLen {
    /// The length code, 0 for 32 symbols up to 6 for 2048 symbols.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Frame airtime taken by the segment, in microseconds
    ///
    /// Applied unconditionally when computing the delayed-RX date.
    pub fn frame_extension_us(&self) -> u32 {
        (1u32 << (self.code() + 2)) * 8
    }

    /// Timeout contribution of the segment, in microseconds
    ///
    /// Segments shorter than 256 symbols fit within the fixed timeout margin
    /// and contribute nothing. Longer ones add their full airtime. This is
    /// deliberately not the same rule as [`StsLen::frame_extension_us`]: the
    /// timeout is a margin, the RX date an absolute start time.
    pub fn timeout_extension_us(&self) -> u32 {
        if self.code() >= StsLen::Symbols256.code() {
            self.frame_extension_us()
        } else {
            0
        }
    }
}

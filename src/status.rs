//! RX error accounting from SYS_STATUS snapshots
//!
//! After a failed reception the interrupt handler snapshots SYS_STATUS;
//! this module turns those snapshots into named error counters for link
//! diagnostics. STS errors carry their own quality register, read on demand
//! and decomposed into per-cause counters.

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::{ll::Hardware, maybe_async_attr};

// SYS_STATUS bits, user manual 8.2.2.13.
const SYS_STATUS_RXPHE: u32 = 1 << 12;
const SYS_STATUS_RXFR: u32 = 1 << 13;
const SYS_STATUS_RXFCG: u32 = 1 << 14;
const SYS_STATUS_RXFCE: u32 = 1 << 15;
const SYS_STATUS_RXFSL: u32 = 1 << 16;
const SYS_STATUS_RXFTO: u32 = 1 << 17;
const SYS_STATUS_RXPTO: u32 = 1 << 21;
const SYS_STATUS_RXSTO: u32 = 1 << 26;
const SYS_STATUS_CPERR: u32 = 1 << 28;
const SYS_STATUS_ARFE: u32 = 1 << 29;

// STS quality register flags.
const STS_STATUS_PEAK_GROWTH: u16 = 1 << 8;
const STS_STATUS_ADC_COUNT: u16 = 1 << 7;
const STS_STATUS_SFD_COUNT: u16 = 1 << 6;
const STS_STATUS_LATE_FIRST_PATH: u16 = 1 << 5;
const STS_STATUS_LATE_COARSE: u16 = 1 << 4;
const STS_STATUS_COARSE_EMPTY: u16 = 1 << 3;
const STS_STATUS_HIGH_NOISE: u16 = 1 << 2;
const STS_STATUS_NON_TRIANGLE: u16 = 1 << 1;
const STS_STATUS_LOG_REG_FAILED: u16 = 1 << 0;

/// Accumulated receive error counters
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RxErrorStats {
    /// Frame not good and no recognizable cause bit set.
    pub bad_frame: u32,
    /// Reed-Solomon frame sync losses.
    pub sync_loss: u32,
    /// PHY header errors.
    pub phe: u32,
    /// Preamble detection timeouts.
    pub preamble_timeout: u32,
    /// Frames rejected by automatic frame filtering.
    pub filtered: u32,
    /// Frames received whole but with a bad FCS.
    pub crc_error: u32,
    /// RX timeouts of any kind, frame-wait or preamble.
    pub timeout: u32,
    /// SFD detection timeouts.
    pub sfd_timeout: u32,
    /// STS quality failures, any cause.
    pub sts_error: u32,

    /// STS peak growth out of bounds.
    pub sts_peak_growth: u32,
    /// STS ADC count out of bounds.
    pub sts_adc_count: u32,
    /// STS SFD count out of bounds.
    pub sts_sfd_count: u32,
    /// STS first path arrived late.
    pub sts_late_first_path: u32,
    /// STS coarse estimate arrived late.
    pub sts_late_coarse: u32,
    /// STS coarse estimate empty.
    pub sts_coarse_empty: u32,
    /// STS noise threshold too high.
    pub sts_high_noise: u32,
    /// STS accumulation not triangular.
    pub sts_non_triangle: u32,
    /// STS logistic regression failed.
    pub sts_log_reg_failed: u32,
}

impl RxErrorStats {
    /// Classifies one SYS_STATUS snapshot into the counters
    ///
    /// An STS error is accounted first, with its quality register read and
    /// decomposed into the per-cause counters. Otherwise, if the good-frame
    /// bit is missing, the first matching cause is counted; a preamble
    /// timeout counts as an RX timeout too, and a snapshot without any
    /// recognizable cause lands in [`RxErrorStats::bad_frame`].
    #[maybe_async_attr]
    pub async fn update<H>(&mut self, hw: &mut H, status: u32) -> Result<(), H::Error>
    where
        H: Hardware,
    {
        if status & SYS_STATUS_CPERR != 0 {
            self.sts_error += 1;
            let sts_status = hw.read_sts_status().await?;
            self.account_sts(sts_status);
        } else if status & SYS_STATUS_RXFCG == 0 {
            if status & SYS_STATUS_RXFCE != 0 && status & SYS_STATUS_RXFR != 0 {
                self.crc_error += 1;
            } else if status & SYS_STATUS_RXPHE != 0 {
                self.phe += 1;
            } else if status & SYS_STATUS_RXFSL != 0 {
                self.sync_loss += 1;
            } else if status & SYS_STATUS_RXSTO != 0 {
                self.sfd_timeout += 1;
            } else if status & SYS_STATUS_ARFE != 0 {
                self.filtered += 1;
            } else if status & SYS_STATUS_RXPTO != 0 {
                self.preamble_timeout += 1;
                self.timeout += 1;
            } else if status & SYS_STATUS_RXFTO != 0 {
                self.timeout += 1;
            } else {
                self.bad_frame += 1;
            }
        }

        Ok(())
    }

    fn account_sts(&mut self, sts_status: u16) {
        if sts_status & STS_STATUS_PEAK_GROWTH != 0 {
            self.sts_peak_growth += 1;
        }
        if sts_status & STS_STATUS_ADC_COUNT != 0 {
            self.sts_adc_count += 1;
        }
        if sts_status & STS_STATUS_SFD_COUNT != 0 {
            self.sts_sfd_count += 1;
        }
        if sts_status & STS_STATUS_LATE_FIRST_PATH != 0 {
            self.sts_late_first_path += 1;
        }
        if sts_status & STS_STATUS_LATE_COARSE != 0 {
            self.sts_late_coarse += 1;
        }
        if sts_status & STS_STATUS_COARSE_EMPTY != 0 {
            self.sts_coarse_empty += 1;
        }
        if sts_status & STS_STATUS_HIGH_NOISE != 0 {
            self.sts_high_noise += 1;
        }
        if sts_status & STS_STATUS_NON_TRIANGLE != 0 {
            self.sts_non_triangle += 1;
        }
        if sts_status & STS_STATUS_LOG_REG_FAILED != 0 {
            self.sts_log_reg_failed += 1;
        }
    }
}

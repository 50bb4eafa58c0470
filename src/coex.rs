//! WiFi coexistence GPIO scheduling
//!
//! A colocated WiFi radio is muted through a GPIO while the UWB side is on
//! the air. Muting early wastes WiFi airtime, muting late loses the start of
//! the UWB frame, so the GPIO is asserted a fixed guard interval before the
//! TX/RX event: the first arming of an exchange turns an immediate TRX into a
//! delayed one far enough out to fit the guard, and later armings wait until
//! the guard window opens. The wait is a deliberate blocking delay, bounded
//! by construction to the guard window.

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::{delay_type::delay::DelayNs, ll::Hardware, maybe_async_attr, time};

/// WiFi coexistence configuration, fixed at device initialization
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoexConfig {
    /// Index of the chip GPIO wired to the WiFi radio. `None` disables
    /// coexistence handling entirely.
    pub gpio: Option<u8>,
    /// Level of the GPIO while the WiFi radio must stay quiet.
    pub active_high: bool,
    /// Guard interval between asserting the GPIO and the TRX event, in
    /// microseconds.
    pub time_us: u32,
    /// Scheduling slack on top of the guard interval, in microseconds.
    pub margin_us: u32,
}

impl Default for CoexConfig {
    fn default() -> Self {
        CoexConfig {
            gpio: None,
            active_high: true,
            time_us: 1000,
            margin_us: 20,
        }
    }
}

/// Transient schedule of one TX/RX arming
///
/// Threaded through the at most two [`CoexConfig::start`] calls of a ranging
/// exchange; starts over as `Default` for the next exchange.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrxSchedule {
    /// Whether the TRX event has been pushed out to `date_dtu` already.
    pub delayed: bool,
    /// Date of the TRX event on the 32-bit device-time clock.
    pub date_dtu: u32,
}

impl CoexConfig {
    /// Mutes the WiFi radio ahead of a TX/RX event
    ///
    /// On the first call of an exchange (`trx.delayed == false`) the GPIO is
    /// asserted immediately and `trx` is rescheduled to a date far enough out
    /// to honor the guard interval; the caller must arm its TRX delayed at
    /// `trx.date_dtu`. On a later call the GPIO is asserted once the
    /// remaining time to `trx.date_dtu` falls inside the guard window,
    /// blocking on `delay` as needed.
    ///
    /// Does nothing when no coexistence GPIO is configured. A time-read or
    /// GPIO failure propagates and the caller is expected to abort arming and
    /// call [`CoexConfig::stop`].
    #[maybe_async_attr]
    pub async fn start<H, D>(
        &self,
        hw: &mut H,
        delay: &mut D,
        trx: &mut TrxSchedule,
    ) -> Result<(), H::Error>
    where
        H: Hardware,
        D: DelayNs,
    {
        if self.gpio.is_none() {
            return Ok(());
        }

        let now_dtu = hw.sys_time().await?;
        let wait_us = self.wakeup_delay_us(now_dtu, trx);
        if wait_us > 0 {
            delay.delay_us(wait_us).await;
        }

        self.drive_gpio(hw, true).await
    }

    /// Unmutes the WiFi radio after the exchange, or as cleanup when arming
    /// failed
    ///
    /// Does nothing when no coexistence GPIO is configured.
    #[maybe_async_attr]
    pub async fn stop<H>(&self, hw: &mut H) -> Result<(), H::Error>
    where
        H: Hardware,
    {
        if self.gpio.is_none() {
            return Ok(());
        }

        self.drive_gpio(hw, false).await
    }

    /// Decides how long to block before asserting the GPIO, updating the
    /// schedule on the first call of an exchange.
    fn wakeup_delay_us(&self, now_dtu: u32, trx: &mut TrxSchedule) -> u32 {
        let window_us = self.time_us + self.margin_us;

        if !trx.delayed {
            trx.delayed = true;
            trx.date_dtu = now_dtu.wrapping_add(time::dtu_from_us(window_us));
            return 0;
        }

        let remaining_dtu = (trx.date_dtu as i64 - now_dtu as i64) as i32;
        let remaining_us = time::us_from_dtu(remaining_dtu);
        if remaining_us <= window_us as i32 {
            0
        } else {
            remaining_us as u32 - window_us
        }
    }

    #[maybe_async_attr]
    async fn drive_gpio<H>(&self, hw: &mut H, assert: bool) -> Result<(), H::Error>
    where
        H: Hardware,
    {
        let Some(gpio) = self.gpio else {
            return Ok(());
        };

        let mask = 1u16 << gpio;
        let current = hw.gpio_out().await?;
        let value = if assert == self.active_high {
            current | mask
        } else {
            current & !mask
        };

        hw.modify_gpio_out(mask, value).await
    }
}

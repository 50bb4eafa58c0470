//! Ranging support library for DW3000-class UWB transceivers
//!
//! This crate carries the driver-side math that a two-way-ranging exchange
//! needs around the raw transport: fixed-point signal power estimation from
//! CIA diagnostics, delayed-RX and timeout computation, 40-bit timestamp
//! handling, and scheduling of a WiFi coexistence GPIO.
//!
//! The transport itself (SPI, pin wiring, register maps) stays in the driver
//! that owns the chip; it hands this crate a narrow [`Hardware`] capability
//! interface. This crate is built on top of [`embedded-hal`], which means it
//! is portable and can be used on any platform that implements the
//! `embedded-hal` API.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "async")]
pub(crate) use maybe_async::must_be_async as maybe_async_attr;
#[cfg(not(feature = "async"))]
pub(crate) use maybe_async::must_be_sync as maybe_async_attr;

#[cfg(not(feature = "async"))]
pub(crate) use embedded_hal as delay_type;
#[cfg(feature = "async")]
pub(crate) use embedded_hal_async as delay_type;

pub mod coex;
pub mod configs;
pub mod ll;
pub mod lut;
pub mod ranging;
pub mod rssi;
pub mod status;
pub mod time;
pub mod txpower;

pub use crate::{
    coex::{CoexConfig, TrxSchedule},
    configs::{BitRate, PreambleLength, RangingConfig, StsLen},
    ll::Hardware,
    status::RxErrorStats,
};

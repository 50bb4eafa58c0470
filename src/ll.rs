//! Low-level hardware interface consumed by this crate
//!
//! The driver that owns the SPI transport and the register map implements
//! [`Hardware`]; everything in this crate reaches the chip only through it.
//! Each method is one capability: a device-time snapshot, the coexistence
//! GPIO register, the delayed-TRX and RX-timeout registers, the raw 5-byte
//! timestamp fields and the STS quality register. Transport failures
//! propagate unchanged through [`Hardware::Error`].
//!
//! With the `async` feature (the default) the trait methods are `async fn`;
//! without it the same trait is declared with blocking methods.

/// Hardware capabilities supplied by the transport-owning driver
#[cfg(feature = "async")]
#[allow(async_fn_in_trait)]
pub trait Hardware {
    /// Error type of the underlying transport.
    type Error;

    /// Reads the current device time, in device time units
    ///
    /// The counter wraps; consumers difference two snapshots through a signed
    /// 64-bit subtraction, see [`time::us_from_dtu`].
    ///
    /// [`time::us_from_dtu`]: crate::time::us_from_dtu
    async fn sys_time(&mut self) -> Result<u32, Self::Error>;

    /// Reads the GPIO output register.
    async fn gpio_out(&mut self) -> Result<u16, Self::Error>;

    /// Writes back the GPIO output register, touching only the masked bits.
    async fn modify_gpio_out(&mut self, mask: u16, value: u16) -> Result<(), Self::Error>;

    /// Programs the delayed TX/RX date, in device time units.
    async fn set_dx_time(&mut self, time_dtu: u32) -> Result<(), Self::Error>;

    /// Programs the RX frame-wait timeout, in microseconds.
    async fn set_rx_timeout(&mut self, timeout_us: u32) -> Result<(), Self::Error>;

    /// Reads the raw TX timestamp field, least-significant byte first.
    async fn read_tx_timestamp(&mut self, buffer: &mut [u8; 5]) -> Result<(), Self::Error>;

    /// Reads the raw RX timestamp field (the Ipatov one), least-significant
    /// byte first.
    async fn read_rx_timestamp(&mut self, buffer: &mut [u8; 5]) -> Result<(), Self::Error>;

    /// Reads the STS quality register.
    async fn read_sts_status(&mut self) -> Result<u16, Self::Error>;
}

/// Blocking form of the capability interface, selected when the `async`
/// feature is disabled. See the async declaration for the method docs.
#[cfg(not(feature = "async"))]
pub trait Hardware {
    /// Error type of the underlying transport.
    type Error;

    /// Reads the current device time, in device time units.
    fn sys_time(&mut self) -> Result<u32, Self::Error>;

    /// Reads the GPIO output register.
    fn gpio_out(&mut self) -> Result<u16, Self::Error>;

    /// Writes back the GPIO output register, touching only the masked bits.
    fn modify_gpio_out(&mut self, mask: u16, value: u16) -> Result<(), Self::Error>;

    /// Programs the delayed TX/RX date, in device time units.
    fn set_dx_time(&mut self, time_dtu: u32) -> Result<(), Self::Error>;

    /// Programs the RX frame-wait timeout, in microseconds.
    fn set_rx_timeout(&mut self, timeout_us: u32) -> Result<(), Self::Error>;

    /// Reads the raw TX timestamp field, least-significant byte first.
    fn read_tx_timestamp(&mut self, buffer: &mut [u8; 5]) -> Result<(), Self::Error>;

    /// Reads the raw RX timestamp field (the Ipatov one), least-significant
    /// byte first.
    fn read_rx_timestamp(&mut self, buffer: &mut [u8; 5]) -> Result<(), Self::Error>;

    /// Reads the STS quality register.
    fn read_sts_status(&mut self) -> Result<u16, Self::Error>;
}

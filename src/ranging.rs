//! Delayed-RX scheduling and response timeout computation
//!
//! A two-way-ranging exchange arms its receiver some agreed time after the
//! previous frame. The agreed delay is measured between frame markers, while
//! the hardware wants an RX start date and a frame-wait timeout; the
//! conversions depend on the preamble length, data rate and STS segment
//! length of the frames, see [`RangingConfig`].

use crate::{
    configs::RangingConfig,
    ll::Hardware,
    maybe_async_attr,
    time::{self, Instant},
};

/// Fixed slack added to every response timeout, in microseconds.
const RX_TIMEOUT_MARGIN_US: u32 = 500;

/// Programs the delayed-RX start date
///
/// `base_delay_us` is the agreed delay from the previous frame marker to the
/// expected response. The receiver has to open earlier by whatever the
/// responder's preamble adds over the baseline, and later by the frame
/// extension of the STS segment. The resulting date is converted to device
/// time units and issued to the hardware; the programmed value is returned.
#[maybe_async_attr]
pub async fn set_delayed_rx_time<H>(
    hw: &mut H,
    base_delay_us: u32,
    config: &RangingConfig,
) -> Result<u32, H::Error>
where
    H: Hardware,
{
    let rx_date_us = base_delay_us
        .saturating_sub(config.preamble_length.rx_delay_us())
        + config.sts_len.frame_extension_us();
    let rx_date_dtu = time::dtu_from_us(rx_date_us);

    hw.set_dx_time(rx_date_dtu).await?;

    Ok(rx_date_dtu)
}

/// Programs the frame-wait timeout for an expected response
///
/// The timeout covers the agreed delay plus everything that can stretch the
/// response frame: the data-rate and preamble contributions, a fixed margin,
/// and the timeout extension of long STS segments. The programmed value, in
/// microseconds, is returned.
#[maybe_async_attr]
pub async fn set_resp_rx_timeout<H>(
    hw: &mut H,
    base_delay_us: u32,
    config: &RangingConfig,
) -> Result<u32, H::Error>
where
    H: Hardware,
{
    let timeout_us = base_delay_us
        + config.bit_rate.rx_delay_us()
        + config.preamble_length.rx_delay_us()
        + RX_TIMEOUT_MARGIN_US
        + config.sts_len.timeout_extension_us();

    hw.set_rx_timeout(timeout_us).await?;

    Ok(timeout_us)
}

/// Reads the timestamp of the last transmitted frame.
#[maybe_async_attr]
pub async fn tx_timestamp<H>(hw: &mut H) -> Result<Instant, H::Error>
where
    H: Hardware,
{
    let mut buffer = [0; 5];
    hw.read_tx_timestamp(&mut buffer).await?;

    Ok(Instant::from_le_bytes(buffer))
}

/// Reads the timestamp of the last received frame.
#[maybe_async_attr]
pub async fn rx_timestamp<H>(hw: &mut H) -> Result<Instant, H::Error>
where
    H: Hardware,
{
    let mut buffer = [0; 5];
    hw.read_rx_timestamp(&mut buffer).await?;

    Ok(Instant::from_le_bytes(buffer))
}

#[cfg(all(test, feature = "async"))]
mod tests {
    use super::*;
    use crate::configs::{BitRate, PreambleLength, StsLen};
    use crate::ll::mock::MockHardware;

    fn config() -> RangingConfig {
        RangingConfig {
            bit_rate: BitRate::Kbps850,
            preamble_length: PreambleLength::Symbols256,
            sts_len: StsLen::Symbols256,
        }
    }

    #[tokio::test]
    async fn delayed_rx_time_combines_preamble_and_sts() {
        let mut hw = MockHardware::default();

        // 1000 - 128 + 256 = 1128 us.
        let programmed = set_delayed_rx_time(&mut hw, 1000, &config()).await.unwrap();

        assert_eq!(programmed, time::dtu_from_us(1128));
        assert_eq!(hw.dx_time, Some(programmed));
    }

    #[tokio::test]
    async fn delayed_rx_time_does_not_underflow() {
        let mut hw = MockHardware::default();
        let config = RangingConfig {
            preamble_length: PreambleLength::Symbols4096,
            sts_len: StsLen::Symbols32,
            ..config()
        };

        // The preamble offset exceeds the base delay; only the STS extension
        // remains.
        let programmed = set_delayed_rx_time(&mut hw, 1000, &config).await.unwrap();

        assert_eq!(programmed, time::dtu_from_us(32));
    }

    #[tokio::test]
    async fn resp_timeout_sums_all_contributions() {
        let mut hw = MockHardware::default();

        // 1000 + 200 + 128 + 500 + 256 = 2084 us.
        let timeout = set_resp_rx_timeout(&mut hw, 1000, &config()).await.unwrap();

        assert_eq!(timeout, 2084);
        assert_eq!(hw.rx_timeout, Some(2084));
    }

    #[tokio::test]
    async fn short_sts_extends_the_rx_date_but_not_the_timeout() {
        let mut hw = MockHardware::default();
        let config = RangingConfig {
            sts_len: StsLen::Symbols64,
            ..config()
        };

        let programmed = set_delayed_rx_time(&mut hw, 1000, &config).await.unwrap();
        let timeout = set_resp_rx_timeout(&mut hw, 1000, &config).await.unwrap();

        // 1000 - 128 + 64 = 936 us; the 64-symbol segment still shifts the
        // RX date.
        assert_eq!(programmed, time::dtu_from_us(936));
        // 1000 + 200 + 128 + 500 + 0 = 1828 us; it adds nothing here.
        assert_eq!(timeout, 1828);
    }

    #[tokio::test]
    async fn timestamps_widen_from_their_5_byte_fields() {
        let mut hw = MockHardware {
            tx_stamp: [0x11, 0x22, 0x33, 0x44, 0x55],
            rx_stamp: [0xff, 0xff, 0xff, 0xff, 0xff],
            ..Default::default()
        };

        assert_eq!(tx_timestamp(&mut hw).await.unwrap().value(), 0x5544332211);
        assert_eq!(
            rx_timestamp(&mut hw).await.unwrap().value(),
            crate::time::TIME_MAX
        );
    }
}

//! Path-blocked detection for the Sipeed MaixSense A010 ToF camera over UART.
//!
//! The sensor streams image packets continuously. Each poll reads one chunk of
//! bytes, decodes at most one packet from it, classifies the packet as blocked or
//! open and hands the result to an [`Actuator`].

#![cfg_attr(not(test), no_std)]

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use log::debug;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod actuator;
pub use actuator::*;

pub mod frame;
pub use frame::{decode, Decoded, Frame, Skip};

pub mod signal;
pub use signal::{classify, mean_intensity, process, Signal};

/// Represents a MaixSense A010 sensor attached to a serial link.
///
/// # Type Parameters
///
/// * `Serial`: The serial interface connected to the sensor. It must implement
///   `embedded_io_async::Read` and `embedded_io_async::Write`. Read timeouts are the
///   transport's concern: keep them long while calling [`MaixSense::init`] and near
///   zero while polling.
/// * `Delay`: Paces the polling loop.
/// * `Act`: Receives the classified signals.
pub struct MaixSense<Serial, Delay, Act> {
    serial: Serial,
    delay: Delay,
    actuator: Act,
    config: Config,
    buffer: [u8; READ_SIZE],
}

impl<S, D, A> MaixSense<S, D, A>
where
    S: Read + Write,
    D: DelayNs,
    A: Actuator,
{
    /// Creates a new `MaixSense` instance.
    ///
    /// `config.read_size` is capped at [`READ_SIZE`].
    pub fn new(serial: S, delay: D, actuator: A, config: Config) -> Self {
        Self {
            serial,
            delay,
            actuator,
            config,
            buffer: [0u8; READ_SIZE],
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives back the serial link, delay and actuator.
    pub fn release(self) -> (S, D, A) {
        (self.serial, self.delay, self.actuator)
    }

    /// Sends the AT setup commands.
    ///
    /// This involves:
    /// - Setting the resolution binning (`AT+BINN`).
    /// - Setting the display routing (`AT+DISP`).
    ///
    /// Each acknowledgement is read once and logged, but not checked.
    pub async fn init(&mut self) -> Result<(), Error> {
        if !self.config.setup {
            debug!("Setup disabled, assuming the sensor is already configured.");
            return Ok(());
        }

        if !self.config.display.includes_uart() {
            log::warn!(
                "Display mode {:?} does not route frames to the UART",
                self.config.display
            );
        }

        self.send_command(b"AT+BINN=", self.config.binning.value())
            .await
            .map_err(|e| {
                log::error!(
                    "Failed to set binning to {:?} during init: {:?}",
                    self.config.binning,
                    e
                );
                e
            })?;

        self.send_command(b"AT+DISP=", self.config.display.value())
            .await
            .map_err(|e| {
                log::error!(
                    "Failed to set display mode to {:?} during init: {:?}",
                    self.config.display,
                    e
                );
                e
            })?;

        debug!("MaixSense init sequence complete.");
        Ok(())
    }

    /// Runs one iteration of the polling loop.
    ///
    /// Reads a chunk, decodes and classifies it, forwards any signal to the
    /// actuator and then waits `poll_interval_ms`. The signal is also returned.
    /// Read errors are logged and treated like an empty read.
    pub async fn poll_once(&mut self) -> Option<Signal> {
        let read_size = self.config.read_size.min(READ_SIZE);
        let signal = match self.serial.read(&mut self.buffer[..read_size]).await {
            Ok(bytes_read) => process(&self.buffer[..bytes_read], &self.config),
            Err(e) => {
                log::warn!("Serial read error while polling: {:?}", e);
                None
            }
        };

        if let Some(signal) = signal {
            debug!("Signal: {:?}", signal);
            self.actuator.on_signal(signal).await;
        }

        self.delay.delay_ms(self.config.poll_interval_ms).await;
        signal
    }

    /// Polls forever.
    pub async fn run(&mut self) {
        loop {
            self.poll_once().await;
        }
    }

    // Writes `prefix`, a single digit and a carriage return, then reads the
    // acknowledgement once.
    async fn send_command(&mut self, prefix: &[u8], value: u8) -> Result<(), Error> {
        let tail = [b'0' + value, b'\r'];
        debug!(
            "Executing command: {}{}",
            core::str::from_utf8(prefix).unwrap_or("?"),
            value
        );

        self.serial
            .write_all(prefix)
            .await
            .map_err(|_| Error::WriteFailure)?;
        self.serial
            .write_all(&tail)
            .await
            .map_err(|_| Error::WriteFailure)?;
        self.serial.flush().await.map_err(|_| Error::WriteFailure)?;

        let mut ack = [0u8; ACK_READ_SIZE];
        let bytes_read = self.serial.read(&mut ack).await.map_err(|e| {
            log::debug!("Serial read error waiting for acknowledgement: {:?}", e);
            Error::ReadFailure
        })?;
        match core::str::from_utf8(&ack[..bytes_read]) {
            Ok(text) => debug!("Acknowledgement: {:?}", text),
            Err(_) => debug!("Acknowledgement: {:02X?}", &ack[..bytes_read]),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_io_async::{ErrorKind, ErrorType};
    use std::collections::VecDeque;

    struct MockSerial {
        reads: VecDeque<Result<Vec<u8>, ErrorKind>>,
        written: Vec<u8>,
        fail_writes: bool,
        requested: Vec<usize>,
    }

    impl MockSerial {
        fn new(reads: Vec<Result<Vec<u8>, ErrorKind>>) -> Self {
            Self {
                reads: reads.into(),
                written: Vec::new(),
                fail_writes: false,
                requested: Vec::new(),
            }
        }
    }

    impl ErrorType for MockSerial {
        type Error = ErrorKind;
    }

    impl Read for MockSerial {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            self.requested.push(buf.len());
            match self.reads.pop_front() {
                Some(Ok(data)) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    Ok(n)
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    impl Write for MockSerial {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if self.fail_writes {
                return Err(ErrorKind::BrokenPipe);
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        async fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    #[derive(Default)]
    struct MockActuator {
        signals: Vec<Signal>,
    }

    impl Actuator for MockActuator {
        async fn on_signal(&mut self, signal: Signal) {
            self.signals.push(signal);
        }
    }

    fn packet(length: u16, payload: &[u8]) -> Vec<u8> {
        let mut chunk = vec![0x00, 0xFF];
        chunk.extend_from_slice(&length.to_le_bytes());
        chunk.extend_from_slice(&[0u8; 16]);
        chunk.extend_from_slice(payload);
        chunk
    }

    fn sensor(
        reads: Vec<Result<Vec<u8>, ErrorKind>>,
        config: Config,
    ) -> MaixSense<MockSerial, MockDelay, MockActuator> {
        MaixSense::new(
            MockSerial::new(reads),
            MockDelay::default(),
            MockActuator::default(),
            config,
        )
    }

    #[test]
    fn init_sends_setup_commands() {
        let mut sensor = sensor(
            vec![Ok(b"OK\r\n".to_vec()), Ok(b"OK\r\n".to_vec())],
            Config::default(),
        );
        block_on(sensor.init()).unwrap();
        let (serial, _, _) = sensor.release();
        assert_eq!(serial.written, b"AT+BINN=4\rAT+DISP=5\r");
        assert_eq!(serial.requested, vec![ACK_READ_SIZE, ACK_READ_SIZE]);
    }

    #[test]
    fn init_ignores_acknowledgement_content() {
        let config = Config::new(Binning::Half, DisplayMode::Uart);
        let mut sensor = sensor(vec![Ok(vec![0xFF, 0x00]), Ok(vec![])], config);
        block_on(sensor.init()).unwrap();
        let (serial, _, _) = sensor.release();
        assert_eq!(serial.written, b"AT+BINN=2\rAT+DISP=4\r");
    }

    #[test]
    fn init_skipped_when_setup_disabled() {
        let mut sensor = sensor(vec![], Config::default().setup(false));
        block_on(sensor.init()).unwrap();
        let (serial, _, _) = sensor.release();
        assert!(serial.written.is_empty());
        assert!(serial.requested.is_empty());
    }

    #[test]
    fn init_reports_write_failure() {
        let mut sensor = sensor(vec![], Config::default());
        sensor.serial.fail_writes = true;
        assert_eq!(block_on(sensor.init()), Err(Error::WriteFailure));
    }

    #[test]
    fn init_reports_read_failure() {
        let mut sensor = sensor(vec![Err(ErrorKind::TimedOut)], Config::default());
        assert_eq!(block_on(sensor.init()), Err(Error::ReadFailure));
    }

    #[test]
    fn poll_actuates_once_per_classified_read() {
        let mut headerless = vec![0x12u8; 40];
        headerless[10] = 0xFF;
        let reads = vec![
            Ok(packet(5, &[200; 5])),
            Ok(vec![0x00, 0xFF, 0x00, 0x00]),
            Ok(vec![]),
            Ok(headerless),
            Ok(packet(10, &[10, 10])),
            Ok(packet(4, &[])),
            Err(ErrorKind::Other),
        ];
        let mut sensor = sensor(reads, Config::default());

        let results: Vec<_> = (0..7).map(|_| block_on(sensor.poll_once())).collect();
        assert_eq!(
            results,
            vec![
                Some(Signal::Open),
                Some(Signal::BlockedNoData),
                None,
                None,
                Some(Signal::BlockedLowIntensity),
                None,
                None,
            ]
        );

        let (_, delay, actuator) = sensor.release();
        assert_eq!(
            actuator.signals,
            vec![
                Signal::Open,
                Signal::BlockedNoData,
                Signal::BlockedLowIntensity
            ]
        );
        // Paced after every iteration, whatever the outcome.
        assert_eq!(delay.total_ns, 7 * 200_000_000);
    }

    #[test]
    fn read_size_is_capped_to_buffer() {
        let config = Config::default().read_size(4096);
        let mut sensor = sensor(vec![], config);
        assert_eq!(block_on(sensor.poll_once()), None);
        let config = Config::default().read_size(64);
        let mut small = self::sensor(vec![], config);
        assert_eq!(block_on(small.poll_once()), None);
        assert_eq!(sensor.serial.requested, vec![READ_SIZE]);
        assert_eq!(small.serial.requested, vec![64]);
    }

    #[test]
    fn bytes_beyond_read_size_are_not_seen() {
        // The payload is bright, but only the first two payload bytes fit the read.
        let mut data = packet(6, &[10, 10]);
        data.extend_from_slice(&[255; 4]);
        let config = Config::default().read_size(data.len() - 4);
        let mut sensor = sensor(vec![Ok(data)], config);
        assert_eq!(
            block_on(sensor.poll_once()),
            Some(Signal::BlockedLowIntensity)
        );
    }
}

use crate::constants::{AVG_WARNING_THRESHOLD, POLL_INTERVAL_MS, READ_SIZE};

/// Resolution downscaling applied by the sensor (`AT+BINN`).
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Binning {
    /// Native 100x100 image.
    Full,
    /// 2x2 binning, 50x50 image.
    Half,
    /// 4x4 binning, 25x25 image.
    Quarter,
}

impl Binning {
    /// Value sent with `AT+BINN=`.
    pub fn value(self) -> u8 {
        match self {
            Binning::Full => 1,
            Binning::Half => 2,
            Binning::Quarter => 4,
        }
    }
}

/// Where the sensor routes its image frames (`AT+DISP`).
///
/// The device takes a bitmask: LCD=1, USB=2, UART=4.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum DisplayMode {
    Lcd,
    Usb,
    Uart,
    LcdAndUart,
    UsbAndUart,
    All,
}

impl DisplayMode {
    /// Value sent with `AT+DISP=`.
    pub fn value(self) -> u8 {
        match self {
            DisplayMode::Lcd => 1,
            DisplayMode::Usb => 2,
            DisplayMode::Uart => 4,
            DisplayMode::LcdAndUart => 5,
            DisplayMode::UsbAndUart => 6,
            DisplayMode::All => 7,
        }
    }

    /// Whether frames are sent over the UART at all.
    pub fn includes_uart(self) -> bool {
        self.value() & 0x04 != 0
    }
}

/// Configuration settings for the MaixSense A010 reader.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// Number of bytes requested from the serial link per poll.
    pub read_size: usize,
    /// Mean payload intensity below which the path is reported as blocked.
    pub avg_warning_threshold: u8,
    /// Delay between two polls, in milliseconds.
    pub poll_interval_ms: u32,
    /// Resolution downscaling requested during setup.
    pub binning: Binning,
    /// Frame routing requested during setup.
    pub display: DisplayMode,
    /// Whether `init` sends the AT setup commands.
    pub setup: bool,
}

impl Config {
    /// Creates a new `Config` with the given setup parameters and default tuning.
    pub fn new(binning: Binning, display: DisplayMode) -> Config {
        Config {
            binning,
            display,
            ..Config::default()
        }
    }

    /// Sets the number of bytes requested per poll.
    pub fn read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size;
        self
    }

    /// Sets the mean intensity threshold.
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.avg_warning_threshold = threshold;
        self
    }

    /// Sets the delay between two polls.
    pub fn poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Sets the binning sent during setup.
    pub fn binning(mut self, binning: Binning) -> Self {
        self.binning = binning;
        self
    }

    /// Sets the display routing sent during setup.
    pub fn display(mut self, display: DisplayMode) -> Self {
        self.display = display;
        self
    }

    /// Enables or disables the AT setup handshake.
    pub fn setup(mut self, setup: bool) -> Self {
        self.setup = setup;
        self
    }
}

/// Provides default configuration values for the MaixSense A010.
impl Default for Config {
    /// Returns the default configuration.
    ///
    /// 1024-byte reads, threshold 152, 200 ms pacing, 25x25 binning with both
    /// LCD and UART output, and setup enabled.
    fn default() -> Config {
        Config {
            read_size: READ_SIZE,
            avg_warning_threshold: AVG_WARNING_THRESHOLD,
            poll_interval_ms: POLL_INTERVAL_MS,
            binning: Binning::Quarter,
            display: DisplayMode::LcdAndUart,
            setup: true,
        }
    }
}

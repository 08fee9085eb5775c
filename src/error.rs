use core::fmt;

/// Transport failures surfaced while configuring the sensor.
///
/// Decoding never fails: every malformed chunk degrades to a skipped poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Writing or flushing an AT command failed.
    WriteFailure,
    /// Reading the acknowledgement of an AT command failed.
    ReadFailure,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WriteFailure => f.write_str("failed to write to the serial link"),
            Error::ReadFailure => f.write_str("failed to read from the serial link"),
        }
    }
}

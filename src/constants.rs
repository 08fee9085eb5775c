// HEADER is the 2-byte marker that opens every image packet sent by the sensor.
pub const HEADER: [u8; 2] = [0x00, 0xFF];

// TERMINATOR is the byte the vendor documents after the payload. The sensor does not
// always send it, so it is only ever checked, never required.
pub const TERMINATOR: u8 = 0xDD;

// LENGTH_SIZE is the width of the little-endian packet length that follows the header.
pub const LENGTH_SIZE: usize = 2;

// METADATA_SIZE is the opaque block (serial number, resolution, ...) after the length.
pub const METADATA_SIZE: usize = 16;

// METADATA_SKIP is how far the cursor moves once the packet length has been read: the
// length field itself plus the metadata block.
pub const METADATA_SKIP: usize = LENGTH_SIZE + METADATA_SIZE;

// READ_SIZE is the default number of bytes requested per poll. At 15 FPS and 25x25
// binning this spans slightly more than one frame but less than two.
pub const READ_SIZE: usize = 1024;

// ACK_READ_SIZE bounds the single acknowledgement read after each AT command.
pub const ACK_READ_SIZE: usize = 32;

// AVG_WARNING_THRESHOLD is the mean payload intensity below which the path is
// considered blocked.
pub const AVG_WARNING_THRESHOLD: u8 = 152;

// POLL_INTERVAL_MS is the fixed delay between two polls.
pub const POLL_INTERVAL_MS: u32 = 200;

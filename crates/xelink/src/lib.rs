//! CRC-8 framed messaging over serial links.
//!
//! xelink carries small typed messages over byte streams that drop, corrupt
//! or inject bytes. Each frame is `0xAB 0xCD | type | len | payload | crc8`.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte source/sink contracts and the Unix serial port
//! - [`frame`]: checksum, encoder, resynchronizing parser, message types
//! - [`dispatch`]: type-tag registry routing frames to handlers

/// Re-export transport types.
pub mod transport {
    pub use xelink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use xelink_frame::*;
}

/// Re-export dispatch types.
pub mod dispatch {
    pub use xelink_dispatch::*;
}

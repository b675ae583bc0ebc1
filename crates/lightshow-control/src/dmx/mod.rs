//! DMX input over Art-Net
//!
//! Only the OpDmx frame is understood; every other Art-Net opcode is
//! rejected by [`ArtDmx::parse`].
//!
//! ```rust
//! use lightshow_control::dmx::ArtDmx;
//!
//! let datagram = ArtDmx::new(1, &[255, 0, 0]).to_bytes();
//! let frame = ArtDmx::parse(&datagram).unwrap();
//! assert_eq!(frame.universe, 1);
//! assert_eq!(frame.data, vec![255, 0, 0]);
//! ```

pub mod artnet;

pub use artnet::{ArtDmx, ARTNET_ID, HEADER_LEN, OP_DMX};

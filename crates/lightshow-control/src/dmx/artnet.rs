//! Art-Net protocol implementation (Art-Net 4, OpDmx only)
//!
//! Art-Net is a UDP-based protocol for transmitting DMX512 over Ethernet.
//!
//! ```text
//! 0..8    "Art-Net\0"
//! 8..10   opcode, little-endian (0x5000 = OpDmx)
//! 10..12  protocol version, big-endian
//! 12      sequence
//! 13      physical port
//! 14..16  universe (port-address), low byte then high byte
//! 16..18  data length, big-endian (0-512)
//! 18..    data
//! ```

use crate::error::ProtocolError;
use lightshow_core::{CHANNELS_PER_UNIVERSE, MAX_UNIVERSE};

/// Protocol identifier at the start of every Art-Net packet
pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

/// OpDmx opcode
pub const OP_DMX: u16 = 0x5000;

/// Protocol version written into outgoing frames
pub const PROTOCOL_VERSION: u16 = 14;

/// Size of the OpDmx header in bytes
pub const HEADER_LEN: usize = 18;

/// A decoded OpDmx frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtDmx {
    /// Protocol version
    pub version: u16,
    /// Sequence number (0 = disabled)
    pub sequence: u8,
    /// Physical input port
    pub physical: u8,
    /// Universe (port-address)
    pub universe: u16,
    /// Channel data, 0-512 bytes
    pub data: Vec<u8>,
}

impl ArtDmx {
    /// Create a frame for a universe
    pub fn new(universe: u16, data: &[u8]) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            sequence: 0,
            physical: 0,
            universe,
            data: data.to_vec(),
        }
    }

    /// Validate and decode a datagram.
    ///
    /// The datagram must hold exactly the header plus `length` data bytes.
    pub fn parse(datagram: &[u8]) -> Result<Self, ProtocolError> {
        if datagram.len() < HEADER_LEN {
            return Err(ProtocolError::TooShort(datagram.len()));
        }

        if &datagram[0..8] != ARTNET_ID {
            return Err(ProtocolError::BadIdentifier);
        }

        let opcode = u16::from_le_bytes([datagram[8], datagram[9]]);
        if opcode != OP_DMX {
            return Err(ProtocolError::UnsupportedOpcode(opcode));
        }

        let version = u16::from_be_bytes([datagram[10], datagram[11]]);
        let sequence = datagram[12];
        let physical = datagram[13];

        let universe = u16::from_le_bytes([datagram[14], datagram[15]]);
        if universe > MAX_UNIVERSE {
            return Err(ProtocolError::UniverseOutOfRange(universe));
        }

        let length = u16::from_be_bytes([datagram[16], datagram[17]]) as usize;
        if length > CHANNELS_PER_UNIVERSE {
            return Err(ProtocolError::LengthTooLarge(length));
        }

        let payload = &datagram[HEADER_LEN..];
        if payload.len() != length {
            return Err(ProtocolError::LengthMismatch {
                declared: length,
                actual: payload.len(),
            });
        }

        Ok(Self {
            version,
            sequence,
            physical,
            universe,
            data: payload.to_vec(),
        })
    }

    /// Encode the frame into an OpDmx datagram
    pub fn to_bytes(&self) -> Vec<u8> {
        let length = self.data.len().min(CHANNELS_PER_UNIVERSE);
        let mut packet = vec![0u8; HEADER_LEN + length];

        // Header: "Art-Net\0"
        packet[0..8].copy_from_slice(ARTNET_ID);

        // OpCode: OpDmx (0x5000)
        packet[8..10].copy_from_slice(&OP_DMX.to_le_bytes());

        // Protocol version
        packet[10..12].copy_from_slice(&self.version.to_be_bytes());

        packet[12] = self.sequence;
        packet[13] = self.physical;

        // Universe (Port-Address)
        packet[14..16].copy_from_slice(&self.universe.to_le_bytes());

        // Length (big-endian)
        packet[16..18].copy_from_slice(&(length as u16).to_be_bytes());

        // DMX data
        packet[HEADER_LEN..].copy_from_slice(&self.data[..length]);

        packet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artnet_packet_structure() {
        let packet = ArtDmx::new(0, &[0u8; 512]).to_bytes();

        // Check header
        assert_eq!(&packet[0..8], b"Art-Net\0");

        // Check OpCode (little-endian)
        assert_eq!(packet[8], 0x00);
        assert_eq!(packet[9], 0x50);

        // Check protocol version (big-endian)
        assert_eq!(packet[10], 0);
        assert_eq!(packet[11], 14);

        // Check length (big-endian)
        assert_eq!(packet[16], 0x02);
        assert_eq!(packet[17], 0x00);

        // Total packet size
        assert_eq!(packet.len(), 18 + 512);
    }

    #[test]
    fn test_universe_low_byte_first() {
        let packet = ArtDmx::new(0x0102, &[1, 2, 3]).to_bytes();
        assert_eq!(packet[14], 0x02);
        assert_eq!(packet[15], 0x01);

        let frame = ArtDmx::parse(&packet).unwrap();
        assert_eq!(frame.universe, 0x0102);
        assert_eq!(frame.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_empty_frame() {
        let frame = ArtDmx::parse(&ArtDmx::new(5, &[]).to_bytes()).unwrap();
        assert_eq!(frame.universe, 5);
        assert!(frame.data.is_empty());
    }

    #[test]
    fn test_parse_keeps_header_fields() {
        let mut frame = ArtDmx::new(3, &[9; 24]);
        frame.sequence = 77;
        frame.physical = 2;
        let parsed = ArtDmx::parse(&frame.to_bytes()).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            ArtDmx::parse(b"Art-Net\0"),
            Err(ProtocolError::TooShort(8))
        );
    }

    #[test]
    fn test_bad_identifier() {
        let mut packet = ArtDmx::new(0, &[1]).to_bytes();
        packet[0] = b'X';
        assert_eq!(ArtDmx::parse(&packet), Err(ProtocolError::BadIdentifier));
    }

    #[test]
    fn test_bad_opcode() {
        let mut packet = ArtDmx::new(0, &[1]).to_bytes();
        // OpPoll
        packet[8..10].copy_from_slice(&0x2000u16.to_le_bytes());
        assert_eq!(
            ArtDmx::parse(&packet),
            Err(ProtocolError::UnsupportedOpcode(0x2000))
        );
    }

    #[test]
    fn test_length_too_large() {
        let mut packet = ArtDmx::new(0, &[0; 512]).to_bytes();
        packet[16..18].copy_from_slice(&513u16.to_be_bytes());
        packet.push(0);
        assert_eq!(
            ArtDmx::parse(&packet),
            Err(ProtocolError::LengthTooLarge(513))
        );
    }

    #[test]
    fn test_length_mismatch() {
        let mut packet = ArtDmx::new(0, &[1, 2, 3, 4]).to_bytes();
        packet.truncate(packet.len() - 1);
        assert_eq!(
            ArtDmx::parse(&packet),
            Err(ProtocolError::LengthMismatch {
                declared: 4,
                actual: 3
            })
        );

        let mut packet = ArtDmx::new(0, &[1, 2]).to_bytes();
        packet.push(0xFF);
        assert!(ArtDmx::parse(&packet).is_err());
    }

    #[test]
    fn test_universe_out_of_range() {
        let mut packet = ArtDmx::new(0, &[1]).to_bytes();
        packet[14..16].copy_from_slice(&0x8000u16.to_le_bytes());
        assert_eq!(
            ArtDmx::parse(&packet),
            Err(ProtocolError::UniverseOutOfRange(0x8000))
        );
    }

    #[test]
    fn test_oversized_data_is_truncated_on_encode() {
        let frame = ArtDmx::new(0, &[7u8; 600]);
        let packet = frame.to_bytes();
        assert_eq!(packet.len(), 18 + 512);
        assert_eq!(u16::from_be_bytes([packet[16], packet[17]]), 512);
    }
}

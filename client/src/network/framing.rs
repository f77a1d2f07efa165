use std::collections::HashMap;

use zone_core::byte_operations::read_u16;

use super::server_commands::ServerCommandType;

/// Declared size of an inbound packet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PacketLength {
    /// Total bytes including the opcode.
    Fixed(usize),
    /// Total size is the u16 at offset 2.
    Variable,
}

/// Opcode → length table used to cut the zone stream into packets.
///
/// Every opcode with a decoder is always present. The map server also sends a large number of
/// packets this crate does not act on; their lengths come from configuration so the stream can
/// still be walked past them.
#[derive(Clone, Debug, PartialEq)]
pub struct PacketLengths {
    lengths: HashMap<u16, PacketLength>,
}

impl Default for PacketLengths {
    fn default() -> Self {
        let lengths = ServerCommandType::ALL
            .into_iter()
            .map(|t| (t as u16, t.length()))
            .collect();
        Self { lengths }
    }
}

impl PacketLengths {
    /// Builds the table from the handled opcodes plus configured extras.
    ///
    /// Extras use `-1` for variable length. Extras never override a handled opcode.
    pub fn with_extras(extras: &HashMap<u16, i32>) -> Self {
        let mut table = Self::default();
        for (&opcode, &len) in extras {
            let length = match len {
                -1 => PacketLength::Variable,
                n if n >= 2 => PacketLength::Fixed(n as usize),
                n => {
                    log::warn!("Ignoring invalid length {n} for opcode 0x{opcode:04X}");
                    continue;
                }
            };
            table.lengths.entry(opcode).or_insert(length);
        }
        table
    }

    pub fn get(&self, opcode: u16) -> Option<PacketLength> {
        self.lengths.get(&opcode).copied()
    }
}

/// Returns the total length of the packet at the front of `bytes`, or `Ok(None)` when more
/// bytes are needed to tell.
fn packet_len(bytes: &[u8], lengths: &PacketLengths) -> Result<Option<usize>, String> {
    let Some(opcode) = read_u16(bytes, 0) else {
        return Ok(None);
    };

    match lengths.get(opcode) {
        Some(PacketLength::Fixed(len)) => Ok(Some(len)),
        Some(PacketLength::Variable) => {
            let Some(len) = read_u16(bytes, 2) else {
                return Ok(None);
            };
            if len < 4 {
                return Err(format!(
                    "Invalid variable length {len} for opcode 0x{opcode:04X}"
                ));
            }
            Ok(Some(len as usize))
        }
        None => Err(format!("Unknown packet opcode 0x{opcode:04X}")),
    }
}

/// Cuts every complete packet off the front of `recv_buf`.
///
/// Incomplete trailing bytes stay in the buffer for the next read.
pub(crate) fn split_packets(
    recv_buf: &mut Vec<u8>,
    lengths: &PacketLengths,
) -> Result<Vec<Vec<u8>>, String> {
    let mut out = Vec::<Vec<u8>>::new();
    let mut idx = 0usize;

    while idx < recv_buf.len() {
        let Some(len) = packet_len(&recv_buf[idx..], lengths)? else {
            break;
        };
        if idx + len > recv_buf.len() {
            break;
        }
        out.push(recv_buf[idx..idx + len].to_vec());
        idx += len;
    }

    recv_buf.drain(..idx);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_back_to_back_packets_and_keeps_the_tail() {
        let mut buf = vec![0x8B, 0x01, 0x00, 0x00]; // ZC_ACK_REQ_DISCONNECT, result 0
        buf.extend_from_slice(&[0x91, 0x01]); // ZC_ACCEPT_QUIT
        buf.extend_from_slice(&[0x7F, 0x00, 1, 2]); // half of ZC_NOTIFY_TIME

        let packets = split_packets(&mut buf, &PacketLengths::default()).unwrap();
        assert_eq!(packets, vec![vec![0x8B, 0x01, 0, 0], vec![0x91, 0x01]]);
        assert_eq!(buf, vec![0x7F, 0x00, 1, 2]);

        buf.extend_from_slice(&[3, 4]);
        let packets = split_packets(&mut buf, &PacketLengths::default()).unwrap();
        assert_eq!(packets, vec![vec![0x7F, 0x00, 1, 2, 3, 4]]);
        assert!(buf.is_empty());
    }

    #[test]
    fn configured_variable_length_packets_are_skipped() {
        let extras = HashMap::from([(0x008D, -1), (0x0080, 7)]);
        let lengths = PacketLengths::with_extras(&extras);

        let mut buf = vec![0x8D, 0x00, 0x09, 0x00, 1, 2, 3, 4, 5];
        buf.extend_from_slice(&[0x80, 0x00, 1, 2, 3, 4, 5]);
        let packets = split_packets(&mut buf, &lengths).unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].len(), 9);
        assert_eq!(packets[1].len(), 7);
    }

    #[test]
    fn extras_do_not_override_handled_opcodes() {
        let extras = HashMap::from([(ServerCommandType::Aid as u16, 99)]);
        let lengths = PacketLengths::with_extras(&extras);
        assert_eq!(
            lengths.get(ServerCommandType::Aid as u16),
            Some(PacketLength::Fixed(6))
        );
    }

    #[test]
    fn unknown_opcode_is_a_framing_error() {
        let mut buf = vec![0x34, 0x12, 0, 0];
        assert!(split_packets(&mut buf, &PacketLengths::default()).is_err());
    }

    #[test]
    fn single_byte_waits_for_more() {
        let mut buf = vec![0x73];
        let packets = split_packets(&mut buf, &PacketLengths::default()).unwrap();
        assert!(packets.is_empty());
        assert_eq!(buf, vec![0x73]);
    }
}

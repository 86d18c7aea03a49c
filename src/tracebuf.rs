//! Decode and encode Earthworm TRACE_BUF packets.
//!
//! A packet is a 64-byte fixed header followed by `nsamp` samples. The
//! datatype tag at offset 57 decides both the sample width and the byte
//! order of every numeric header field and sample. [`TraceBufReader`]
//! walks a snippet buffer of concatenated packets.

use crate::packet::{Samples, TracePacket};
use crate::types::{ByteOrder, SampleEncoding};
use crate::{Result, SudsError};

/// Size of the TRACE_BUF fixed header.
pub const HEADER_LEN: usize = 64;

const STA_RANGE: std::ops::Range<usize> = 32..39;
const NET_RANGE: std::ops::Range<usize> = 39..48;
const CHAN_RANGE: std::ops::Range<usize> = 48..57;
const DATATYPE_RANGE: std::ops::Range<usize> = 57..60;
const QUALITY_RANGE: std::ops::Range<usize> = 60..62;

/// Decode a single TRACE_BUF packet from the start of `data`.
///
/// Trailing bytes past the packet are ignored; use [`packet_length`] to
/// find where the next packet starts.
pub fn decode(data: &[u8]) -> Result<TracePacket> {
    let (encoding, byte_order, nsamp) = peek_header(data)?;
    let total = HEADER_LEN + nsamp * encoding.sample_size();
    if data.len() < total {
        return Err(SudsError::RecordTooShort {
            expected: total,
            actual: data.len(),
        });
    }

    let payload = &data[HEADER_LEN..total];
    let samples = match encoding {
        SampleEncoding::Int16 => Samples::Int16(
            payload
                .chunks_exact(2)
                .map(|c| read_i16([c[0], c[1]], byte_order))
                .collect(),
        ),
        SampleEncoding::Int32 => Samples::Int32(
            payload
                .chunks_exact(4)
                .map(|c| read_i32([c[0], c[1], c[2], c[3]], byte_order))
                .collect(),
        ),
        SampleEncoding::Float32 => Samples::Float32(
            payload
                .chunks_exact(4)
                .map(|c| f32::from_bits(read_i32([c[0], c[1], c[2], c[3]], byte_order) as u32))
                .collect(),
        ),
    };

    Ok(TracePacket {
        pinno: read_i32([data[0], data[1], data[2], data[3]], byte_order),
        station: read_cstr(&data[STA_RANGE])?,
        channel: read_cstr(&data[CHAN_RANGE])?,
        network: read_cstr(&data[NET_RANGE])?,
        quality: [data[QUALITY_RANGE.start], data[QUALITY_RANGE.start + 1]],
        sample_rate: read_f64(&data[24..32], byte_order),
        start_time: read_f64(&data[8..16], byte_order),
        end_time: read_f64(&data[16..24], byte_order),
        byte_order,
        samples,
    })
}

/// Encode a [`TracePacket`] into TRACE_BUF bytes in the packet's byte order.
pub fn encode(packet: &TracePacket) -> Result<Vec<u8>> {
    let order = packet.byte_order;
    let encoding = packet.encoding();
    let nsamp = i32::try_from(packet.len())
        .map_err(|_| SudsError::InvalidArgument(format!("{} samples", packet.len())))?;

    let mut buf = vec![0u8; HEADER_LEN + packet.len() * encoding.sample_size()];

    buf[0..4].copy_from_slice(&write_i32(packet.pinno, order));
    buf[4..8].copy_from_slice(&write_i32(nsamp, order));
    buf[8..16].copy_from_slice(&write_f64(packet.start_time, order));
    buf[16..24].copy_from_slice(&write_f64(packet.end_time, order));
    buf[24..32].copy_from_slice(&write_f64(packet.sample_rate, order));
    write_cstr(&mut buf[STA_RANGE], &packet.station, "station")?;
    write_cstr(&mut buf[NET_RANGE], &packet.network, "network")?;
    write_cstr(&mut buf[CHAN_RANGE], &packet.channel, "channel")?;
    write_cstr(&mut buf[DATATYPE_RANGE], encoding.datatype(order), "datatype")?;
    buf[QUALITY_RANGE].copy_from_slice(&packet.quality);

    let payload = &mut buf[HEADER_LEN..];
    match &packet.samples {
        Samples::Int16(v) => {
            for (slot, &s) in payload.chunks_exact_mut(2).zip(v) {
                slot.copy_from_slice(&match order {
                    ByteOrder::Big => s.to_be_bytes(),
                    ByteOrder::Little => s.to_le_bytes(),
                });
            }
        }
        Samples::Int32(v) => {
            for (slot, &s) in payload.chunks_exact_mut(4).zip(v) {
                slot.copy_from_slice(&write_i32(s, order));
            }
        }
        Samples::Float32(v) => {
            for (slot, &s) in payload.chunks_exact_mut(4).zip(v) {
                slot.copy_from_slice(&write_i32(s.to_bits() as i32, order));
            }
        }
    }

    Ok(buf)
}

/// Total byte length (header + payload) of the packet at the start of `data`.
pub fn packet_length(data: &[u8]) -> Result<usize> {
    let (encoding, _, nsamp) = peek_header(data)?;
    Ok(HEADER_LEN + nsamp * encoding.sample_size())
}

/// Read the datatype tag and sample count without decoding the payload.
fn peek_header(data: &[u8]) -> Result<(SampleEncoding, ByteOrder, usize)> {
    if data.len() < HEADER_LEN {
        return Err(SudsError::RecordTooShort {
            expected: HEADER_LEN,
            actual: data.len(),
        });
    }
    let tag = read_cstr(&data[DATATYPE_RANGE])?;
    let (encoding, byte_order) = SampleEncoding::from_datatype(&tag)?;
    let nsamp = read_i32([data[4], data[5], data[6], data[7]], byte_order);
    let nsamp = usize::try_from(nsamp)
        .map_err(|_| SudsError::InvalidArgument(format!("negative sample count {nsamp}")))?;
    Ok((encoding, byte_order, nsamp))
}

fn read_i16(bytes: [u8; 2], order: ByteOrder) -> i16 {
    match order {
        ByteOrder::Big => i16::from_be_bytes(bytes),
        ByteOrder::Little => i16::from_le_bytes(bytes),
    }
}

fn read_i32(bytes: [u8; 4], order: ByteOrder) -> i32 {
    match order {
        ByteOrder::Big => i32::from_be_bytes(bytes),
        ByteOrder::Little => i32::from_le_bytes(bytes),
    }
}

fn read_f64(data: &[u8], order: ByteOrder) -> f64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[..8]);
    match order {
        ByteOrder::Big => f64::from_be_bytes(bytes),
        ByteOrder::Little => f64::from_le_bytes(bytes),
    }
}

fn write_i32(v: i32, order: ByteOrder) -> [u8; 4] {
    match order {
        ByteOrder::Big => v.to_be_bytes(),
        ByteOrder::Little => v.to_le_bytes(),
    }
}

fn write_f64(v: f64, order: ByteOrder) -> [u8; 8] {
    match order {
        ByteOrder::Big => v.to_be_bytes(),
        ByteOrder::Little => v.to_le_bytes(),
    }
}

/// Read a NUL-terminated field, trimming trailing spaces.
fn read_cstr(field: &[u8]) -> Result<String> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let s = std::str::from_utf8(&field[..end])
        .map_err(|_| SudsError::InvalidArgument("non-UTF-8 header string".into()))?;
    Ok(s.trim_end().to_string())
}

/// Write a string into a fixed field, leaving room for the terminating NUL.
fn write_cstr(dest: &mut [u8], src: &str, what: &str) -> Result<()> {
    let bytes = src.as_bytes();
    if bytes.len() >= dest.len() {
        return Err(SudsError::InvalidArgument(format!(
            "{what} {src:?} longer than {} bytes",
            dest.len() - 1
        )));
    }
    dest[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Iterator over TRACE_BUF packets concatenated in a snippet buffer.
///
/// Iteration stops when the buffer is exhausted or a decode error occurs.
///
/// # Example
///
/// ```
/// use suds_rs::{tracebuf, Samples, TraceBufReader, TracePacket};
///
/// let packet = TracePacket::new()
///     .with_scn("ANMO", "BHZ", "IU")
///     .with_sample_rate(20.0)
///     .with_samples(Samples::Int32(vec![1, 2, 3]));
/// let data = tracebuf::encode(&packet).unwrap();
///
/// let packets: Vec<_> = TraceBufReader::new(&data)
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(packets.len(), 1);
/// ```
pub struct TraceBufReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> TraceBufReader<'a> {
    /// Create a new reader over the given snippet buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl Iterator for TraceBufReader<'_> {
    type Item = Result<TracePacket>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        let remaining = &self.data[self.offset..];
        let result = packet_length(remaining).and_then(|len| {
            let packet = decode(remaining)?;
            Ok((len, packet))
        });

        match result {
            Ok((len, packet)) => {
                self.offset += len;
                Some(Ok(packet))
            }
            Err(e) => {
                // Move offset to end to stop iteration
                self.offset = self.data.len();
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_packet(station: &str, order: ByteOrder, samples: Samples) -> TracePacket {
        TracePacket::new()
            .with_scn(station, "BHZ", "IU")
            .with_pinno(7)
            .with_sample_rate(100.0)
            .with_start_time(1_000_000.0)
            .with_byte_order(order)
            .with_samples(samples)
    }

    #[test]
    fn test_header_layout_big_endian() {
        let packet = make_packet("ANMO", ByteOrder::Big, Samples::Int16(vec![1, -1]));
        let bytes = encode(&packet).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 4);
        assert_eq!(&bytes[0..4], &7i32.to_be_bytes());
        assert_eq!(&bytes[4..8], &2i32.to_be_bytes());
        assert_eq!(&bytes[24..32], &100.0f64.to_be_bytes());
        assert_eq!(&bytes[32..37], b"ANMO\0");
        assert_eq!(&bytes[39..42], b"IU\0");
        assert_eq!(&bytes[48..52], b"BHZ\0");
        assert_eq!(&bytes[57..60], b"s2\0");
        assert_eq!(&bytes[64..68], &[0x00, 0x01, 0xFF, 0xFF]);
    }

    #[test]
    fn test_decode_both_byte_orders() {
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let packet = make_packet(
                "KONO",
                order,
                Samples::Float32(vec![1.5, -2.25, 3.0e12]),
            );
            let decoded = decode(&encode(&packet).unwrap()).unwrap();
            assert_eq!(decoded, packet, "{order:?}");
        }
    }

    #[test]
    fn test_decode_rejects_unknown_datatype() {
        let packet = make_packet("ANMO", ByteOrder::Little, Samples::Int32(vec![1]));
        let mut bytes = encode(&packet).unwrap();
        bytes[57] = b'f';
        bytes[58] = b'8';
        assert!(matches!(
            decode(&bytes),
            Err(SudsError::UnsupportedEncoding(tag)) if tag == "f8"
        ));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let packet = make_packet("ANMO", ByteOrder::Little, Samples::Int32(vec![1, 2, 3]));
        let bytes = encode(&packet).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() - 1]),
            Err(SudsError::RecordTooShort { expected: 76, actual: 75 })
        ));
    }

    #[test]
    fn test_encode_rejects_long_station() {
        let packet = make_packet("TOOLONGSTA", ByteOrder::Little, Samples::Int32(vec![]));
        assert!(matches!(
            encode(&packet),
            Err(SudsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_reader_walks_mixed_packets() {
        let p1 = make_packet("STA1", ByteOrder::Big, Samples::Int16(vec![10, 20]));
        let p2 = make_packet("STA2", ByteOrder::Little, Samples::Int32(vec![30, 40, 50]));

        let mut data = encode(&p1).unwrap();
        data.extend_from_slice(&encode(&p2).unwrap());

        let packets: Vec<_> = TraceBufReader::new(&data)
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].station, "STA1");
        assert_eq!(packets[1].samples, Samples::Int32(vec![30, 40, 50]));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let p1 = make_packet("STA1", ByteOrder::Little, Samples::Int32(vec![1]));
        let mut data = encode(&p1).unwrap();
        data.extend_from_slice(&[0u8; 10]);

        let results: Vec<_> = TraceBufReader::new(&data).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_reader_empty_data() {
        let packets: Vec<_> = TraceBufReader::new(&[]).collect();
        assert!(packets.is_empty());
    }
}

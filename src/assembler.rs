//! Gap-aware assembly of one channel's packets into a bounded buffer.
//!
//! [`ChannelAssembler`] owns a sample buffer sized once at construction and
//! reused for every channel. Packets are converted to 32-bit samples and
//! appended in stream order. A time gap wider than the tolerance is filled
//! with zeros. Running out of room for a packet truncates the channel;
//! running out of room for a gap fill aborts it.
//!
//! ```
//! use suds_rs::{ChannelAssembler, Samples, TracePacket};
//!
//! let packets = [
//!     TracePacket::new()
//!         .with_scn("ANMO", "BHZ", "IU")
//!         .with_sample_rate(100.0)
//!         .with_start_time(9.0)
//!         .with_samples(Samples::Int32(vec![1; 101])),
//!     TracePacket::new()
//!         .with_scn("ANMO", "BHZ", "IU")
//!         .with_sample_rate(100.0)
//!         .with_start_time(10.5)
//!         .with_samples(Samples::Int32(vec![1; 100])),
//! ];
//!
//! let mut assembler = ChannelAssembler::new(1000).unwrap();
//! let assembly = assembler.assemble(packets.into_iter().map(Ok), 1.0).unwrap();
//! assert_eq!(assembly.len(), 250);
//! assert_eq!(assembly.gaps.count, 1);
//! assert_eq!(assembly.gaps.max_fill, 49);
//! ```

use crate::convert;
use crate::packet::TracePacket;
use crate::stats::TraceStats;
use crate::types::SampleEncoding;
use crate::{Result, SudsError};

/// Lowest sample rate accepted for a channel, in Hz.
pub const MIN_SAMPLE_RATE: f64 = 0.01;

/// Gap diagnostics for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapRecord {
    /// Number of gaps that exceeded the tolerance.
    pub count: usize,
    /// Largest fill, in samples.
    pub max_fill: usize,
}

/// An assembled channel, borrowing the assembler's buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly<'a> {
    pub station: String,
    pub channel: String,
    pub network: String,
    /// Native encoding of the channel's packets.
    pub encoding: SampleEncoding,
    /// Start time of the first sample.
    pub begin_time: f64,
    pub sample_rate: f64,
    pub samples: &'a [i32],
    /// 16-bit copy of `samples`, present only for 16-bit channels.
    pub shorts: Option<&'a [i16]>,
    pub gaps: GapRecord,
    /// True when packets were dropped because the buffer was full.
    pub truncated: bool,
    /// Floating samples saturated during conversion.
    pub clipped: usize,
}

impl Assembly<'_> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn stats(&self) -> TraceStats {
        TraceStats::compute(self.samples)
    }

    /// Return the SCN identifier: `"STA.CHAN.NET"`.
    pub fn scn(&self) -> String {
        format!("{}.{}.{}", self.station, self.channel, self.network)
    }
}

/// Bookkeeping carried across packets of one channel.
struct ChannelState {
    encoding: SampleEncoding,
    sample_rate: f64,
    prev_end: f64,
    gaps: GapRecord,
    clipped: usize,
}

/// Capacity-bounded sample buffer reused across channels.
#[derive(Debug)]
pub struct ChannelAssembler {
    samples: Vec<i32>,
    shorts: Vec<i16>,
    len: usize,
}

impl ChannelAssembler {
    /// Allocate a buffer holding `capacity` samples.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SudsError::InvalidArgument(
                "assembly capacity must be at least one sample".into(),
            ));
        }
        Ok(Self {
            samples: vec![0; capacity],
            shorts: vec![0; capacity],
            len: 0,
        })
    }

    /// Allocate from a byte budget, counting 4 bytes per sample.
    pub fn from_buffer_bytes(bytes: usize) -> Result<Self> {
        Self::new(bytes / size_of::<i32>())
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Assemble one channel from its ordered packet stream.
    ///
    /// `gap_threshold` is the tolerance in sample periods. The packet source
    /// signals the end of the channel by ending the iterator; a source error
    /// aborts the channel.
    pub fn assemble<I>(&mut self, packets: I, gap_threshold: f64) -> Result<Assembly<'_>>
    where
        I: IntoIterator<Item = Result<TracePacket>>,
    {
        self.len = 0;
        let mut packets = packets.into_iter();

        let first = packets
            .next()
            .ok_or_else(|| SudsError::InvalidArgument("no packets for channel".into()))??;

        let rate = first.sample_rate;
        if !rate.is_finite() || rate < MIN_SAMPLE_RATE {
            log::error!("unreasonable sample rate ({rate}) for <{}>", first.scn());
            return Err(SudsError::InvalidSampleRate { rate });
        }

        let (station, channel, network) = (
            first.station.clone(),
            first.channel.clone(),
            first.network.clone(),
        );
        let scn = first.scn();
        let begin_time = first.start_time;
        let mut state = ChannelState {
            encoding: first.encoding(),
            sample_rate: rate,
            prev_end: first.start_time,
            gaps: GapRecord::default(),
            clipped: 0,
        };
        log::debug!("working on <{scn}> datatype {}", state.encoding);

        let mut truncated = false;
        let mut next = Some(first);
        let mut is_first = true;
        while let Some(packet) = next {
            if !is_first {
                self.fill_gap(&mut state, &packet, gap_threshold)?;
            }
            is_first = false;

            match self.push_packet(&mut state, &packet) {
                Ok(()) => {}
                Err(SudsError::BufferExhausted { needed, capacity }) => {
                    log::warn!(
                        "out of space for <{scn}> ({needed} > {capacity} samples); saving long trace"
                    );
                    truncated = true;
                    break;
                }
                Err(e) => return Err(e),
            }

            next = packets.next().transpose()?;
        }
        log::debug!(
            "done with <{scn}>: {} samples, {} gaps",
            self.len,
            state.gaps.count
        );

        let shorts = if state.encoding == SampleEncoding::Int16 {
            for (short, &sample) in self.shorts.iter_mut().zip(&self.samples[..self.len]) {
                *short = sample as i16;
            }
            Some(&self.shorts[..self.len])
        } else {
            None
        };

        Ok(Assembly {
            station,
            channel,
            network,
            encoding: state.encoding,
            begin_time,
            sample_rate: state.sample_rate,
            samples: &self.samples[..self.len],
            shorts,
            gaps: state.gaps,
            truncated,
            clipped: state.clipped,
        })
    }

    /// Zero-fill the gap between the previous packet and `packet`, if any.
    fn fill_gap(
        &mut self,
        state: &mut ChannelState,
        packet: &TracePacket,
        gap_threshold: f64,
    ) -> Result<()> {
        let gap = packet.start_time - state.prev_end;
        if state.prev_end + (1.0 / state.sample_rate) * gap_threshold >= packet.start_time {
            return Ok(());
        }

        log::warn!(
            "gap in <{}>: {:.4}: {:.4}s",
            packet.scn(),
            state.prev_end,
            gap
        );
        let fill = ((state.sample_rate * gap).floor() as i64 - 1).max(0) as usize;
        let available = self.capacity() - self.len;
        if fill > available {
            log::error!("bogus gap of {fill} samples in <{}>", packet.scn());
            return Err(SudsError::GapTooLarge { fill, available });
        }

        self.samples[self.len..self.len + fill].fill(0);
        self.len += fill;
        state.gaps.count += 1;
        state.gaps.max_fill = state.gaps.max_fill.max(fill);
        Ok(())
    }

    /// Convert and append one packet, or report that it does not fit.
    fn push_packet(&mut self, state: &mut ChannelState, packet: &TracePacket) -> Result<()> {
        if packet.encoding() != state.encoding {
            return Err(SudsError::InvalidArgument(format!(
                "<{}> switched from {} to {} mid-channel",
                packet.scn(),
                state.encoding,
                packet.encoding()
            )));
        }

        let needed = self.len + packet.len();
        if needed > self.capacity() {
            return Err(SudsError::BufferExhausted {
                needed,
                capacity: self.capacity(),
            });
        }

        let conv = convert::convert_into(&packet.samples, &mut self.samples[self.len..]);
        self.len += conv.written;
        state.clipped += conv.clipped;
        state.prev_end = packet.end_time;
        Ok(())
    }
}

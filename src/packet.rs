//! Trace packet data model.
//!
//! [`TracePacket`] is one header-plus-payload unit of waveform data for a
//! single channel, the in-memory form of an Earthworm TRACE_BUF message.

use std::fmt;

use crate::types::{ByteOrder, SampleEncoding};

/// One packet of waveform data.
///
/// `start_time` and `end_time` are epoch seconds; `end_time` is the time of
/// the last sample, not one period past it.
#[derive(Debug, Clone, PartialEq)]
pub struct TracePacket {
    pub pinno: i32,
    pub station: String,
    pub channel: String,
    pub network: String,
    pub quality: [u8; 2],
    pub sample_rate: f64,
    pub start_time: f64,
    pub end_time: f64,
    /// Byte order the packet used on the wire.
    pub byte_order: ByteOrder,
    pub samples: Samples,
}

impl TracePacket {
    /// Create an empty packet.
    ///
    /// Defaults: empty SCN, 1 Hz, start at epoch, little-endian, no samples.
    pub fn new() -> Self {
        Self {
            pinno: 0,
            station: String::new(),
            channel: String::new(),
            network: String::new(),
            quality: [0; 2],
            sample_rate: 1.0,
            start_time: 0.0,
            end_time: 0.0,
            byte_order: ByteOrder::Little,
            samples: Samples::Int32(vec![]),
        }
    }

    /// Set station, channel, and network codes.
    pub fn with_scn(mut self, station: &str, channel: &str, network: &str) -> Self {
        self.station = station.into();
        self.channel = channel.into();
        self.network = network.into();
        self
    }

    /// Set the sample rate in Hz. Recomputes the end time.
    pub fn with_sample_rate(mut self, rate: f64) -> Self {
        self.sample_rate = rate;
        self.update_end_time();
        self
    }

    /// Set the start time. Recomputes the end time.
    pub fn with_start_time(mut self, time: f64) -> Self {
        self.start_time = time;
        self.update_end_time();
        self
    }

    /// Override the end time derived from start, rate, and sample count.
    pub fn with_end_time(mut self, time: f64) -> Self {
        self.end_time = time;
        self
    }

    /// Set the sample data. Recomputes the end time.
    pub fn with_samples(mut self, samples: Samples) -> Self {
        self.samples = samples;
        self.update_end_time();
        self
    }

    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_pinno(mut self, pinno: i32) -> Self {
        self.pinno = pinno;
        self
    }

    /// The declared sample encoding of this packet.
    pub fn encoding(&self) -> SampleEncoding {
        self.samples.encoding()
    }

    /// Number of samples in the payload.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Return the SCN identifier: `"STA.CHAN.NET"`.
    pub fn scn(&self) -> String {
        format!("{}.{}.{}", self.station, self.channel, self.network)
    }

    fn update_end_time(&mut self) {
        let n = self.samples.len();
        self.end_time = if n > 1 && self.sample_rate > 0.0 {
            self.start_time + (n - 1) as f64 / self.sample_rate
        } else {
            self.start_time
        };
    }
}

impl Default for TracePacket {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TracePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:.4}-{:.4} | {} Hz | {} samples ({})",
            self.scn(),
            self.start_time,
            self.end_time,
            self.sample_rate,
            self.samples.len(),
            self.encoding(),
        )
    }
}

/// Packet sample payload in its native encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Int16(v) => v.len(),
            Samples::Int32(v) => v.len(),
            Samples::Float32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn encoding(&self) -> SampleEncoding {
        match self {
            Samples::Int16(_) => SampleEncoding::Int16,
            Samples::Int32(_) => SampleEncoding::Int32,
            Samples::Float32(_) => SampleEncoding::Float32,
        }
    }
}

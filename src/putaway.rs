//! Per-channel pipeline: assemble packets, then write SUDS records.
//!
//! ```
//! use suds_rs::{Platform, Putaway, PutawayConfig, Samples, TracePacket};
//!
//! let config = PutawayConfig::new()
//!     .with_capacity(10_000)
//!     .with_target(Platform::Sparc);
//! let mut putaway = Putaway::new(config).unwrap();
//!
//! let packet = TracePacket::new()
//!     .with_scn("ANMO", "BHZ", "IU")
//!     .with_sample_rate(40.0)
//!     .with_samples(Samples::Int32(vec![1, 2, 3]));
//!
//! let mut sink = Vec::new();
//! let report = putaway.process_channel([Ok(packet)], &mut sink).unwrap();
//! assert_eq!(report.samples, 3);
//! assert!(!report.truncated);
//! assert_eq!(sink.len(), 12 + 80 + 12 + 72 + 12);
//! ```

use std::io::Write;

use crate::assembler::{ChannelAssembler, GapRecord};
use crate::config::PutawayConfig;
use crate::packet::TracePacket;
use crate::stats::TraceStats;
use crate::swap::Normalizer;
use crate::tracebuf::TraceBufReader;
use crate::writer::SudsWriter;
use crate::Result;

/// Outcome of one successfully written channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReport {
    /// `"STA.CHAN.NET"` of the channel.
    pub scn: String,
    /// Samples written, fill included.
    pub samples: usize,
    /// Bytes written to the sink.
    pub bytes: usize,
    pub gaps: GapRecord,
    /// True when the buffer filled and later packets were dropped.
    pub truncated: bool,
    pub clipped: usize,
    pub stats: TraceStats,
}

/// Owns the assembly buffer and writes channels one at a time.
#[derive(Debug)]
pub struct Putaway {
    config: PutawayConfig,
    assembler: ChannelAssembler,
}

impl Putaway {
    /// Validate `config` and allocate the assembly buffer.
    pub fn new(config: PutawayConfig) -> Result<Self> {
        config.validate()?;
        let assembler = ChannelAssembler::new(config.capacity)?;
        Ok(Self { config, assembler })
    }

    pub fn config(&self) -> &PutawayConfig {
        &self.config
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.config.source, self.config.target)
    }

    /// Assemble one channel and write its record group to `sink`.
    ///
    /// On error nothing is written if assembly failed; if a write failed,
    /// whatever the sink already accepted stays there.
    pub fn process_channel<I, W>(&mut self, packets: I, sink: &mut W) -> Result<ChannelReport>
    where
        I: IntoIterator<Item = Result<TracePacket>>,
        W: Write,
    {
        let normalizer = self.normalizer();
        let assembly = self
            .assembler
            .assemble(packets, self.config.gap_threshold)
            .inspect_err(|e| log::error!("channel aborted during assembly: {e}"))?;

        let mut writer = SudsWriter::new(sink, normalizer);
        let written = writer.write_channel(&assembly)?;

        if assembly.truncated {
            log::debug!(
                "<{}> truncated to {} samples",
                assembly.scn(),
                assembly.len()
            );
        }

        Ok(ChannelReport {
            scn: assembly.scn(),
            samples: written.samples,
            bytes: written.bytes,
            gaps: assembly.gaps,
            truncated: assembly.truncated,
            clipped: assembly.clipped,
            stats: assembly.stats(),
        })
    }

    /// Process a snippet buffer of concatenated TRACE_BUF packets for one channel.
    pub fn process_snippet<W: Write>(
        &mut self,
        snippet: &[u8],
        sink: &mut W,
    ) -> Result<ChannelReport> {
        self.process_channel(TraceBufReader::new(snippet), sink)
    }
}

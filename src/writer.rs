//! Serialize an assembled channel as a PC-SUDS record group.
//!
//! Each channel becomes, in order: a tag announcing a station component,
//! the [`StationComp`], a tag announcing a trace description with the
//! payload length, the [`DescripTrace`], and the raw samples. Structures are
//! laid out in the source platform's byte order and normalized to the
//! target's before they reach the sink.

use std::io::Write;

use crate::assembler::Assembly;
use crate::record::{DescripTrace, StatIdent, StationComp, StructTag};
use crate::swap::{Normalizer, RecordKind, Width};
use crate::types::ByteOrder;
use crate::{Result, SudsError};

/// Data type marker for 16-bit sample payloads.
pub const DATA_TYPE_SHORT: u8 = b's';
/// Data type marker for 32-bit sample payloads.
pub const DATA_TYPE_LONG: u8 = b'l';
/// Units marker for digital counts.
pub const UNITS_COUNTS: u8 = b'd';

/// What one [`SudsWriter::write_channel`] call put on the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    /// Samples in the payload.
    pub samples: usize,
    /// Bytes written for the whole record group.
    pub bytes: usize,
}

/// Writes SUDS record groups to a byte sink.
pub struct SudsWriter<W: Write> {
    sink: W,
    normalizer: Normalizer,
}

impl<W: Write> SudsWriter<W> {
    pub fn new(sink: W, normalizer: Normalizer) -> Self {
        Self { sink, normalizer }
    }

    pub fn normalizer(&self) -> Normalizer {
        self.normalizer
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Unwrap the sink. Nothing is buffered by the writer itself.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Write the five sections for one assembled channel.
    ///
    /// A failed write aborts with [`SudsError::WriteFailed`]; sections
    /// already accepted by the sink stay there.
    pub fn write_channel(&mut self, assembly: &Assembly<'_>) -> Result<Written> {
        let machine = self.normalizer.target.machine_code();
        let source = self.normalizer.source_order();
        let ident = StatIdent::from_scn(&assembly.station, &assembly.channel, &assembly.network);
        let is_short = assembly.shorts.is_some();
        let data_type = if is_short { DATA_TYPE_SHORT } else { DATA_TYPE_LONG };

        let mut payload = encode_payload(assembly, source);
        let len_data = i32::try_from(payload.len()).map_err(|_| {
            SudsError::InvalidArgument(format!("{} payload bytes", payload.len()))
        })?;
        let mut total = 0;

        let tag = StructTag::announce(RecordKind::StationComp, machine, 0);
        log::debug!("writing tag for {} ({})", tag.id_struct, tag.len_struct);
        total += self.write_struct(RecordKind::StructTag, tag.to_bytes(source), "SUDS tag")?;

        let comp = StationComp {
            sc_name: ident.clone(),
            data_type,
            data_units: UNITS_COUNTS,
            ..Default::default()
        };
        log::debug!(
            "writing STATIONCOMP for {}.{}.{}",
            comp.sc_name.st_name,
            comp.sc_name.network,
            char::from(comp.sc_name.component)
        );
        total += self.write_struct(
            RecordKind::StationComp,
            comp.to_bytes(source),
            "SUDS_STATIONCOMP",
        )?;

        let tag = StructTag::announce(RecordKind::DescripTrace, machine, len_data);
        log::debug!("writing tag for {} ({})", tag.id_struct, tag.len_struct);
        total += self.write_struct(RecordKind::StructTag, tag.to_bytes(source), "SUDS tag")?;

        let stats = assembly.stats();
        let trace = DescripTrace {
            dt_name: ident,
            begintime: assembly.begin_time,
            datatype: data_type,
            length: assembly.len() as i32,
            rate: assembly.sample_rate as f32,
            mindata: stats.min as f32,
            maxdata: stats.max as f32,
            avenoise: stats.noise,
            numclip: i32::try_from(assembly.clipped).unwrap_or(i32::MAX),
            ..Default::default()
        };
        log::debug!(
            "writing DESCRIPTRACE - {} samples ({},{})",
            assembly.len(),
            stats.min,
            stats.max
        );
        total += self.write_struct(
            RecordKind::DescripTrace,
            trace.to_bytes(source),
            "SUDS_DESCRIPTRACE",
        )?;

        let width = if is_short { Width::Short } else { Width::Long };
        self.normalizer.normalize_samples(width, &mut payload)?;
        log::debug!("writing {} bytes of DESCRIPTRACE data", payload.len());
        self.write_section(&payload, "trace data")?;
        total += payload.len();

        Ok(Written {
            samples: assembly.len(),
            bytes: total,
        })
    }

    fn write_struct(
        &mut self,
        kind: RecordKind,
        mut image: Vec<u8>,
        section: &'static str,
    ) -> Result<usize> {
        self.normalizer.normalize(kind, &mut image)?;
        self.write_section(&image, section)?;
        Ok(image.len())
    }

    fn write_section(&mut self, bytes: &[u8], section: &'static str) -> Result<()> {
        self.sink.write_all(bytes).map_err(|source| {
            log::error!("error writing {section}: {source}");
            SudsError::WriteFailed { section, source }
        })
    }
}

/// Pack the channel's samples in `order`, 16-bit for short channels.
fn encode_payload(assembly: &Assembly<'_>, order: ByteOrder) -> Vec<u8> {
    match assembly.shorts {
        Some(shorts) => {
            let mut data = Vec::with_capacity(shorts.len() * 2);
            for &s in shorts {
                match order {
                    ByteOrder::Big => data.extend_from_slice(&s.to_be_bytes()),
                    ByteOrder::Little => data.extend_from_slice(&s.to_le_bytes()),
                }
            }
            data
        }
        None => {
            let mut data = Vec::with_capacity(assembly.samples.len() * 4);
            for &s in assembly.samples {
                match order {
                    ByteOrder::Big => data.extend_from_slice(&s.to_be_bytes()),
                    ByteOrder::Little => data.extend_from_slice(&s.to_le_bytes()),
                }
            }
            data
        }
    }
}

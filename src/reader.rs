//! Iterator-based reader for written SUDS streams.
//!
//! [`SudsReader`] walks tag-delimited structures. Each tag's machine byte
//! tells the reader which byte order the following fields use, so files
//! written for either platform read back the same way.

use crate::record::{DescripTrace, SYNC, StationComp, StructTag};
use crate::swap::RecordKind;
use crate::types::{ByteOrder, Platform};
use crate::writer::DATA_TYPE_SHORT;
use crate::{Result, SudsError};

const TAG_LEN: usize = 12;

/// Samples following a trace description.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceData {
    Short(Vec<i16>),
    Long(Vec<i32>),
}

impl TraceData {
    pub fn len(&self) -> usize {
        match self {
            TraceData::Short(v) => v.len(),
            TraceData::Long(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen to 32-bit samples.
    pub fn to_i32(&self) -> Vec<i32> {
        match self {
            TraceData::Short(v) => v.iter().map(|&s| i32::from(s)).collect(),
            TraceData::Long(v) => v.clone(),
        }
    }
}

/// One structure read from a SUDS stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SudsStruct<'a> {
    StationComp(StationComp),
    DescripTrace {
        trace: DescripTrace,
        data: TraceData,
    },
    /// A structure this reader does not decode, with its raw bytes.
    Other {
        tag: StructTag,
        body: &'a [u8],
        data: &'a [u8],
    },
}

/// Iterator over the structures in a SUDS byte stream.
///
/// Iteration stops at the end of the data or after the first error.
pub struct SudsReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> SudsReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read_next(&self) -> Result<(usize, SudsStruct<'a>)> {
        let remaining = &self.data[self.offset..];
        if remaining.len() < TAG_LEN {
            return Err(SudsError::RecordTooShort {
                expected: TAG_LEN,
                actual: remaining.len(),
            });
        }
        if remaining[0] != SYNC {
            return Err(SudsError::InvalidArgument(format!(
                "bad sync byte {:#04x} at offset {}",
                remaining[0], self.offset
            )));
        }
        let order = Platform::from_machine_code(remaining[1])?.byte_order();
        let tag = StructTag::from_bytes(&remaining[..TAG_LEN], order)?;

        let (len_struct, len_data) = match (
            usize::try_from(tag.len_struct),
            usize::try_from(tag.len_data),
        ) {
            (Ok(s), Ok(d)) => (s, d),
            _ => {
                return Err(SudsError::InvalidArgument(format!(
                    "negative length in tag at offset {}",
                    self.offset
                )));
            }
        };
        let total = TAG_LEN + len_struct + len_data;
        if remaining.len() < total {
            return Err(SudsError::RecordTooShort {
                expected: total,
                actual: remaining.len(),
            });
        }
        let body = &remaining[TAG_LEN..TAG_LEN + len_struct];
        let data = &remaining[TAG_LEN + len_struct..total];

        let item = match RecordKind::from_id(tag.id_struct) {
            Some(RecordKind::StationComp) => {
                SudsStruct::StationComp(StationComp::from_bytes(body, order)?)
            }
            Some(RecordKind::DescripTrace) => {
                let trace = DescripTrace::from_bytes(body, order)?;
                let data = decode_trace_data(&trace, data, order)?;
                SudsStruct::DescripTrace { trace, data }
            }
            _ => SudsStruct::Other { tag, body, data },
        };
        Ok((total, item))
    }
}

impl<'a> Iterator for SudsReader<'a> {
    type Item = Result<SudsStruct<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }
        match self.read_next() {
            Ok((len, item)) => {
                self.offset += len;
                Some(Ok(item))
            }
            Err(e) => {
                self.offset = self.data.len();
                Some(Err(e))
            }
        }
    }
}

fn decode_trace_data(trace: &DescripTrace, data: &[u8], order: ByteOrder) -> Result<TraceData> {
    let width = if trace.datatype == DATA_TYPE_SHORT { 2 } else { 4 };
    let expected = usize::try_from(trace.length).unwrap_or(0) * width;
    if data.len() != expected {
        return Err(SudsError::InvalidArgument(format!(
            "trace data is {} bytes, descriptor implies {expected}",
            data.len()
        )));
    }

    Ok(if width == 2 {
        TraceData::Short(
            data.chunks_exact(2)
                .map(|c| match order {
                    ByteOrder::Big => i16::from_be_bytes([c[0], c[1]]),
                    ByteOrder::Little => i16::from_le_bytes([c[0], c[1]]),
                })
                .collect(),
        )
    } else {
        TraceData::Long(
            data.chunks_exact(4)
                .map(|c| {
                    let bytes = [c[0], c[1], c[2], c[3]];
                    match order {
                        ByteOrder::Big => i32::from_be_bytes(bytes),
                        ByteOrder::Little => i32::from_le_bytes(bytes),
                    }
                })
                .collect(),
        )
    })
}

//! Assemble Earthworm trace packets into PC-SUDS trace records.
//!
//! One channel at a time, packets are converted to 32-bit samples,
//! timing gaps are zero-filled, out-of-range floats are clipped, and the
//! result is written as a SUDS record group (tag, station component, tag,
//! trace description, samples) in the byte order of the target platform.
//!
//! # Writing a channel
//!
//! ```
//! use suds_rs::{Platform, Putaway, PutawayConfig, Samples, SudsReader, SudsStruct, TracePacket};
//!
//! let config = PutawayConfig::new()
//!     .with_capacity(100_000)
//!     .with_gap_threshold(1.0)
//!     .with_target(Platform::Sparc);
//! let mut putaway = Putaway::new(config).unwrap();
//!
//! let packets = [
//!     TracePacket::new()
//!         .with_scn("ANMO", "BHZ", "IU")
//!         .with_sample_rate(100.0)
//!         .with_start_time(9.0)
//!         .with_samples(Samples::Int32(vec![10; 101])),
//!     TracePacket::new()
//!         .with_scn("ANMO", "BHZ", "IU")
//!         .with_sample_rate(100.0)
//!         .with_start_time(10.5)
//!         .with_samples(Samples::Int32(vec![20; 100])),
//! ];
//!
//! let mut sink = Vec::new();
//! let report = putaway
//!     .process_channel(packets.into_iter().map(Ok), &mut sink)
//!     .unwrap();
//! assert_eq!(report.samples, 250);
//! assert_eq!(report.gaps.max_fill, 49);
//!
//! let items: Vec<_> = SudsReader::new(&sink)
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! assert!(matches!(&items[1], SudsStruct::DescripTrace { trace, .. } if trace.length == 250));
//! ```
//!
//! # Normalizing a structure by hand
//!
//! ```
//! use suds_rs::{swap, RecordKind};
//!
//! let mut image = vec![0u8; RecordKind::DescripTrace.struct_len()];
//! image[32] = 1; // length, little-endian
//! swap::swap_record(RecordKind::DescripTrace, &mut image).unwrap();
//! assert_eq!(&image[32..36], &[0, 0, 0, 1]);
//! ```

pub mod assembler;
pub mod config;
pub mod convert;
pub mod error;
pub mod packet;
pub mod putaway;
pub mod reader;
pub mod record;
pub mod stats;
pub mod swap;
pub mod tracebuf;
pub mod types;
pub mod writer;

pub use assembler::{Assembly, ChannelAssembler, GapRecord};
pub use config::PutawayConfig;
pub use error::{Result, SudsError};
pub use packet::{Samples, TracePacket};
pub use putaway::{ChannelReport, Putaway};
pub use reader::{SudsReader, SudsStruct, TraceData};
pub use record::{DescripTrace, StatIdent, StationComp, StructTag};
pub use stats::TraceStats;
pub use swap::{Normalizer, RecordKind};
pub use tracebuf::TraceBufReader;
pub use types::{ByteOrder, Platform, SampleEncoding};
pub use writer::SudsWriter;

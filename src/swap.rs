//! Byte-order normalization of SUDS structures.
//!
//! Each [`RecordKind`] carries an ordered table of the multi-byte fields in
//! its structure image. Character arrays and single-byte fields are never
//! listed and never touched. Swapping is its own inverse.
//!
//! ```
//! use suds_rs::{Normalizer, Platform, RecordKind};
//!
//! let normalizer = Normalizer::new(Platform::Intel, Platform::Sparc);
//! let mut tag = [0u8; 12];
//! tag[2] = 7; // id_struct, little-endian
//! normalizer.normalize(RecordKind::StructTag, &mut tag).unwrap();
//! assert_eq!(&tag[2..4], &[0, 7]);
//! ```

use crate::types::{ByteOrder, Platform};
use crate::{Result, SudsError};

/// Width of a swapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Short = 2,
    Long = 4,
    Double = 8,
}

/// One multi-byte field inside a structure image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSwap {
    pub offset: usize,
    pub width: Width,
}

const fn short(offset: usize) -> FieldSwap {
    FieldSwap {
        offset,
        width: Width::Short,
    }
}

const fn long(offset: usize) -> FieldSwap {
    FieldSwap {
        offset,
        width: Width::Long,
    }
}

const fn double(offset: usize) -> FieldSwap {
    FieldSwap {
        offset,
        width: Width::Double,
    }
}

/// `inst_type` inside the embedded station identifier.
const IDENT_INST_TYPE: FieldSwap = short(10);

const STRUCTTAG_FIELDS: &[FieldSwap] = &[
    short(2), // id_struct
    long(4),  // len_struct
    long(8),  // len_data
];

const STATIONCOMP_FIELDS: &[FieldSwap] = &[
    IDENT_INST_TYPE,
    short(12),  // azim
    short(14),  // incid
    double(16), // st_lat
    double(24), // st_long
    long(32),   // elev
    short(40),  // rocktype
    long(48),   // max_gain
    long(52),   // clip_value
    long(56),   // con_mvolts
    short(60),  // channel
    short(62),  // atod_gain
    long(64),   // effective
    long(68),   // clock_correct
    long(72),   // station_delay
];

const DESCRIPTRACE_FIELDS: &[FieldSwap] = &[
    IDENT_INST_TYPE,
    double(16), // begintime
    short(24),  // localtime
    short(28),  // digi_by
    short(30),  // processed
    long(32),   // length
    long(36),   // rate
    long(40),   // mindata
    long(44),   // maxdata
    long(48),   // avenoise
    long(52),   // numclip
    double(56), // time_correct
    long(64),   // rate_correct
];

const TRIGGERS_FIELDS: &[FieldSwap] = &[
    IDENT_INST_TYPE,
    short(12),  // sta
    short(14),  // lta
    short(16),  // abs_sta
    short(18),  // abs_lta
    short(20),  // trig_value
    short(22),  // num_triggers
    double(24), // trig_time
];

const DETECTOR_FIELDS: &[FieldSwap] = &[
    long(12), // versionnum
    long(16), // event_number
    long(20), // spareL
];

const TIMECORRECTION_FIELDS: &[FieldSwap] = &[
    IDENT_INST_TYPE,
    double(16), // time_correct
    long(24),   // rate_correct
    long(32),   // effective_time
    short(36),  // spareM
];

/// SUDS structure types understood by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    StructTag,
    StationComp,
    DescripTrace,
    Triggers,
    Detector,
    TimeCorrection,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        Self::StructTag,
        Self::StationComp,
        Self::DescripTrace,
        Self::Triggers,
        Self::Detector,
        Self::TimeCorrection,
    ];

    /// Structure identifier written in `id_struct` of a tag.
    pub fn id(self) -> i16 {
        match self {
            Self::StructTag => 2,
            Self::StationComp => 5,
            Self::DescripTrace => 7,
            Self::Triggers => 25,
            Self::Detector => 28,
            Self::TimeCorrection => 30,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Size of the structure image in bytes.
    pub fn struct_len(self) -> usize {
        match self {
            Self::StructTag => 12,
            Self::StationComp => 80,
            Self::DescripTrace => 72,
            Self::Triggers => 32,
            Self::Detector => 24,
            Self::TimeCorrection => 40,
        }
    }

    /// Multi-byte fields of the structure, in declaration order.
    pub fn swap_fields(self) -> &'static [FieldSwap] {
        match self {
            Self::StructTag => STRUCTTAG_FIELDS,
            Self::StationComp => STATIONCOMP_FIELDS,
            Self::DescripTrace => DESCRIPTRACE_FIELDS,
            Self::Triggers => TRIGGERS_FIELDS,
            Self::Detector => DETECTOR_FIELDS,
            Self::TimeCorrection => TIMECORRECTION_FIELDS,
        }
    }
}

/// Reverse the byte order of every multi-byte field of `kind` in `image`.
pub fn swap_record(kind: RecordKind, image: &mut [u8]) -> Result<()> {
    if image.len() != kind.struct_len() {
        return Err(SudsError::InvalidArgument(format!(
            "{kind:?} image is {} bytes, expected {}",
            image.len(),
            kind.struct_len()
        )));
    }
    for field in kind.swap_fields() {
        image[field.offset..field.offset + field.width as usize].reverse();
    }
    Ok(())
}

/// Decides whether data laid out for `source` must be swapped for `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    pub source: Platform,
    pub target: Platform,
}

impl Normalizer {
    pub fn new(source: Platform, target: Platform) -> Self {
        Self { source, target }
    }

    /// Build a normalizer from the platform names used in configuration.
    pub fn from_names(source: &str, target: &str) -> Result<Self> {
        Ok(Self::new(source.parse()?, target.parse()?))
    }

    pub fn needs_swap(&self) -> bool {
        self.source != self.target
    }

    /// Byte order structure images are laid out in before normalization.
    pub fn source_order(&self) -> ByteOrder {
        self.source.byte_order()
    }

    /// Byte order of the output.
    pub fn target_order(&self) -> ByteOrder {
        self.target.byte_order()
    }

    /// Bring a structure image from source to target byte order.
    pub fn normalize(&self, kind: RecordKind, image: &mut [u8]) -> Result<()> {
        if self.needs_swap() {
            log::trace!("swapping {kind:?} from {} to {}", self.source, self.target);
            swap_record(kind, image)?;
        }
        Ok(())
    }

    /// Bring a packed sample payload of `width`-byte values to target order.
    pub fn normalize_samples(&self, width: Width, payload: &mut [u8]) -> Result<()> {
        let width = width as usize;
        if !payload.len().is_multiple_of(width) {
            return Err(SudsError::InvalidArgument(format!(
                "payload of {} bytes is not a multiple of {width}",
                payload.len()
            )));
        }
        if self.needs_swap() {
            for sample in payload.chunks_exact_mut(width) {
                sample.reverse();
            }
        }
        Ok(())
    }
}

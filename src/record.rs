//! PC-SUDS structure images.
//!
//! Each structure is laid out with natural alignment, so a structure that
//! contains a double is padded to a multiple of 8 bytes. Images are built
//! in a chosen byte order; [`Normalizer`](crate::Normalizer) converts them.

use crate::swap::RecordKind;
use crate::types::ByteOrder;
use crate::{Result, SudsError};

/// Sync byte leading every structure tag.
pub const SYNC: u8 = b'S';

/// Length of a [`StatIdent`] image.
pub const IDENT_LEN: usize = 12;

/// Component letters that need no comment.
const KNOWN_COMPONENTS: &[u8] = b"NnEeVvTt";

/// A structure image under construction.
struct Image {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl Image {
    fn new(kind: RecordKind, order: ByteOrder) -> Self {
        Self {
            buf: vec![0u8; kind.struct_len()],
            order,
        }
    }

    fn put(&mut self, offset: usize, be: &[u8], le: &[u8]) {
        let bytes = match self.order {
            ByteOrder::Big => be,
            ByteOrder::Little => le,
        };
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn i16(&mut self, offset: usize, v: i16) {
        self.put(offset, &v.to_be_bytes(), &v.to_le_bytes());
    }

    fn i32(&mut self, offset: usize, v: i32) {
        self.put(offset, &v.to_be_bytes(), &v.to_le_bytes());
    }

    fn f32(&mut self, offset: usize, v: f32) {
        self.put(offset, &v.to_be_bytes(), &v.to_le_bytes());
    }

    fn f64(&mut self, offset: usize, v: f64) {
        self.put(offset, &v.to_be_bytes(), &v.to_le_bytes());
    }

    fn u8(&mut self, offset: usize, v: u8) {
        self.buf[offset] = v;
    }

    fn ident(&mut self, ident: &StatIdent) {
        self.buf[0..IDENT_LEN].copy_from_slice(&ident.to_bytes(self.order));
    }
}

/// Read side of [`Image`].
struct Fields<'a> {
    buf: &'a [u8],
    order: ByteOrder,
}

impl<'a> Fields<'a> {
    fn new(kind: RecordKind, buf: &'a [u8], order: ByteOrder) -> Result<Self> {
        if buf.len() < kind.struct_len() {
            return Err(SudsError::RecordTooShort {
                expected: kind.struct_len(),
                actual: buf.len(),
            });
        }
        Ok(Self { buf, order })
    }

    fn array<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buf[offset..offset + N]);
        if self.order == ByteOrder::Little {
            bytes.reverse();
        }
        bytes
    }

    fn i16(&self, offset: usize) -> i16 {
        i16::from_be_bytes(self.array(offset))
    }

    fn i32(&self, offset: usize) -> i32 {
        i32::from_be_bytes(self.array(offset))
    }

    fn f32(&self, offset: usize) -> f32 {
        f32::from_be_bytes(self.array(offset))
    }

    fn f64(&self, offset: usize) -> f64 {
        f64::from_be_bytes(self.array(offset))
    }

    fn u8(&self, offset: usize) -> u8 {
        self.buf[offset]
    }

    fn ident(&self) -> Result<StatIdent> {
        StatIdent::from_bytes(&self.buf[0..IDENT_LEN], self.order)
    }
}

/// Station identifier embedded at the front of most structures (12 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatIdent {
    /// Network code, at most 3 characters.
    pub network: String,
    /// Station name, at most 4 characters.
    pub st_name: String,
    pub component: u8,
    pub inst_type: i16,
}

impl StatIdent {
    /// Derive a SUDS identity from Earthworm station, channel, and network.
    ///
    /// Station is cut to 4 characters and network to 3. The component is
    /// the third channel character (the first for short channel codes),
    /// with `Z` mapped to `V`. Unknown components are logged and kept.
    pub fn from_scn(station: &str, channel: &str, network: &str) -> Self {
        let chan = channel.as_bytes();
        let component = match chan.len() {
            0 => b' ',
            1 | 2 => chan[0],
            _ => chan[2],
        };
        let component = match component {
            b'Z' | b'z' => b'V',
            c => c,
        };
        if !KNOWN_COMPONENTS.contains(&component) {
            log::warn!(
                "unknown station component {:?} for <{station}.{channel}.{network}>",
                char::from(component)
            );
        }

        Self {
            network: truncate(network, 3),
            st_name: truncate(station, 4),
            component,
            inst_type: 0,
        }
    }

    pub fn to_bytes(&self, order: ByteOrder) -> [u8; IDENT_LEN] {
        let mut buf = [0u8; IDENT_LEN];
        write_cstr(&mut buf[0..4], &self.network);
        write_cstr(&mut buf[4..9], &self.st_name);
        buf[9] = self.component;
        let inst = match order {
            ByteOrder::Big => self.inst_type.to_be_bytes(),
            ByteOrder::Little => self.inst_type.to_le_bytes(),
        };
        buf[10..12].copy_from_slice(&inst);
        buf
    }

    pub fn from_bytes(buf: &[u8], order: ByteOrder) -> Result<Self> {
        if buf.len() < IDENT_LEN {
            return Err(SudsError::RecordTooShort {
                expected: IDENT_LEN,
                actual: buf.len(),
            });
        }
        let inst = [buf[10], buf[11]];
        Ok(Self {
            network: read_cstr(&buf[0..4]),
            st_name: read_cstr(&buf[4..9]),
            component: buf[9],
            inst_type: match order {
                ByteOrder::Big => i16::from_be_bytes(inst),
                ByteOrder::Little => i16::from_le_bytes(inst),
            },
        })
    }
}

/// Tag preceding every structure (12 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructTag {
    pub sync: u8,
    /// Machine code of the platform the file was written for.
    pub machine: u8,
    pub id_struct: i16,
    pub len_struct: i32,
    /// Length of data following the structure.
    pub len_data: i32,
}

impl StructTag {
    /// Tag announcing a structure of `kind` followed by `len_data` bytes.
    pub fn announce(kind: RecordKind, machine: u8, len_data: i32) -> Self {
        Self {
            sync: SYNC,
            machine,
            id_struct: kind.id(),
            len_struct: kind.struct_len() as i32,
            len_data,
        }
    }

    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        let mut img = Image::new(RecordKind::StructTag, order);
        img.u8(0, self.sync);
        img.u8(1, self.machine);
        img.i16(2, self.id_struct);
        img.i32(4, self.len_struct);
        img.i32(8, self.len_data);
        img.buf
    }

    pub fn from_bytes(buf: &[u8], order: ByteOrder) -> Result<Self> {
        let f = Fields::new(RecordKind::StructTag, buf, order)?;
        Ok(Self {
            sync: f.u8(0),
            machine: f.u8(1),
            id_struct: f.i16(2),
            len_struct: f.i32(4),
            len_data: f.i32(8),
        })
    }
}

/// Station component description (80 bytes).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationComp {
    pub sc_name: StatIdent,
    pub azim: i16,
    pub incid: i16,
    pub st_lat: f64,
    pub st_long: f64,
    pub elev: f32,
    pub enclosure: u8,
    pub annotation: u8,
    pub recorder: u8,
    pub rockclass: u8,
    pub rocktype: i16,
    pub sitecondition: u8,
    pub sensor_type: u8,
    /// `'s'` for 16-bit data, `'l'` for 32-bit.
    pub data_type: u8,
    /// `'d'` for digital counts.
    pub data_units: u8,
    pub polarity: u8,
    pub st_status: u8,
    pub max_gain: f32,
    pub clip_value: f32,
    pub con_mvolts: f32,
    pub channel: i16,
    pub atod_gain: i16,
    pub effective: i32,
    pub clock_correct: f32,
    pub station_delay: f32,
}

impl StationComp {
    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        let mut img = Image::new(RecordKind::StationComp, order);
        img.ident(&self.sc_name);
        img.i16(12, self.azim);
        img.i16(14, self.incid);
        img.f64(16, self.st_lat);
        img.f64(24, self.st_long);
        img.f32(32, self.elev);
        img.u8(36, self.enclosure);
        img.u8(37, self.annotation);
        img.u8(38, self.recorder);
        img.u8(39, self.rockclass);
        img.i16(40, self.rocktype);
        img.u8(42, self.sitecondition);
        img.u8(43, self.sensor_type);
        img.u8(44, self.data_type);
        img.u8(45, self.data_units);
        img.u8(46, self.polarity);
        img.u8(47, self.st_status);
        img.f32(48, self.max_gain);
        img.f32(52, self.clip_value);
        img.f32(56, self.con_mvolts);
        img.i16(60, self.channel);
        img.i16(62, self.atod_gain);
        img.i32(64, self.effective);
        img.f32(68, self.clock_correct);
        img.f32(72, self.station_delay);
        img.buf
    }

    pub fn from_bytes(buf: &[u8], order: ByteOrder) -> Result<Self> {
        let f = Fields::new(RecordKind::StationComp, buf, order)?;
        Ok(Self {
            sc_name: f.ident()?,
            azim: f.i16(12),
            incid: f.i16(14),
            st_lat: f.f64(16),
            st_long: f.f64(24),
            elev: f.f32(32),
            enclosure: f.u8(36),
            annotation: f.u8(37),
            recorder: f.u8(38),
            rockclass: f.u8(39),
            rocktype: f.i16(40),
            sitecondition: f.u8(42),
            sensor_type: f.u8(43),
            data_type: f.u8(44),
            data_units: f.u8(45),
            polarity: f.u8(46),
            st_status: f.u8(47),
            max_gain: f.f32(48),
            clip_value: f.f32(52),
            con_mvolts: f.f32(56),
            channel: f.i16(60),
            atod_gain: f.i16(62),
            effective: f.i32(64),
            clock_correct: f.f32(68),
            station_delay: f.f32(72),
        })
    }
}

/// Trace description (72 bytes), followed on disk by the samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DescripTrace {
    pub dt_name: StatIdent,
    /// Epoch seconds of the first sample.
    pub begintime: f64,
    pub localtime: i16,
    /// `'s'` for 16-bit data, `'l'` for 32-bit.
    pub datatype: u8,
    pub descriptor: u8,
    pub digi_by: i16,
    pub processed: i16,
    /// Number of samples.
    pub length: i32,
    pub rate: f32,
    pub mindata: f32,
    pub maxdata: f32,
    pub avenoise: f32,
    pub numclip: i32,
    pub time_correct: f64,
    pub rate_correct: f32,
}

impl DescripTrace {
    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        let mut img = Image::new(RecordKind::DescripTrace, order);
        img.ident(&self.dt_name);
        img.f64(16, self.begintime);
        img.i16(24, self.localtime);
        img.u8(26, self.datatype);
        img.u8(27, self.descriptor);
        img.i16(28, self.digi_by);
        img.i16(30, self.processed);
        img.i32(32, self.length);
        img.f32(36, self.rate);
        img.f32(40, self.mindata);
        img.f32(44, self.maxdata);
        img.f32(48, self.avenoise);
        img.i32(52, self.numclip);
        img.f64(56, self.time_correct);
        img.f32(64, self.rate_correct);
        img.buf
    }

    pub fn from_bytes(buf: &[u8], order: ByteOrder) -> Result<Self> {
        let f = Fields::new(RecordKind::DescripTrace, buf, order)?;
        Ok(Self {
            dt_name: f.ident()?,
            begintime: f.f64(16),
            localtime: f.i16(24),
            datatype: f.u8(26),
            descriptor: f.u8(27),
            digi_by: f.i16(28),
            processed: f.i16(30),
            length: f.i32(32),
            rate: f.f32(36),
            mindata: f.f32(40),
            maxdata: f.f32(44),
            avenoise: f.f32(48),
            numclip: f.i32(52),
            time_correct: f.f64(56),
            rate_correct: f.f32(64),
        })
    }
}

/// Keep at most `max` bytes of `s`, backing off to a char boundary.
fn truncate(s: &str, max: usize) -> String {
    let mut end = s.len().min(max);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_owned()
}

fn write_cstr(dest: &mut [u8], src: &str) {
    let n = src.len().min(dest.len() - 1);
    dest[..n].copy_from_slice(&src.as_bytes()[..n]);
}

fn read_cstr(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

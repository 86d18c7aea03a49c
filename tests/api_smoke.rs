//! Compile-time smoke test: verify top-level re-exports work.

use suds_rs::{
    Assembly, ByteOrder, ChannelAssembler, ChannelReport, DescripTrace, GapRecord, Normalizer,
    Platform, Putaway, PutawayConfig, RecordKind, Result, SampleEncoding, Samples, StatIdent,
    StationComp, StructTag, SudsError, SudsReader, SudsStruct, SudsWriter, TraceBufReader,
    TraceData, TracePacket, TraceStats,
};

#[test]
fn top_level_imports_compile() {
    // Just verify the types are usable from the crate root
    let _: fn(&[i32]) -> TraceStats = TraceStats::compute;
    let _: fn(usize) -> Result<ChannelAssembler> = ChannelAssembler::new;

    let _bo = ByteOrder::Big;
    let _s = Samples::Int16(vec![]);
    let _enc = SampleEncoding::Float32;
    let _p = Platform::Intel;
    let _k = RecordKind::TimeCorrection;
    let _n = Normalizer::new(Platform::Intel, Platform::Sparc);
    let _c = PutawayConfig::new();
    let _t = TracePacket::new();
    let _g = GapRecord::default();
    let _d = TraceData::Long(vec![]);
    let _tag = StructTag::announce(RecordKind::StationComp, b'6', 0);
    let _id = StatIdent::default();
    let _sc = StationComp::default();
    let _dt = DescripTrace::default();
    let _r = SudsReader::new(&[]);
    let _tb = TraceBufReader::new(&[]);
    let _w = SudsWriter::new(Vec::<u8>::new(), Normalizer::new(Platform::Sparc, Platform::Sparc));

    let _e: Option<SudsError> = None;
    let _a: Option<Assembly<'static>> = None;
    let _rep: Option<ChannelReport> = None;
    let _st: Option<SudsStruct<'static>> = None;
    let _pw: Option<Putaway> = None;
}

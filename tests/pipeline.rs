//! End-to-end behavior of channel assembly and SUDS output.

use std::io::{self, Write};

use suds_rs::{
    ByteOrder, DescripTrace, Normalizer, Platform, Putaway, PutawayConfig, RecordKind, Samples,
    SudsError, SudsReader, SudsStruct, TraceData, TracePacket, swap,
};

fn packet(start: f64, rate: f64, samples: Samples) -> TracePacket {
    TracePacket::new()
        .with_scn("ANMO", "BHZ", "IU")
        .with_sample_rate(rate)
        .with_start_time(start)
        .with_samples(samples)
}

fn putaway(capacity: usize, target: Platform) -> Putaway {
    let config = PutawayConfig::new()
        .with_capacity(capacity)
        .with_gap_threshold(1.0)
        .with_target(target);
    Putaway::new(config).unwrap()
}

fn trace_of(sink: &[u8]) -> (DescripTrace, TraceData) {
    let items: Vec<_> = SudsReader::new(sink).map(|r| r.unwrap()).collect();
    match items.into_iter().nth(1) {
        Some(SudsStruct::DescripTrace { trace, data }) => (trace, data),
        other => panic!("expected DESCRIPTRACE, got {other:?}"),
    }
}

#[test]
fn contiguous_packets_keep_every_sample() {
    let packets: Vec<_> = (0..4)
        .map(|i| Ok(packet(i as f64, 128.0, Samples::Int32(vec![i; 128]))))
        .collect();
    let mut sink = Vec::new();
    let report = putaway(10_000, Platform::Intel)
        .process_channel(packets, &mut sink)
        .unwrap();

    assert_eq!(report.samples, 512);
    assert_eq!(report.gaps.count, 0);
    let (trace, data) = trace_of(&sink);
    assert_eq!(trace.length, 512);
    assert_eq!(data.to_i32()[128 * 3], 3);
}

#[test]
fn half_second_gap_fills_49_samples() {
    let packets = vec![
        Ok(packet(9.0, 100.0, Samples::Int32(vec![7; 101]))),
        Ok(packet(10.5, 100.0, Samples::Int32(vec![7; 100]))),
    ];
    let mut sink = Vec::new();
    let report = putaway(10_000, Platform::Sparc)
        .process_channel(packets, &mut sink)
        .unwrap();

    assert_eq!(report.gaps.count, 1);
    assert_eq!(report.gaps.max_fill, 49);
    let (_, data) = trace_of(&sink);
    let samples = data.to_i32();
    assert_eq!(samples.len(), 250);
    assert!(samples[101..150].iter().all(|&s| s == 0));
}

#[test]
fn float_samples_clip_to_i32_range() {
    let packets = vec![Ok(packet(
        0.0,
        50.0,
        Samples::Float32(vec![3.0e12, -3.0e12, 41.9, -41.9]),
    ))];
    let mut sink = Vec::new();
    let report = putaway(100, Platform::Intel)
        .process_channel(packets, &mut sink)
        .unwrap();

    assert_eq!(report.clipped, 2);
    let (trace, data) = trace_of(&sink);
    assert_eq!(data, TraceData::Long(vec![2_147_483_647, -2_147_483_648, 41, -41]));
    assert_eq!(trace.numclip, 2);
    assert_eq!(trace.datatype, b'l');
}

#[test]
fn statistics_cover_fill_and_first_200_samples() {
    let mut first = vec![5, -3, 5000];
    first.resize(128, 0);
    let packets = vec![
        Ok(packet(0.0, 128.0, Samples::Int32(first))),
        Ok(packet(2.0, 128.0, Samples::Int32(vec![0; 10]))),
    ];
    let mut sink = Vec::new();
    let report = putaway(1000, Platform::Intel)
        .process_channel(packets, &mut sink)
        .unwrap();

    assert_eq!(report.samples, 266);
    assert_eq!(report.stats.min, -3);
    assert_eq!(report.stats.max, 5000);
    assert_eq!(report.stats.noise, (5002.0f64 / 200.0) as f32);

    let (trace, _) = trace_of(&sink);
    assert_eq!(trace.mindata, -3.0);
    assert_eq!(trace.maxdata, 5000.0);
    assert_eq!(trace.avenoise, report.stats.noise);
}

#[test]
fn buffer_exhaustion_truncates_without_failing() {
    let packets: Vec<_> = (0..10)
        .map(|i| Ok(packet(i as f64, 100.0, Samples::Int16(vec![1; 100]))))
        .collect();
    let mut sink = Vec::new();
    let report = putaway(350, Platform::Sparc)
        .process_channel(packets, &mut sink)
        .unwrap();

    assert!(report.truncated);
    assert_eq!(report.samples, 300);
    let (trace, data) = trace_of(&sink);
    assert_eq!(trace.length, 300);
    assert_eq!(data, TraceData::Short(vec![1; 300]));
}

#[test]
fn oversized_gap_aborts_before_any_write() {
    let mut sink = Vec::new();
    let mut putaway = putaway(1000, Platform::Intel);

    putaway
        .process_channel([Ok(packet(0.0, 100.0, Samples::Int32(vec![1; 10])))], &mut sink)
        .unwrap();
    let first_channel = sink.clone();

    let packets = vec![
        Ok(packet(0.0, 100.0, Samples::Int32(vec![1; 100]))),
        Ok(packet(3600.0, 100.0, Samples::Int32(vec![1; 100]))),
    ];
    let err = putaway.process_channel(packets, &mut sink).unwrap_err();
    assert!(matches!(err, SudsError::GapTooLarge { .. }));
    assert_eq!(sink, first_channel);
}

#[test]
fn station_identity_rules() {
    let p = TracePacket::new()
        .with_scn("ABCDEF", "EHZ", "XYZW")
        .with_sample_rate(100.0)
        .with_samples(Samples::Int32(vec![1]));
    let mut sink = Vec::new();
    putaway(10, Platform::Intel)
        .process_channel([Ok(p)], &mut sink)
        .unwrap();
    let (trace, _) = trace_of(&sink);
    assert_eq!(trace.dt_name.st_name, "ABCD");
    assert_eq!(trace.dt_name.network, "XYZ");
    assert_eq!(trace.dt_name.component, b'V');

    let odd = TracePacket::new()
        .with_scn("ANMO", "BH1", "IU")
        .with_sample_rate(100.0)
        .with_samples(Samples::Int32(vec![1]));
    let mut sink = Vec::new();
    putaway(10, Platform::Intel)
        .process_channel([Ok(odd)], &mut sink)
        .unwrap();
    let (trace, _) = trace_of(&sink);
    assert_eq!(trace.dt_name.component, b'1');
}

#[test]
fn target_format_controls_byte_order() {
    let samples = Samples::Int32(vec![0x0102_0304]);
    let mut intel = Vec::new();
    putaway(10, Platform::Intel)
        .process_channel([Ok(packet(0.0, 100.0, samples.clone()))], &mut intel)
        .unwrap();
    let mut sparc = Vec::new();
    putaway(10, Platform::Sparc)
        .process_channel([Ok(packet(0.0, 100.0, samples))], &mut sparc)
        .unwrap();

    assert_eq!(intel[1], b'6');
    assert_eq!(sparc[1], b'1');
    assert_eq!(&intel[intel.len() - 4..], &[4, 3, 2, 1]);
    assert_eq!(&sparc[sparc.len() - 4..], &[1, 2, 3, 4]);

    // every structure differs only by the swap table
    let mut tag = intel[0..12].to_vec();
    swap::swap_record(RecordKind::StructTag, &mut tag).unwrap();
    assert_eq!(tag[2..], sparc[2..12]);
    let mut comp = intel[12..92].to_vec();
    swap::swap_record(RecordKind::StationComp, &mut comp).unwrap();
    assert_eq!(comp, sparc[12..92]);
    let mut trace = intel[104..176].to_vec();
    swap::swap_record(RecordKind::DescripTrace, &mut trace).unwrap();
    assert_eq!(trace, sparc[104..176]);
}

#[test]
fn swap_twice_restores_every_kind() {
    let normalizer = Normalizer::new(Platform::Intel, Platform::Sparc);
    for kind in RecordKind::ALL {
        let original: Vec<u8> = (0..kind.struct_len()).map(|i| i as u8).collect();
        let mut image = original.clone();
        normalizer.normalize(kind, &mut image).unwrap();
        normalizer.normalize(kind, &mut image).unwrap();
        assert_eq!(image, original, "{kind:?}");
    }
}

#[test]
fn source_platform_does_not_change_output() {
    let make = |source: Platform| {
        let config = PutawayConfig::new()
            .with_capacity(100)
            .with_source(source)
            .with_target(Platform::Sparc);
        let mut sink = Vec::new();
        Putaway::new(config)
            .unwrap()
            .process_channel(
                [Ok(packet(12.25, 20.0, Samples::Int16(vec![-1, 2, -3])))],
                &mut sink,
            )
            .unwrap();
        sink
    };
    assert_eq!(make(Platform::Intel), make(Platform::Sparc));
    assert_eq!(ByteOrder::native(), Platform::native().byte_order());
}

/// Sink that rejects everything after `limit` bytes.
struct Full {
    written: usize,
    limit: usize,
}

impl Write for Full {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written >= self.limit {
            return Err(io::Error::other("device full"));
        }
        let n = buf.len().min(self.limit - self.written);
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn rejected_payload_write_fails_the_channel() {
    let mut sink = Full {
        written: 0,
        limit: 12 + 80 + 12 + 72 + 10,
    };
    let err = putaway(100, Platform::Intel)
        .process_channel(
            [Ok(packet(0.0, 100.0, Samples::Int32(vec![1; 20])))],
            &mut sink,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SudsError::WriteFailed {
            section: "trace data",
            ..
        }
    ));
    assert_eq!(sink.written, sink.limit);
}

#[test]
fn descriptor_rate_comes_from_first_packet() {
    let packets = vec![
        Ok(packet(0.0, 100.0, Samples::Int32(vec![1; 100]))),
        Ok(packet(1.0, 50.0, Samples::Int32(vec![2; 50]))),
    ];
    let mut sink = Vec::new();
    let report = putaway(1000, Platform::Intel)
        .process_channel(packets, &mut sink)
        .unwrap();

    assert_eq!(report.samples, 150);
    let (trace, _) = trace_of(&sink);
    assert_eq!(trace.rate, 100.0);
    assert_eq!(trace.length, 150);
}

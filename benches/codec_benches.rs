use criterion::{black_box, criterion_group, criterion_main, Criterion};
use toyopuc::{
    Command, ExpansionMultipoint, ExpansionPoint, FrameCodec, FunctionCode, Payload,
    MAX_RANGE_QUANTITY,
};

fn bench_build_commands(c: &mut Criterion) {
    let values: Vec<u16> = (0..MAX_RANGE_QUANTITY as u16).collect();
    let addresses: Vec<u16> = (0..0x80).collect();
    let points = (0..0x40u16).fold(ExpansionMultipoint::new(), |points, i| {
        points.with_word(ExpansionPoint::new(8, i))
    });

    c.bench_function("build_range_read", |b| {
        b.iter(|| {
            Command::new(
                FunctionCode::IoReadWord,
                None,
                black_box(Payload::Range {
                    address: 0x0100,
                    quantity: 0x20,
                }),
            )
        })
    });

    c.bench_function("build_word_write_512", |b| {
        b.iter(|| {
            Command::new(
                FunctionCode::IoWriteWord,
                None,
                black_box(Payload::Words {
                    address: 0,
                    values: &values,
                }),
            )
        })
    });

    c.bench_function("build_multipoint_word_write_128", |b| {
        b.iter(|| {
            Command::new(
                FunctionCode::IoWriteMultipointWord,
                None,
                black_box(Payload::WordPoints {
                    addresses: &addresses,
                    values: &values[..addresses.len()],
                }),
            )
        })
    });

    c.bench_function("build_expansion_multipoint_64", |b| {
        b.iter(|| {
            Command::new(
                FunctionCode::DataExpansionReadMultipoint,
                None,
                black_box(Payload::Mixed(&points)),
            )
        })
    });
}

fn bench_frames(c: &mut Criterion) {
    let codec = FrameCodec::default();
    let values: Vec<u16> = (0..MAX_RANGE_QUANTITY as u16).collect();
    let command = Command::new(
        FunctionCode::IoWriteWord,
        None,
        Payload::Words {
            address: 0,
            values: &values,
        },
    )
    .unwrap();

    let mut reply = vec![0x80, 0x00, 0xFD, 0x01, 0x1C];
    reply.extend(std::iter::repeat(0xAA).take(0x1FC));

    c.bench_function("encode_word_write_512", |b| {
        b.iter(|| codec.encode(black_box(&command)))
    });

    c.bench_function("verify_and_decode_reply", |b| {
        b.iter(|| {
            codec.verify(&[], black_box(&reply)).unwrap();
            codec.decode(black_box(&reply)).unwrap()
        })
    });
}

criterion_group!(benches, bench_build_commands, bench_frames);
criterion_main!(benches);

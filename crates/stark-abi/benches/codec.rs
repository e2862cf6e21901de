//! Codec performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use stark_abi::{Codec, Felt};

const FIXTURE: &str = include_str!("../tests/fixtures/your_contract.json");

const ALICE: &str = "0x64b48806902a367c8598f4f95c305e8c1a1acba5f082d294a43793113115691";

fn complex_input() -> serde_json::Value {
    let items: Vec<_> = (0..32)
        .map(|i| json!({"addr": {"Some": ALICE}, "val": {"Some": i}}))
        .collect();
    json!({ "val3": items })
}

fn bench_codec_build(c: &mut Criterion) {
    c.bench_function("codec_from_json", |b| {
        b.iter(|| Codec::from_json(black_box(FIXTURE)));
    });
}

fn bench_encode_complex(c: &mut Criterion) {
    let codec = Codec::from_json(FIXTURE).unwrap();
    let input = complex_input();

    c.bench_function("encode_complex_struct", |b| {
        b.iter(|| codec.encode_inputs("echo_complex_struct", black_box(&[input.clone()])));
    });
}

fn bench_decode_complex(c: &mut Criterion) {
    let codec = Codec::from_json(FIXTURE).unwrap();
    let input = complex_input();
    let wire = codec.encode_inputs("echo_complex_struct", &[input]).unwrap();

    c.bench_function("decode_complex_struct", |b| {
        b.iter(|| codec.decode_outputs("echo_complex_struct", black_box(&wire)));
    });
}

fn bench_byte_array(c: &mut Criterion) {
    let codec = Codec::from_json(FIXTURE).unwrap();
    let text = "Building Unstoppable Apps!!! ".repeat(40);
    let wire = codec
        .encode("core::byte_array::ByteArray", &json!(text))
        .unwrap();

    c.bench_function("byte_array_encode", |b| {
        b.iter(|| codec.encode("core::byte_array::ByteArray", black_box(&json!(text))));
    });
    c.bench_function("byte_array_decode", |b| {
        b.iter(|| codec.decode("core::byte_array::ByteArray", black_box(&wire)));
    });
}

fn bench_event(c: &mut Criterion) {
    let codec = Codec::from_json(FIXTURE).unwrap();
    let filter = json!({
        "greeting_setter": [ALICE, "0x1", "0x2"],
        "new_greeting": "hello world",
        "event_type": [9987, 9988, 9989],
        "addresses": [ALICE],
    });
    let keys: Vec<Felt> = codec
        .keys_with_selector("GreetingChanged", &json!({
            "greeting_setter": ALICE,
            "new_greeting": "hello world",
            "event_type": 1,
            "addresses": [ALICE],
            "tup": {"0": 1, "1": 2, "2": true, "3": ALICE},
            "st": {"addr": {"None": true}, "val": {"Some": 3}},
            "enum_val": {"val2": ALICE},
            "bool_val": false,
        }))
        .unwrap()
        .into_iter()
        .map(|position| position[0])
        .collect();
    let data: Vec<Felt> = [1u64, 5, 0, 0].iter().map(|v| Felt::from(*v)).collect();

    c.bench_function("compose_filter_keys", |b| {
        b.iter(|| codec.compose_filter_keys("GreetingChanged", black_box(&filter)));
    });
    c.bench_function("decode_log", |b| {
        b.iter(|| codec.decode_log(black_box(&keys), black_box(&data)));
    });
}

criterion_group!(
    benches,
    bench_codec_build,
    bench_encode_complex,
    bench_decode_complex,
    bench_byte_array,
    bench_event,
);
criterion_main!(benches);

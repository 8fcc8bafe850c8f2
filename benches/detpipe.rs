use criterion::{criterion_group, criterion_main, Criterion};
use detpipe::lowlevel::{center_to_corner, filter_candidates};
use detpipe::{suppress, CornerBox, DetectConfig, DetectionPipeline, RawOutputTensor};
use std::hint::black_box;

const NUM_CLASSES: usize = 80;

// yolov7-tiny at 480x640 emits 18900 candidate rows.
fn make_tensor(rows: usize, seed: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity(rows * (5 + NUM_CLASSES));
    // Odd so the xorshift state is never zero.
    let mut state = (0x2545_f491u32 ^ seed.wrapping_mul(0x9e37_79b9)) | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state >> 8) as f32 / (1u32 << 24) as f32
    };
    for _ in 0..rows {
        data.push(next() * 640.0);
        data.push(next() * 480.0);
        data.push(8.0 + next() * 120.0);
        data.push(8.0 + next() * 120.0);
        data.push(next());
        for _ in 0..NUM_CLASSES {
            data.push(next());
        }
    }
    data
}

fn bench_pipeline(c: &mut Criterion) {
    let data = make_tensor(18_900, 0);
    let raw = RawOutputTensor::from_slice(&data, NUM_CLASSES).unwrap();
    let pipeline = DetectionPipeline::new(DetectConfig::default()).unwrap();

    c.bench_function("infer_yolov7_tiny_480x640", |b| {
        b.iter(|| black_box(pipeline.infer(black_box(raw), 1280, 720).unwrap()));
    });

    c.bench_function("filter_candidates", |b| {
        b.iter(|| black_box(filter_candidates(black_box(raw), 0.7)));
    });

    let candidates = filter_candidates(raw, 0.3);
    let boxes: Vec<CornerBox> = candidates
        .iter()
        .map(|cand| center_to_corner(cand.bbox))
        .collect();
    let scores: Vec<f32> = candidates.iter().map(|cand| cand.score).collect();
    c.bench_function("suppress_dense", |b| {
        b.iter(|| black_box(suppress(&boxes, &scores, 0.3, 0.5).unwrap()));
    });

    #[cfg(feature = "rayon")]
    {
        let tensors: Vec<Vec<f32>> = (0..8u32).map(|i| make_tensor(18_900, i)).collect();
        let frames: Vec<detpipe::FrameOutput<'_>> = tensors
            .iter()
            .map(|t| detpipe::FrameOutput {
                raw: RawOutputTensor::from_slice(t, NUM_CLASSES).unwrap(),
                width: 1280,
                height: 720,
            })
            .collect();
        c.bench_function("infer_batch_8_frames", |b| {
            b.iter(|| black_box(pipeline.infer_batch(&frames).unwrap()));
        });
        c.bench_function("infer_batch_par_8_frames", |b| {
            b.iter(|| black_box(pipeline.infer_batch_par(&frames).unwrap()));
        });
    }
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);

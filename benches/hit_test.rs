use criterion::{black_box, criterion_group, criterion_main, Criterion};
use defect_overlay::{
    hit_test, AnnotationFrame, DamageAnomaly, Element, ImageSize, OpenWorldDetection, ScaleFactors,
};

fn ring_polygon(cx: f64, cy: f64, radius: f64, vertices: usize) -> Vec<[f64; 2]> {
    (0..vertices)
        .map(|i| {
            let angle = (i as f64 / vertices as f64) * std::f64::consts::TAU;
            [cx + radius * angle.cos(), cy + radius * angle.sin()]
        })
        .collect()
}

fn build_frame(elements: usize) -> AnnotationFrame {
    let frame = (0..elements)
        .map(|i| {
            let offset = (i * 37 % 4800) as f64;
            Element {
                structural_box: Some([offset, offset * 0.5, offset + 300.0, offset * 0.5 + 300.0]),
                structural_class: Some(format!("member_{i}")),
                yolo_anomalies: vec![DamageAnomaly {
                    damage_class: Some("crack_2".into()),
                    masks: vec![ring_polygon(offset + 150.0, offset * 0.5 + 150.0, 120.0, 64)],
                    ..Default::default()
                }],
                open_world_detections: vec![OpenWorldDetection {
                    boxes: Some(vec![offset, 3800.0, offset + 40.0, 3840.0]),
                    label: Some("debris".into()),
                }],
                ..Default::default()
            }
        })
        .collect();
    AnnotationFrame::new(frame)
}

fn bench_hit_test(c: &mut Criterion) {
    let frame = build_frame(200);
    let scale = ScaleFactors::compute(ImageSize::default(), 1296.0, 972.0);

    c.bench_function("hit_test_200_elements_miss", |b| {
        b.iter(|| hit_test(black_box(&frame), scale, black_box(-10.0), black_box(-10.0)))
    });

    c.bench_function("hit_test_200_elements_damage_hit", |b| {
        // A damage match still scans every open-world box first.
        let (x, y) = (150.0 * scale.sx, 150.0 * scale.sy);
        b.iter(|| hit_test(black_box(&frame), scale, black_box(x), black_box(y)))
    });
}

criterion_group!(benches, bench_hit_test);
criterion_main!(benches);

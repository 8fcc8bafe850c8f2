use detpipe::{suppress, CornerBox};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_boxes(rng: &mut StdRng, count: usize) -> (Vec<CornerBox>, Vec<f32>) {
    let mut boxes = Vec::with_capacity(count);
    let mut scores = Vec::with_capacity(count);
    for _ in 0..count {
        boxes.push(CornerBox::new(
            rng.random_range(0.0..200.0),
            rng.random_range(0.0..200.0),
            rng.random_range(0.0..80.0),
            rng.random_range(0.0..80.0),
        ));
        scores.push(rng.random_range(0.0..1.0));
    }
    (boxes, scores)
}

#[test]
fn iou_stays_within_unit_interval() {
    let mut rng = StdRng::seed_from_u64(7);
    let (boxes, _) = random_boxes(&mut rng, 64);
    for a in &boxes {
        for b in &boxes {
            let iou = a.iou(b);
            assert!((0.0..=1.0).contains(&iou), "iou {iou} out of range");
            assert_eq!(iou, b.iou(a));
        }
    }
}

#[test]
fn iou_with_self_is_one_and_disjoint_is_zero() {
    let a = CornerBox::new(10.0, 10.0, 30.0, 20.0);
    let b = CornerBox::new(100.0, 100.0, 5.0, 5.0);
    assert_eq!(a.iou(&a), 1.0);
    assert_eq!(a.iou(&b), 0.0);

    // Touching edges share no area.
    let c = CornerBox::new(40.0, 10.0, 10.0, 20.0);
    assert_eq!(a.iou(&c), 0.0);
}

/// Pairs of overlapping boxes, each pair far from every other pair.
fn separated_pairs(rng: &mut StdRng, pairs: usize) -> (Vec<CornerBox>, Vec<f32>) {
    let mut boxes = Vec::with_capacity(pairs * 2);
    let mut scores = Vec::with_capacity(pairs * 2);
    for p in 0..pairs {
        let origin = p as f32 * 1000.0;
        let w = rng.random_range(10.0..60.0);
        let h = rng.random_range(10.0..60.0);
        boxes.push(CornerBox::new(origin, 0.0, w, h));
        boxes.push(CornerBox::new(
            origin + rng.random_range(0.0..w),
            rng.random_range(0.0..h),
            rng.random_range(10.0..60.0),
            rng.random_range(10.0..60.0),
        ));
        scores.push(rng.random_range(0.0..1.0));
        scores.push(rng.random_range(0.0..1.0));
    }
    (boxes, scores)
}

#[test]
fn higher_iou_threshold_never_keeps_fewer() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let (boxes, scores) = separated_pairs(&mut rng, 20);
        let mut prev = 0usize;
        for step in 0..=10 {
            let iou_threshold = step as f32 / 10.0;
            let kept = suppress(&boxes, &scores, 0.0, iou_threshold).unwrap();
            assert!(kept.len() >= prev);
            prev = kept.len();
        }
    }
}

#[test]
fn chained_overlaps_can_keep_fewer_at_higher_threshold() {
    // A overlaps B moderately; C and D sit above and below B, overlapping it
    // heavily but each other and A only lightly.
    let a = CornerBox::new(0.0, 0.0, 10.0, 10.0);
    let b = CornerBox::new(3.9, 0.0, 10.0, 10.0);
    let c = CornerBox::new(3.9, -3.0, 10.0, 10.0);
    let d = CornerBox::new(3.9, 3.0, 10.0, 10.0);
    let boxes = [a, b, c, d];
    let scores = [0.9, 0.8, 0.7, 0.6];
    assert!(a.iou(&b) > 0.4 && a.iou(&b) < 0.5);
    assert!(b.iou(&c) > 0.5 && b.iou(&d) > 0.5);
    assert!(a.iou(&c) < 0.4 && a.iou(&d) < 0.4 && c.iou(&d) < 0.4);

    let low = suppress(&boxes, &scores, 0.0, 0.4).unwrap();
    let high = suppress(&boxes, &scores, 0.0, 0.5).unwrap();
    assert_eq!(low, vec![0, 2, 3]);
    assert_eq!(high, vec![0, 1]);
}

#[test]
fn rerunning_on_kept_boxes_keeps_all_of_them() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..20 {
        let (boxes, scores) = random_boxes(&mut rng, 40);
        let kept = suppress(&boxes, &scores, 0.1, 0.4).unwrap();
        let kept_boxes: Vec<_> = kept.iter().map(|&i| boxes[i]).collect();
        let kept_scores: Vec<_> = kept.iter().map(|&i| scores[i]).collect();
        let again = suppress(&kept_boxes, &kept_scores, 0.1, 0.4).unwrap();
        assert_eq!(again.len(), kept.len());
    }
}

#[test]
fn kept_indices_come_out_in_descending_score_order() {
    let mut rng = StdRng::seed_from_u64(5);
    let (boxes, scores) = random_boxes(&mut rng, 50);
    let kept = suppress(&boxes, &scores, 0.0, 0.5).unwrap();
    for pair in kept.windows(2) {
        assert!(scores[pair[0]] >= scores[pair[1]]);
    }
}

#[test]
fn three_colocated_boxes_collapse_to_best() {
    let b = CornerBox::new(50.0, 50.0, 40.0, 40.0);
    let boxes = [
        CornerBox::new(52.0, 50.0, 40.0, 40.0),
        b,
        CornerBox::new(50.0, 51.0, 40.0, 40.0),
    ];
    let scores = [0.8, 0.9, 0.7];
    let kept = suppress(&boxes, &scores, 0.5, 0.5).unwrap();
    assert_eq!(kept, vec![1]);
}

#[test]
fn low_overlap_pair_is_kept() {
    // Intersection 40 * 18.46 over union; chosen so IOU is about 0.3.
    let a = CornerBox::new(0.0, 0.0, 40.0, 40.0);
    let b = CornerBox::new(0.0, 40.0 - 18.4615, 40.0, 40.0);
    let iou = a.iou(&b);
    assert!((iou - 0.3).abs() < 1e-3, "iou = {iou}");
    let kept = suppress(&[a, b], &[0.9, 0.8], 0.5, 0.5).unwrap();
    assert_eq!(kept, vec![0, 1]);
}

#[test]
fn iou_equal_to_threshold_is_not_suppressed() {
    let a = CornerBox::new(0.0, 0.0, 10.0, 10.0);
    let b = CornerBox::new(5.0, 0.0, 10.0, 10.0);
    let iou = a.iou(&b);
    let kept = suppress(&[a, b], &[0.9, 0.8], 0.0, iou).unwrap();
    assert_eq!(kept.len(), 2);
}

#[test]
fn zero_area_boxes_never_suppress_each_other() {
    let z = CornerBox::new(10.0, 10.0, 0.0, 0.0);
    let kept = suppress(&[z, z, z], &[0.9, 0.8, 0.7], 0.0, 0.0).unwrap();
    assert_eq!(kept, vec![0, 1, 2]);
}

mod common;

use approx::assert_relative_eq;
use common::noise_mask;
use ndarray::{Array3, Zip};
use pct_berry::hu::to_hu;
use pct_berry::morph::{label_components, phantom};
use pct_berry::prelude::*;

fn is_subset(a: &Array3<bool>, b: &Array3<bool>) -> bool {
    Zip::from(a).and(b).all(|&x, &y| !x || y)
}

#[test]
fn test_component_selection_keeps_largest() {
    for seed in 1..4 {
        let mask = noise_mask((12, 12, 12), 0.3, seed);
        let components = label_components(mask.view());
        let mut sizes = components.sizes().to_vec();
        sizes.sort_unstable_by(|a, b| b.cmp(a));

        for count in 1..=3 {
            let out = select_largest_components(mask.view(), count).unwrap();
            assert!(is_subset(&out, &mask));
            let kept = label_components(out.view());
            assert!(kept.len() <= count);
            let expected: usize = sizes.iter().take(count).sum();
            assert_eq!(out.iter().filter(|p| **p).count(), expected);
        }
    }
}

#[test]
fn test_component_selection_rejects_zero() {
    let mask = noise_mask((4, 4, 4), 0.5, 7);
    assert!(matches!(
        select_largest_components(mask.view(), 0),
        Err(PctError::Configuration { .. })
    ));
}

#[test]
fn test_hole_fillers_are_extensive() {
    for seed in 1..4 {
        let mask = BinaryMask::from_array(noise_mask((16, 16, 16), 0.6, seed));
        let small = fill_small_holes(&mask, 1.0, 2.0).unwrap();
        assert!(mask.is_subset_of(&small));
        let full = fill_all_holes(&mask, 1, &[1, 2, 3]).unwrap();
        assert!(mask.is_subset_of(&full));
    }
}

#[test]
fn test_border_fill_leaves_open_background() {
    let tube = phantom::tube_z((10, 16, 16), (8, 8), 6.0, 3.0);
    let filled = fill_holes(tube.view());
    // 3D 中管腔与上下边缘连通, 不是空洞.
    assert_eq!(filled, tube);
}

#[test]
fn test_hu_mapping_is_exclusive() {
    let shape = (10, 10, 10);
    let head = noise_mask(shape, 0.7, 11);
    let skull = noise_mask(shape, 0.2, 12);
    let intensity = Array3::from_shape_fn(shape, |(z, h, w)| (z + h + w) as f32 / 10.0);
    let calibration = Calibration::default();
    let pct = map_to_hu(
        &Volume::from_array(intensity.clone()),
        &BinaryMask::from_array(head.clone()),
        &BinaryMask::from_array(skull.clone()),
        &calibration,
    )
    .unwrap();

    for (pos, &hu) in pct.data().indexed_iter() {
        let expected = if skull[pos] {
            to_hu(calibration.slope * intensity[pos] as f64 + calibration.intercept)
        } else if head[pos] {
            42
        } else {
            -1000
        };
        assert_eq!(hu, expected, "{pos:?}");
    }
}

#[test]
fn test_radius_measure_inverse() {
    for dims in [Dimensionality::Two, Dimensionality::Three] {
        for r in [0.0, 0.5, 1.0, 6.0, 60.0] {
            let m = radius_to_measure(r, dims);
            assert_relative_eq!(measure_to_radius(m, dims), r, epsilon = 1e-9);
        }
    }
    assert_relative_eq!(
        radius_to_measure(60.0, Dimensionality::Three),
        904_778.684,
        epsilon = 1e-2
    );
}

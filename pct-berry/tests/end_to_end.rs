mod common;

use common::{certain, dist, init_logger};
use ndarray::Array3;
use pct_berry::morph::phantom;
use pct_berry::prelude::*;

const SHAPE: Idx3d = (64, 64, 64);
const CENTER: Idx3d = (32, 32, 32);

fn sphere_provider(
    head: Array3<bool>,
    skull: Array3<bool>,
) -> impl Fn(&Volume) -> PctResult<TissueProbabilities> {
    move |_: &Volume| {
        Ok(TissueProbabilities {
            head: certain(&head),
            skull: certain(&skull),
        })
    }
}

#[test]
fn test_uniform_intensity_phantom() {
    init_logger();
    let provider = sphere_provider(
        phantom::ball(SHAPE, CENTER, 20.0),
        phantom::ball(SHAPE, CENTER, 10.0),
    );
    let pipeline = PseudoCtPipeline::new(PipelineConfig::default(), provider).unwrap();
    let intensity = Volume::from_array(Array3::from_elem(SHAPE, 1.0));
    let out = pipeline.convert_normalized(&intensity).unwrap();

    for (pos, &hu) in out.pseudo_ct.data().indexed_iter() {
        let d = dist(pos, CENTER);
        let expected = if d <= 10.0 {
            345
        } else if d <= 20.0 {
            42
        } else {
            -1000
        };
        assert_eq!(hu, expected, "voxel {pos:?} at distance {d}");
    }
    assert_eq!(out.revision, CalibrationRevision::V1);
    assert!(out.masks.report.empty_classes().is_empty());
}

#[test]
fn test_normalized_conversion() {
    init_logger();
    // 软组织强度 100, 颅骨强度 400, 角落一个孤立的 500 体素.
    let mut data = Array3::<f32>::zeros(SHAPE);
    for (pos, v) in data.indexed_iter_mut() {
        let d = dist(pos, CENTER);
        if d <= 10.0 {
            *v = 400.0;
        } else if d <= 20.0 {
            *v = 100.0;
        }
    }
    data[(0, 0, 0)] = 500.0;
    let intensity = Volume::from_array(data);

    let provider = |v: &Volume| -> PctResult<TissueProbabilities> {
        Ok(TissueProbabilities {
            head: v.like(v.data().mapv(|i| if i > 50.0 { 1.0 } else { 0.0 })),
            skull: v.like(v.data().mapv(|i| if (300.0..450.0).contains(&i) { 1.0 } else { 0.0 })),
        })
    };
    let pipeline = PseudoCtPipeline::new(PipelineConfig::default(), provider).unwrap();
    let out = pipeline.convert(&intensity).unwrap();

    assert_eq!(out.divisor, 400.0);
    assert_eq!(out.peaks.len(), 2);
    assert_eq!(out.pseudo_ct[CENTER], 345);
    assert_eq!(out.pseudo_ct[(32, 32, 32 + 15)], 42);
    // 孤立体素被连通分量选择丢弃.
    assert_eq!(out.pseudo_ct[(0, 0, 0)], -1000);
    assert_eq!(out.masks.report.head.components, 2);
}

#[test]
fn test_nifti_round_trip() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let shape = (32, 32, 32);
    let center = (16, 16, 16);
    let bone = phantom::ball(shape, center, 6.0);
    let soft = phantom::hollow_ball(shape, center, 12.0, 6.0);
    certain(&bone)
        .save(dir.path().join(NiftiProbabilityProvider::BONE_FILE))
        .unwrap();
    certain(&soft)
        .save(dir.path().join(NiftiProbabilityProvider::SOFT_TISSUE_FILE))
        .unwrap();

    let provider = NiftiProbabilityProvider::from_dir(dir.path());
    let pipeline = PseudoCtPipeline::new(PipelineConfig::default(), provider).unwrap();
    let intensity = Volume::from_array(Array3::from_elem(shape, 1.0));
    let out = pipeline.convert_normalized(&intensity).unwrap();

    let path = dir.path().join("pseudo_ct.nii.gz");
    out.pseudo_ct.save(&path).unwrap();
    let reloaded = Volume::open(&path).unwrap();
    assert_eq!(reloaded.shape(), shape);
    assert_eq!(reloaded[center], 345.0);
    assert_eq!(reloaded[(16, 16, 16 + 9)], 42.0);
    assert_eq!(reloaded[(0, 0, 0)], -1000.0);

    let png = dir.path().join("pseudo_ct_mid.png");
    out.pseudo_ct.slice_at(center.0).save(&png).unwrap();
    assert!(png.is_file());

    let mask_path = dir.path().join("head.nii.gz");
    out.masks.head.save(&mask_path).unwrap();
    let head = BinaryMask::open(&mask_path).unwrap();
    assert_eq!(head.data(), out.masks.head.data());
}

#[test]
fn test_single_slice_image() {
    init_logger();
    let shape = (1, 64, 64);
    let center = (0, 32, 32);
    let mut head = phantom::ball(shape, center, 20.0);
    // 头部内部的空洞.
    for w in 30..34 {
        head[(0, 20, w)] = false;
    }
    let mut skull = phantom::hollow_ball(shape, center, 20.0, 17.0);
    skull[(0, 2, 2)] = true;

    let provider = sphere_provider(head, skull);
    let mut config = PipelineConfig::default();
    config.full_holes.sweep_axes = vec![1];
    // 颅骨环内部 (脑) 不是噪声空洞.
    config.small_holes.max_hole_radius = 5.0;
    let pipeline = PseudoCtPipeline::new(config, provider).unwrap();
    let intensity = Volume::from_array(Array3::from_elem(shape, 1.0));
    let out = pipeline.convert_normalized(&intensity).unwrap();

    assert_eq!(out.pseudo_ct[(0, 20, 31)], 42);
    assert_eq!(out.pseudo_ct[(0, 2, 2)], -1000);
    assert_eq!(out.pseudo_ct[(0, 32, 32 + 19)], 345);
    assert_eq!(out.masks.skull.dims(), Dimensionality::Two);
}

#[test]
fn test_histogram_plot_written() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let plot = dir.path().join("histogram.png");
    let mut config = PipelineConfig::default();
    config.diagnostics.histogram_plot = Some(plot.clone());

    let provider = sphere_provider(
        phantom::ball((16, 16, 16), (8, 8, 8), 6.0),
        phantom::ball((16, 16, 16), (8, 8, 8), 3.0),
    );
    let pipeline = PseudoCtPipeline::new(config, provider).unwrap();
    let mut data = Array3::<f32>::zeros((16, 16, 16));
    data.slice_mut(ndarray::s![4..12, 4..12, 4..12]).fill(200.0);
    let normalized = pipeline.normalize(&Volume::from_array(data)).unwrap();
    assert_eq!(normalized.divisor, 200.0);
    assert!(plot.is_file());
}

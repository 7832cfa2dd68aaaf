//! 集成测试的公共工具.

#![allow(dead_code)]

use log::LevelFilter;
use ndarray::Array3;
use pct_berry::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simple_logger::SimpleLogger;

/// 初始化日志. 多个测试重复调用时只有第一次生效.
pub fn init_logger() {
    let _ = SimpleLogger::new().with_level(LevelFilter::Debug).init();
}

/// 体素到 `center` 的欧氏距离.
pub fn dist((z, h, w): Idx3d, (cz, ch, cw): Idx3d) -> f64 {
    let dz = z as f64 - cz as f64;
    let dh = h as f64 - ch as f64;
    let dw = w as f64 - cw as f64;
    (dz * dz + dh * dh + dw * dw).sqrt()
}

/// 布尔数组 -> 概率体数据 (前景 1.0, 背景 0.0).
pub fn certain(mask: &Array3<bool>) -> Volume {
    Volume::from_array(mask.mapv(|p| if p { 1.0 } else { 0.0 }))
}

/// 确定性的伪随机掩码, 前景比例约为 `density`.
pub fn noise_mask(shape: Idx3d, density: f64, seed: u64) -> Array3<bool> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array3::from_shape_simple_fn(shape, || rng.random_bool(density))
}

//! 合成体模. 用于测试和消融实验.
//!
//! 所有距离均以体素为单位, 在 `(z, H, W)` 三个方向上各向同性计算.

use crate::Idx3d;
use ndarray::Array3;

#[inline]
fn dist2((z, h, w): Idx3d, (cz, ch, cw): Idx3d) -> f64 {
    let dz = z as f64 - cz as f64;
    let dh = h as f64 - ch as f64;
    let dw = w as f64 - cw as f64;
    dz * dz + dh * dh + dw * dw
}

/// 以 `center` 为球心, 半径为 `radius` 的实心球 (含边界).
pub fn ball(shape: Idx3d, center: Idx3d, radius: f64) -> Array3<bool> {
    Array3::from_shape_fn(shape, |pos| dist2(pos, center) <= radius * radius)
}

/// 球壳: 满足 `inner < d <= outer` 的体素.
pub fn hollow_ball(shape: Idx3d, center: Idx3d, outer: f64, inner: f64) -> Array3<bool> {
    Array3::from_shape_fn(shape, |pos| {
        let d2 = dist2(pos, center);
        d2 <= outer * outer && d2 > inner * inner
    })
}

/// 轴对齐长方体 `[lo, hi)`.
pub fn cube(shape: Idx3d, (z0, h0, w0): Idx3d, (z1, h1, w1): Idx3d) -> Array3<bool> {
    Array3::from_shape_fn(shape, |(z, h, w)| {
        (z0..z1).contains(&z) && (h0..h1).contains(&h) && (w0..w1).contains(&w)
    })
}

/// 沿 z 方向贯通整个体数据的圆管: 水平切片中满足 `inner < d <= outer` 的体素.
pub fn tube_z(shape: Idx3d, (ch, cw): (usize, usize), outer: f64, inner: f64) -> Array3<bool> {
    Array3::from_shape_fn(shape, |(_, h, w)| {
        let d2 = dist2((0, h, w), (0, ch, cw));
        d2 <= outer * outer && d2 > inner * inner
    })
}

/// 边长为 `side` 的实心立方体, 中心挖去半径为 `cavity` 的球形空腔.
///
/// 立方体充满整个体数据, 因此空腔是唯一的空洞.
pub fn cube_with_cavity(side: usize, cavity: f64) -> Array3<bool> {
    let c = side / 2;
    Array3::from_shape_fn((side, side, side), |pos| {
        dist2(pos, (c, c, c)) > cavity * cavity
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(a: &Array3<bool>) -> usize {
        a.iter().filter(|p| **p).count()
    }

    #[test]
    fn test_phantoms() {
        assert_eq!(count(&ball((7, 7, 7), (3, 3, 3), 1.0)), 7);
        assert_eq!(count(&cube((5, 5, 5), (1, 1, 1), (3, 4, 5))), 2 * 3 * 4);
        assert_eq!(
            count(&hollow_ball((9, 9, 9), (4, 4, 4), 3.0, 1.0)),
            123 - 7
        );
        assert_eq!(count(&cube_with_cavity(10, 1.0)), 1000 - 7);
        assert_eq!(count(&tube_z((3, 5, 5), (2, 2), 1.0, 0.0)), 3 * 4);
    }
}

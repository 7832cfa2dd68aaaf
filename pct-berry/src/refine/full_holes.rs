//! 全空洞填充. 用于头部掩码.
//!
//! 先膨胀封闭细小的开口, 再沿若干轴逐切片填洞, 最后以同一结构元腐蚀恢复边界.

use crate::config::validate_sweep_axes;
use crate::error::PctResult;
use crate::morph::{self, Footprint};
use crate::BinaryMask;
use ndarray::Axis;

/// 填充 `mask` 的所有空洞.
///
/// `sweep_axes` 取值于 `{1, 2, 3}`, 轴 `k` 对应 `(z, H, W)` 布局的第 `k` 个数组轴.
/// 对于单切片数据, 只有轴 `1` 有意义; 其他轴的切片是一维的, 不存在封闭背景.
///
/// 扫掠轴为空或含有非法取值时返回 `Configuration` 错误.
pub fn fill_all_holes(
    mask: &BinaryMask,
    dilation_size: usize,
    sweep_axes: &[usize],
) -> PctResult<BinaryMask> {
    fill_all_holes_with_stats(mask, dilation_size, sweep_axes).map(|(m, _)| m)
}

/// 同 [`fill_all_holes`], 同时返回每个扫掠轴填充的体素个数.
pub fn fill_all_holes_with_stats(
    mask: &BinaryMask,
    dilation_size: usize,
    sweep_axes: &[usize],
) -> PctResult<(BinaryMask, Vec<(usize, usize)>)> {
    validate_sweep_axes(sweep_axes)?;

    let footprint = Footprint::ball(dilation_size, mask.dims());
    let mut dilated = morph::dilate(mask.data(), &footprint);
    let swept = sweep_axes
        .iter()
        .map(|&axis| {
            let n = morph::fill_holes_along(dilated.view_mut(), Axis(axis - 1));
            (axis, n)
        })
        .collect::<Vec<_>>();
    let out = morph::erode(dilated.view(), &footprint);
    log::debug!("full hole fill (dilation {dilation_size}): filled per axis {swept:?}");
    Ok((mask.like(out), swept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph::phantom;
    use crate::PctError;

    #[test]
    fn test_fill_enclosed_cavity() {
        let mask = BinaryMask::from_array(phantom::cube_with_cavity(20, 4.0));
        let out = fill_all_holes(&mask, 0, &[1]).unwrap();
        assert_eq!(out.count(), out.size());
    }

    #[test]
    fn test_fills_cavity_with_narrow_opening() {
        // 球壳上开一个 1 体素宽的通道: 3D 洪泛无法填充, 膨胀后可以.
        let shape = (30, 30, 30);
        let mut shell = phantom::hollow_ball(shape, (15, 15, 15), 12.0, 7.0);
        for w in 0..=8 {
            shell[(15, 15, w)] = false;
        }
        let mask = BinaryMask::from_array(shell);
        let cavity = BinaryMask::from_array(phantom::ball(shape, (15, 15, 15), 7.0));

        let out = fill_all_holes(&mask, 2, &[1, 2, 3]).unwrap();
        assert!(mask.is_subset_of(&out));
        assert!(cavity.is_subset_of(&out));
        // 通道内部被填充; 凸表面上的通道口 (15, 15, 3) 在闭运算后仍可保持打开.
        for w in 4..=8 {
            assert!(out[(15, 15, w)], "channel voxel w={w}");
        }

        let no_margin = fill_all_holes(&mask, 0, &[1, 2, 3]).unwrap();
        assert!(no_margin[(15, 15, 15)]);
    }

    #[test]
    fn test_idempotent() {
        let shape = (24, 24, 24);
        let mut shell = phantom::hollow_ball(shape, (12, 12, 12), 9.0, 5.0);
        shell[(12, 12, 3)] = false;
        let mask = BinaryMask::from_array(shell);
        let once = fill_all_holes(&mask, 3, &[1, 2, 3]).unwrap();
        let twice = fill_all_holes(&once, 3, &[1, 2, 3]).unwrap();
        assert_eq!(once.data(), twice.data());
    }

    #[test]
    fn test_2d_single_axis() {
        let ring = phantom::hollow_ball((1, 15, 15), (0, 7, 7), 6.0, 3.0);
        let mask = BinaryMask::from_array(ring);
        let disk = phantom::ball((1, 15, 15), (0, 7, 7), 6.0);
        let (out, swept) = fill_all_holes_with_stats(&mask, 1, &[1, 2, 3]).unwrap();
        assert_eq!(out.data(), disk);
        assert_eq!(swept[1].1, 0);
        assert_eq!(swept[2].1, 0);
    }

    #[test]
    fn test_invalid_axes() {
        let mask = BinaryMask::from_array(phantom::ball((5, 5, 5), (2, 2, 2), 1.0));
        for axes in [&[][..], &[0][..], &[1, 4][..]] {
            assert!(matches!(
                fill_all_holes(&mask, 1, axes),
                Err(PctError::Configuration { param: "sweep_axes", .. })
            ));
        }
    }
}

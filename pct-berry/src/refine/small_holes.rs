//! 小空洞填充. 用于颅骨掩码.
//!
//! 闭运算之后, 只填充体积不超过等效球 (2D 为圆) 的空洞, 鼻窦等较大的解剖腔保持打开.

use crate::error::{check_radius, PctResult, Stage};
use crate::morph::{self, Footprint};
use crate::BinaryMask;
use ndarray::Zip;

/// 小空洞填充的统计信息.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmallHoleStats {
    /// 闭运算新增的体素个数.
    pub closed_voxels: usize,

    /// 被填充的空洞个数.
    pub filled_holes: usize,

    /// 被填充的体素个数.
    pub filled_voxels: usize,

    /// 保持打开的 (大) 空洞个数.
    pub preserved_holes: usize,

    /// 保持打开的体素个数.
    pub preserved_voxels: usize,
}

/// 填充 `mask` 中的小空洞.
///
/// 1. 以半径 `close_radius` 的结构元做闭运算;
/// 2. 对闭运算结果做一次性边缘洪泛填充, 新增的体素即为空洞;
/// 3. 体素个数超过 `radius_to_measure(max_hole_radius)` 的空洞被丢弃;
/// 4. 返回闭运算结果与剩余小空洞的并集.
///
/// 结果总是 `mask` 的超集. 半径为负数或非有限值时返回 `Configuration` 错误.
pub fn fill_small_holes(
    mask: &BinaryMask,
    close_radius: f64,
    max_hole_radius: f64,
) -> PctResult<BinaryMask> {
    fill_small_holes_with_stats(mask, close_radius, max_hole_radius).map(|(m, _)| m)
}

/// 同 [`fill_small_holes`], 同时返回统计信息.
pub fn fill_small_holes_with_stats(
    mask: &BinaryMask,
    close_radius: f64,
    max_hole_radius: f64,
) -> PctResult<(BinaryMask, SmallHoleStats)> {
    check_radius(Stage::SmallHoleFill, "close_radius", close_radius)?;
    check_radius(Stage::SmallHoleFill, "max_hole_radius", max_hole_radius)?;

    let dims = mask.dims();
    let footprint = Footprint::new(close_radius, dims);
    let mut closed = morph::close(mask.data(), &footprint);
    let filled = morph::fill_holes(closed.view());
    let holes = Zip::from(&filled)
        .and(&closed)
        .map_collect(|&f, &c| f && !c);

    let max_measure = morph::radius_to_measure(max_hole_radius, dims);
    let components = morph::label_components(holes.view());
    let keep: Vec<usize> = (0..components.len())
        .filter(|&i| components.sizes()[i] as f64 <= max_measure)
        .collect();

    let mut stats = SmallHoleStats {
        closed_voxels: mask.count().abs_diff(count(&closed)),
        filled_holes: keep.len(),
        preserved_holes: components.len() - keep.len(),
        ..Default::default()
    };
    stats.filled_voxels = keep.iter().map(|&i| components.sizes()[i]).sum();
    stats.preserved_voxels = components.sizes().iter().sum::<usize>() - stats.filled_voxels;

    let small = components.mask_of(&keep);
    Zip::from(&mut closed).and(&small).for_each(|c, &s| *c |= s);
    log::debug!("small hole fill (max measure {max_measure:.1}): {stats:?}");
    Ok((mask.like(closed), stats))
}

#[inline]
fn count(a: &ndarray::Array3<bool>) -> usize {
    a.iter().filter(|p| **p).count()
}

//! 二值形态学, 洪泛填充与连通分量.
//!
//! 所有算子都接收 `(z, H, W)` 布尔数组视图并返回新的数组, 从不修改输入.
//! 数据的原生维度由 [`Dimensionality::of`] 决定: 单切片数据被视为 2D,
//! 此时结构元退化为圆盘, 空洞的 "边缘" 只指切片的四条边.

use crate::{Idx2d, Idx3d, Offset3d};

mod binary;
mod components;
mod fill;
mod footprint;
mod geometry;
pub mod phantom;

pub use binary::{close, dilate, erode};
pub use components::{label_components, select_largest_components, Components};
pub use fill::{fill_holes, fill_holes_along};
pub use footprint::Footprint;
pub use geometry::{measure_to_radius, radius_to_measure};

/// 数据的原生维度.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Dimensionality {
    /// 单切片 `(1, H, W)` 图像.
    Two,

    /// 一般体数据.
    Three,
}

impl Dimensionality {
    /// 由 `(z, H, W)` 形状推断原生维度.
    #[inline]
    pub const fn of((z, _, _): Idx3d) -> Self {
        if z == 1 {
            Dimensionality::Two
        } else {
            Dimensionality::Three
        }
    }
}

/// 获取 `pos` 上下左右四个点的坐标. 可能越界, 由调用方过滤.
#[inline]
pub(crate) fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 获取 `pos` 前后上下左右六个点的坐标.
///
/// 在 `shape` 范围外的坐标会被过滤掉. 对于单切片数据, 前后两个点总是越界,
/// 因此自然退化为切片内的 4-邻接.
#[inline]
pub(crate) fn diamond_neighbours(
    (z, h, w): Idx3d,
    shape: Idx3d,
) -> impl Iterator<Item = Idx3d> {
    [
        (z.wrapping_sub(1), h, w),
        (z.saturating_add(1), h, w),
        (z, h.wrapping_sub(1), w),
        (z, h.saturating_add(1), w),
        (z, h, w.wrapping_sub(1)),
        (z, h, w.saturating_add(1)),
    ]
    .into_iter()
    .filter(move |p| in_bounds(*p, shape))
}

/// 判断一个索引是否合法 (未越界).
#[inline]
pub(crate) const fn in_bounds((z, h, w): Idx3d, (lz, lh, lw): Idx3d) -> bool {
    z < lz && h < lh && w < lw
}

/// 计算 `pos + offset`. 结果越界时返回 `None`.
#[inline]
pub(crate) fn offset_pos((z, h, w): Idx3d, (dz, dh, dw): Offset3d, shape: Idx3d) -> Option<Idx3d> {
    let z = z.checked_add_signed(dz)?;
    let h = h.checked_add_signed(dh)?;
    let w = w.checked_add_signed(dw)?;
    in_bounds((z, h, w), shape).then_some((z, h, w))
}

use super::{offset_pos, Dimensionality};
use crate::{Idx3d, Offset3d};
use itertools::iproduct;

/// 结构元: 3D 为球, 2D 为圆盘.
///
/// 包含所有满足 `dz² + dh² + dw² <= r²` 的整数偏移量, 因此关于原点对称.
/// 半径为 0 时只包含原点, 此时形态学算子是恒等变换.
#[derive(Clone, Debug)]
pub struct Footprint {
    offsets: Vec<Offset3d>,
    extent: usize,
}

impl Footprint {
    /// 构造半径为 `radius` 的结构元. 对于 `Dimensionality::Two`, 结构元不跨越切片.
    ///
    /// 负数或非有限的半径被当作 0. 参数合法性应由调用方事先检查.
    pub fn new(radius: f64, dims: Dimensionality) -> Self {
        let r = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            0.0
        };
        let extent = r.floor() as isize;
        let z_extent = match dims {
            Dimensionality::Two => 0,
            Dimensionality::Three => extent,
        };
        let r2 = r * r;
        let offsets = iproduct!(
            -z_extent..=z_extent,
            -extent..=extent,
            -extent..=extent
        )
        .filter(|&(dz, dh, dw)| ((dz * dz + dh * dh + dw * dw) as f64) <= r2)
        .collect();
        Self {
            offsets,
            extent: extent as usize,
        }
    }

    /// 整数半径的结构元.
    #[inline]
    pub fn ball(radius: usize, dims: Dimensionality) -> Self {
        Self::new(radius as f64, dims)
    }

    /// 所有偏移量, 行优先顺序.
    #[inline]
    pub fn offsets(&self) -> &[Offset3d] {
        &self.offsets
    }

    /// 偏移量个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// 结构元不会为空 (至少包含原点).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// 每个方向上的最大偏移量.
    #[inline]
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// 是否只包含原点?
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.extent == 0
    }

    /// 以 `center` 为中心平移后, 落在 `shape` 范围内的所有索引.
    pub fn shifted(&self, center: Idx3d, shape: Idx3d) -> impl Iterator<Item = Idx3d> + '_ {
        self.offsets
            .iter()
            .filter_map(move |o| offset_pos(center, *o, shape))
    }
}

//! 从边缘出发的洪泛填充.

use super::{diamond_neighbours, Dimensionality};
use crate::{Idx3d, MaskSliceMut};
use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis, Zip};
use std::collections::VecDeque;

/// 填充所有空洞: 无法从数据边缘 (面邻接) 到达的背景体素均变为前景.
///
/// 3D 数据一次性在整个体数据上做 6-邻接洪泛, 不做方向扫掠;
/// 单切片数据只以切片的四条边为边缘, 做 4-邻接洪泛.
pub fn fill_holes(mask: ArrayView3<bool>) -> Array3<bool> {
    let mut out = mask.to_owned();
    match Dimensionality::of(mask.dim()) {
        Dimensionality::Two => {
            fill_holes_along(out.view_mut(), Axis(0));
        }
        Dimensionality::Three => {
            let outside = outside_background(mask);
            Zip::from(&mut out).and(&outside).for_each(|p, &reached| {
                if !reached {
                    *p = true;
                }
            });
        }
    }
    out
}

/// 从边缘背景体素出发做 6-邻接 BFS, 标记所有可到达的背景体素.
fn outside_background(mask: ArrayView3<bool>) -> Array3<bool> {
    let shape = mask.dim();
    let (lz, lh, lw) = shape;
    let mut reached = Array3::from_elem(shape, false);
    let mut bfs_q: VecDeque<Idx3d> = mask
        .indexed_iter()
        .filter(|&((z, h, w), p)| {
            !*p && (z == 0 || h == 0 || w == 0 || z + 1 == lz || h + 1 == lh || w + 1 == lw)
        })
        .map(|(pos, _)| pos)
        .collect();
    for pos in bfs_q.iter() {
        reached[*pos] = true;
    }

    while let Some(cur) = bfs_q.pop_front() {
        for neigh in diamond_neighbours(cur, shape) {
            if !mask[neigh] && !reached[neigh] {
                reached[neigh] = true;
                bfs_q.push_back(neigh);
            }
        }
    }
    reached
}

/// 就地填充所有垂直于 `axis` 的 2D 切片中的空洞, 每个切片相互独立.
///
/// 返回被填充的体素总个数. 打开 `rayon` feature 时切片并行处理.
pub fn fill_holes_along(mut mask: ArrayViewMut3<bool>, axis: Axis) -> usize {
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            use rayon::iter::{IntoParallelIterator, ParallelIterator};
            mask.axis_iter_mut(axis)
                .into_par_iter()
                .map(|v| MaskSliceMut::new(v).fill_holes())
                .sum()
        } else {
            mask.axis_iter_mut(axis)
                .map(|v| MaskSliceMut::new(v).fill_holes())
                .sum()
        }
    }
}

//! 连通分量标记与选择.

use super::diamond_neighbours;
use crate::error::{PctError, PctResult, Stage};
use crate::Idx3d;
use ndarray::{Array3, ArrayView3};
use std::collections::VecDeque;

/// 前景连通分量的标记结果.
///
/// 标记值 `0` 为背景, 第 `i` 个被发现的分量 (行优先扫描顺序) 标记为 `i + 1`.
#[derive(Debug, Clone)]
pub struct Components {
    labels: Array3<u32>,
    sizes: Vec<usize>,
}

impl Components {
    /// 分量个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// 是否没有任何前景?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// 各分量的体素个数, 按发现顺序排列.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// 标记数组.
    #[inline]
    pub fn labels(&self) -> ArrayView3<'_, u32> {
        self.labels.view()
    }

    /// 分量下标按体素个数降序排列. 体素个数相同时, 先发现的分量在前.
    pub fn ranked(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.sizes.len()).collect();
        // sort_by 是稳定排序.
        order.sort_by(|&a, &b| self.sizes[b].cmp(&self.sizes[a]));
        order
    }

    /// 由体素个数最多的前 `count` 个分量组成的掩码.
    pub fn largest(&self, count: usize) -> Array3<bool> {
        let ranked = self.ranked();
        self.mask_of(&ranked[..count.min(ranked.len())])
    }

    /// 由下标为 `keep` 的分量组成的掩码.
    pub fn mask_of(&self, keep: &[usize]) -> Array3<bool> {
        let mut selected = vec![false; self.sizes.len() + 1];
        for &i in keep {
            if let Some(s) = selected.get_mut(i + 1) {
                *s = true;
            }
        }
        self.labels.mapv(|l| selected[l as usize])
    }
}

/// 以面邻接 (3D 为 6-邻接, 单切片为 4-邻接) 标记所有前景连通分量.
pub fn label_components(mask: ArrayView3<bool>) -> Components {
    let shape = mask.dim();
    let mut labels = Array3::<u32>::zeros(shape);
    let mut sizes = Vec::new();
    let mut bfs_q: VecDeque<Idx3d> = VecDeque::new();

    for (seed, &p) in mask.indexed_iter() {
        if !p || labels[seed] != 0 {
            continue;
        }
        let label = sizes.len() as u32 + 1;
        labels[seed] = label;
        bfs_q.push_back(seed);
        let mut size = 0usize;

        while let Some(cur) = bfs_q.pop_front() {
            size += 1;
            for neigh in diamond_neighbours(cur, shape) {
                if mask[neigh] && labels[neigh] == 0 {
                    labels[neigh] = label;
                    bfs_q.push_back(neigh);
                }
            }
        }
        sizes.push(size);
    }
    Components { labels, sizes }
}

/// 保留体素个数最多的前 `count` 个连通分量 (分量不足 `count` 个时全部保留).
///
/// `count == 0` 时返回 `Configuration` 错误.
pub fn select_largest_components(mask: ArrayView3<bool>, count: usize) -> PctResult<Array3<bool>> {
    if count == 0 {
        return Err(PctError::config(
            Stage::ComponentSelection,
            "count",
            count,
            "must be >= 1",
        ));
    }
    let components = label_components(mask);
    log::debug!(
        "keeping {} of {} components",
        count.min(components.len()),
        components.len()
    );
    Ok(components.largest(count))
}

use super::iter::BorderIter;
use crate::morph::neighbour4;
use crate::Idx2d;
use ndarray::{Array2, ArrayView2, ArrayViewMut2};
use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

/// 不可变、借用的二维掩码切片.
///
/// 切片可以垂直于任意轴 (不一定是水平切片), 这也是全空洞填充时多方向扫掠的基础.
pub struct MaskSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::BinaryMask`] 或某个私有缓冲区.
    data: ArrayView2<'a, bool>,
}

impl Index<Idx2d> for MaskSlice<'_> {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 可变、借用的二维掩码切片.
pub struct MaskSliceMut<'a> {
    /// 底层数据的轻量级视图.
    data: ArrayViewMut2<'a, bool>,
}

/// 可变方法集合.
impl MaskSliceMut<'_> {
    /// 将切片中的背景空洞 (即 4-相邻意义下无法从图像边缘到达的背景区域)
    /// 填充为前景.
    ///
    /// 返回被填充的像素个数. 该操作是幂等的.
    pub fn fill_holes(&mut self) -> usize {
        let outside = self.outside_background();
        let mut filled = 0usize;
        for (p, &reached) in self.data.iter_mut().zip(outside.iter()) {
            if !*p && !reached {
                *p = true;
                filled += 1;
            }
        }
        filled
    }
}

impl Index<Idx2d> for MaskSliceMut<'_> {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx2d> for MaskSliceMut<'_> {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// mask 不可变方法集合.
macro_rules! impl_mask_slice_immut {
    ($life: lifetime, $slice: ty, $array: ty) => {
        /// 不可变方法集合.
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: $array) -> Self {
                Self { data }
            }

            /// 图像的分辨率 (高, 宽).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                self.data.dim()
            }

            /// 图像的像素个数.
            #[inline]
            pub fn size(&self) -> usize {
                let (h, w) = self.shape();
                h * w
            }

            /// 统计图像中的前景像素总个数.
            #[inline]
            pub fn count(&self) -> usize {
                self.data.iter().filter(|p| **p).count()
            }

            /// 获得图像的高.
            #[inline]
            pub fn height(&self) -> usize {
                self.shape().0
            }

            /// 获得图像的宽.
            #[inline]
            pub fn width(&self) -> usize {
                self.shape().1
            }

            /// 判断一个索引是否位于图像的边缘.
            #[inline]
            pub fn is_at_border(&self, (h, w): Idx2d) -> bool {
                h == 0
                    || h.saturating_add(1) == self.height()
                    || w == 0
                    || w.saturating_add(1) == self.width()
            }

            /// 获得 `pos` 的 4-邻域像素索引. 保证返回的索引都不越界.
            #[inline]
            pub fn n4_positions(&self, pos: Idx2d) -> impl Iterator<Item = Idx2d> {
                let (h_len, w_len) = self.shape();
                neighbour4(pos)
                    .into_iter()
                    .filter(move |&(h, w)| h < h_len && w < w_len)
            }

            /// 以行优先规则, 获取能迭代图像边缘所有索引的迭代器.
            #[inline]
            pub fn border_iter(&self) -> BorderIter {
                BorderIter::new(self.shape())
            }

            /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &bool)> {
                self.data.indexed_iter()
            }

            /// 从图像边缘的背景像素出发做 4-相邻 BFS, 标记所有可到达的背景像素.
            ///
            /// 返回值中为 `false` 的背景像素即为空洞.
            pub fn outside_background(&self) -> Array2<bool> {
                let mut reached = Array2::from_elem(self.shape(), false);
                let mut bfs_q: VecDeque<Idx2d> =
                    self.border_iter().filter(|p| !self.data[*p]).collect();
                for p in bfs_q.iter() {
                    reached[*p] = true;
                }

                while let Some(cur) = bfs_q.pop_front() {
                    for neigh in self.n4_positions(cur) {
                        if !self.data[neigh] && !reached[neigh] {
                            reached[neigh] = true;
                            bfs_q.push_back(neigh);
                        }
                    }
                }
                reached
            }

            /// 统计空洞像素 (无法从边缘到达的背景像素) 个数.
            pub fn hole_count(&self) -> usize {
                let outside = self.outside_background();
                self.data
                    .iter()
                    .zip(outside.iter())
                    .filter(|(p, reached)| !**p && !**reached)
                    .count()
            }
        }
    };
}
impl_mask_slice_immut!('a, MaskSlice<'a>, ArrayView2<'a, bool>);
impl_mask_slice_immut!('a, MaskSliceMut<'a>, ArrayViewMut2<'a, bool>);

/// 不可变、借用的二维伪 CT 切片. 仅用于导出检查.
pub struct PseudoCtSlice<'a> {
    data: ArrayView2<'a, i16>,
}

impl Index<Idx2d> for PseudoCtSlice<'_> {
    type Output = i16;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> PseudoCtSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: ArrayView2<'a, i16>) -> Self {
        Self { data }
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 以行优先规则, 获取能迭代图像所有 `(索引, HU 值)` 的迭代器.
    #[inline]
    pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &i16)> {
        self.data.indexed_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// 7x7, 外环为前景, 中间有一个 3x3 的空洞, 其中心为前景.
    fn ring() -> Array2<bool> {
        Array2::from_shape_fn((7, 7), |(h, w)| {
            let on_ring = (1..=5).contains(&h)
                && (1..=5).contains(&w)
                && (h == 1 || h == 5 || w == 1 || w == 5);
            on_ring || (h, w) == (3, 3)
        })
    }

    #[test]
    fn test_fill_holes() {
        let mut arr = ring();
        let mut sli = MaskSliceMut::new(arr.view_mut());
        assert_eq!(sli.hole_count(), 8);
        assert_eq!(sli.fill_holes(), 8);
        assert_eq!(sli.hole_count(), 0);
        // 幂等
        assert_eq!(sli.fill_holes(), 0);
        // 外部背景不受影响
        assert!(!arr[(0, 0)]);
        assert!(!arr[(6, 3)]);
        assert_eq!(arr.iter().filter(|p| **p).count(), 25);
    }

    #[test]
    fn test_open_ring_is_not_a_hole() {
        let mut arr = ring();
        // 在环上开一个口.
        arr[(1, 3)] = false;
        let sli = MaskSlice::new(arr.view());
        assert_eq!(sli.hole_count(), 0);
    }

    #[test]
    fn test_border_background_seeds() {
        let arr = Array2::from_elem((4, 4), true);
        let sli = MaskSlice::new(arr.view());
        assert!(!sli.outside_background().iter().any(|p| *p));
        assert!(sli.is_at_border((0, 2)));
        assert!(!sli.is_at_border((2, 2)));
        assert_eq!(sli.n4_positions((0, 0)).count(), 2);
        assert_eq!(sli.n4_positions((1, 1)).count(), 4);
    }
}

//! 膨胀, 腐蚀与闭运算.

use super::{offset_pos, Footprint};
use ndarray::{Array3, ArrayView3, Zip};

/// 逐体素计算 `out[pos] = op(pos)`. 打开 `rayon` feature 时并行执行.
fn map_indexed<F>(shape: crate::Idx3d, op: F) -> Array3<bool>
where
    F: Fn(crate::Idx3d) -> bool + Sync + Send,
{
    let mut out = Array3::from_elem(shape, false);
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            Zip::indexed(&mut out).par_for_each(|pos, p| *p = op(pos));
        } else {
            Zip::indexed(&mut out).for_each(|pos, p| *p = op(pos));
        }
    }
    out
}

/// 二值膨胀. 数据范围外被视为背景.
pub fn dilate(mask: ArrayView3<bool>, footprint: &Footprint) -> Array3<bool> {
    if footprint.is_identity() {
        return mask.to_owned();
    }
    let shape = mask.dim();
    map_indexed(shape, |pos| {
        mask[pos]
            || footprint
                .offsets()
                .iter()
                .filter_map(|o| offset_pos(pos, *o, shape))
                .any(|q| mask[q])
    })
}

/// 二值腐蚀. 数据范围外被视为前景, 因此接触边缘的前景不会被边缘 "侵蚀".
pub fn erode(mask: ArrayView3<bool>, footprint: &Footprint) -> Array3<bool> {
    if footprint.is_identity() {
        return mask.to_owned();
    }
    let shape = mask.dim();
    map_indexed(shape, |pos| {
        mask[pos]
            && footprint
                .offsets()
                .iter()
                .filter_map(|o| offset_pos(pos, *o, shape))
                .all(|q| mask[q])
    })
}

/// 二值闭运算: 先膨胀, 再用同一结构元腐蚀.
///
/// 由于两者的边缘约定, 结果总是输入的超集.
pub fn close(mask: ArrayView3<bool>, footprint: &Footprint) -> Array3<bool> {
    let dilated = dilate(mask, footprint);
    erode(dilated.view(), footprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph::{phantom, Dimensionality};
    use ndarray::Array3;

    fn count(a: &Array3<bool>) -> usize {
        a.iter().filter(|p| **p).count()
    }

    #[test]
    fn test_dilate_single_voxel() {
        let mut m = Array3::from_elem((5, 5, 5), false);
        m[(2, 2, 2)] = true;
        let fp = Footprint::new(1.0, Dimensionality::Three);
        assert_eq!(count(&dilate(m.view(), &fp)), 7);

        let mut m = Array3::from_elem((1, 5, 5), false);
        m[(0, 2, 2)] = true;
        let fp = Footprint::new(1.0, Dimensionality::Two);
        assert_eq!(count(&dilate(m.view(), &fp)), 5);
    }

    #[test]
    fn test_erode_keeps_border_touching_foreground() {
        let m = Array3::from_elem((4, 4, 4), true);
        let fp = Footprint::new(1.0, Dimensionality::Three);
        assert_eq!(erode(m.view(), &fp), m);

        let mut m = Array3::from_elem((5, 5, 5), true);
        m[(2, 2, 2)] = false;
        assert_eq!(count(&erode(m.view(), &fp)), 125 - 7);
    }

    #[test]
    fn test_close_is_extensive_and_fills_gap() {
        // 两个相距 1 体素的立方体被闭运算连接.
        let shape = (9, 9, 12);
        let a = phantom::cube(shape, (2, 2, 2), (7, 7, 6));
        let b = phantom::cube(shape, (2, 2, 7), (7, 7, 10));
        let m = Zip::from(&a).and(&b).map_collect(|&x, &y| x || y);
        let fp = Footprint::new(1.0, Dimensionality::Three);
        let closed = close(m.view(), &fp);
        assert!(Zip::from(&m).and(&closed).all(|&x, &y| !x || y));
        assert!(closed[(4, 4, 6)]);
        assert!(!closed[(0, 0, 6)]);
    }

    #[test]
    fn test_identity_footprint() {
        let m = phantom::ball((7, 7, 7), (3, 3, 3), 2.0);
        let fp = Footprint::new(0.0, Dimensionality::Three);
        assert_eq!(dilate(m.view(), &fp), m);
        assert_eq!(erode(m.view(), &fp), m);
        assert_eq!(close(m.view(), &fp), m);
    }
}

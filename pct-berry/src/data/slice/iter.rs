use crate::Idx2d;

/// 行优先的边缘索引迭代器.
///
/// 依次给出 `(h, w)` 形状图像四条边上的所有索引, 每个索引恰好出现一次.
/// 内部行只会产生首尾两个索引, 因此总长度为 `O(h + w)` 而不是 `O(h * w)`.
#[derive(Debug)]
pub struct BorderIter {
    cur: Idx2d,
    h: usize,
    w: usize,
    done: bool,
}

impl BorderIter {
    #[inline]
    pub fn new((h, w): Idx2d) -> Self {
        Self {
            cur: (0, 0),
            h,
            w,
            done: h == 0 || w == 0,
        }
    }
}

impl Iterator for BorderIter {
    type Item = Idx2d;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let ret = self.cur;
        let (ch, cw) = self.cur;
        let on_edge_row = ch == 0 || ch + 1 == self.h;

        if on_edge_row && cw + 1 < self.w {
            // 首行/末行: 逐个前进.
            self.cur = (ch, cw + 1);
        } else if !on_edge_row && cw == 0 && self.w > 1 {
            // 内部行: 直接跳到行尾.
            self.cur = (ch, self.w - 1);
        } else if ch + 1 < self.h {
            self.cur = (ch + 1, 0);
        } else {
            self.done = true;
        }
        Some(ret)
    }
}

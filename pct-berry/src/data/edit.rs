//! 手动修正掩码, 支持撤销/重做.
//!
//! 历史记录以 zlib 压缩的快照保存. 头部掩码大多是成片的前景/背景, 压缩率很高,
//! 因此即使保存很多步历史, 内存占用也可接受.

use super::BinaryMask;
use crate::consts::gray::is_foreground;
use crate::error::{check_radius, PctError, PctResult, Stage};
use crate::morph::Footprint;
use crate::Idx3d;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use ndarray::Array3;
use std::collections::VecDeque;
use std::io::{Read, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 压缩存储的掩码数据; 不透明类型. 不包含 header.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompactMask {
    /// 压缩的不透明字节流.
    buf: Vec<u8>,

    /// 形状.
    sh: Idx3d,
}

impl CompactMask {
    /// 压缩掩码数据.
    pub fn compress(mask: &BinaryMask) -> PctResult<Self> {
        let raw = mask.to_u8();
        let mut e = ZlibEncoder::new(Vec::with_capacity(8), Compression::best());
        let bytes: Vec<u8> = raw.iter().copied().collect();
        e.write_all(&bytes)?;
        Ok(Self {
            buf: e.finish()?,
            sh: mask.shape(),
        })
    }

    /// 解压缩数据.
    pub fn decompress(&self) -> PctResult<Array3<bool>> {
        let (z, h, w) = self.sh;
        let mut d = ZlibDecoder::new(self.buf.as_slice());
        let mut buf = Vec::with_capacity(z * h * w);
        d.read_to_end(&mut buf)?;
        let data = Array3::from_shape_vec(self.sh, buf)?;
        Ok(data.mapv(is_foreground))
    }

    /// 压缩后的字节数.
    #[inline]
    pub fn compressed_len(&self) -> usize {
        self.buf.len()
    }

    /// 原始形状 `(z, H, W)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.sh
    }
}

/// 一次笔刷操作. 笔刷形状与形态学结构元一致: 3D 数据为球, 单切片数据为圆盘.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stroke {
    /// 将笔刷覆盖的体素设为前景.
    Paint {
        /// 笔刷中心.
        center: Idx3d,
        /// 笔刷半径 (体素).
        radius: f64,
    },

    /// 将笔刷覆盖的体素设为背景.
    Erase {
        /// 笔刷中心.
        center: Idx3d,
        /// 笔刷半径 (体素).
        radius: f64,
    },
}

impl Stroke {
    #[inline]
    fn parts(&self) -> (Idx3d, f64, bool) {
        match *self {
            Stroke::Paint { center, radius } => (center, radius, true),
            Stroke::Erase { center, radius } => (center, radius, false),
        }
    }
}

/// 带撤销/重做历史的掩码编辑器.
///
/// 每次产生实际修改的 `apply` 会把修改前的状态压入撤销栈, 并清空重做栈.
/// 撤销栈超出 `history_limit` 时丢弃最旧的记录.
#[derive(Debug)]
pub struct MaskEditor {
    current: BinaryMask,
    undo: VecDeque<CompactMask>,
    redo: Vec<CompactMask>,
    history_limit: usize,
}

impl MaskEditor {
    /// 默认保存的最大撤销步数.
    pub const DEFAULT_HISTORY_LIMIT: usize = 64;

    /// 以 `mask` 为初始状态创建编辑器.
    pub fn new(mask: BinaryMask) -> Self {
        Self::with_history_limit(mask, Self::DEFAULT_HISTORY_LIMIT)
    }

    /// 以 `mask` 为初始状态创建编辑器, 最多保存 `history_limit` 步撤销记录.
    pub fn with_history_limit(mask: BinaryMask, history_limit: usize) -> Self {
        Self {
            current: mask,
            undo: VecDeque::new(),
            redo: Vec::new(),
            history_limit,
        }
    }

    /// 应用一次笔刷, 返回值被修改的体素个数.
    ///
    /// 笔刷中心越界或半径不合法时返回错误, 且不修改任何状态.
    pub fn apply(&mut self, stroke: Stroke) -> PctResult<usize> {
        let (center, radius, value) = stroke.parts();
        check_radius(Stage::Editing, "radius", radius)?;
        let (z, h, w) = self.current.shape();
        if center.0 >= z || center.1 >= h || center.2 >= w {
            return Err(PctError::config(
                Stage::Editing,
                "center",
                center,
                "must lie inside the mask",
            ));
        }

        let shape = self.current.shape();
        let footprint = Footprint::new(radius, self.current.dims());
        let changed: Vec<Idx3d> = footprint
            .shifted(center, shape)
            .filter(|pos| self.current[*pos] != value)
            .collect();
        if changed.is_empty() {
            return Ok(0);
        }

        let snapshot = CompactMask::compress(&self.current)?;
        self.push_undo(snapshot);
        self.redo.clear();
        for pos in changed.iter() {
            self.current[*pos] = value;
        }
        log::debug!("stroke {stroke:?} changed {} voxels", changed.len());
        Ok(changed.len())
    }

    fn push_undo(&mut self, snapshot: CompactMask) {
        if self.history_limit == 0 {
            return;
        }
        if self.undo.len() == self.history_limit {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
    }

    /// 撤销最近一次修改. 没有可撤销的记录时返回 `false`.
    pub fn undo(&mut self) -> PctResult<bool> {
        let Some(prev) = self.undo.pop_back() else {
            return Ok(false);
        };
        let data = prev.decompress()?;
        self.redo.push(CompactMask::compress(&self.current)?);
        self.current = self.current.like(data);
        Ok(true)
    }

    /// 重做最近一次被撤销的修改. 没有可重做的记录时返回 `false`.
    pub fn redo(&mut self) -> PctResult<bool> {
        let Some(next) = self.redo.pop() else {
            return Ok(false);
        };
        let data = next.decompress()?;
        let snapshot = CompactMask::compress(&self.current)?;
        self.push_undo(snapshot);
        self.current = self.current.like(data);
        Ok(true)
    }

    /// 是否存在可撤销的记录?
    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// 是否存在可重做的记录?
    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// 当前掩码.
    #[inline]
    pub fn mask(&self) -> &BinaryMask {
        &self.current
    }

    /// 结束编辑, 取出当前掩码.
    #[inline]
    pub fn into_mask(self) -> BinaryMask {
        self.current
    }
}

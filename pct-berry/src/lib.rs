#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 将 PETRA (ZTE 类) MR 头部扫描转换为伪 CT (pseudo-CT) 体数据.
//!
//! 外部工具 (偏置场校正, 统计组织分割) 只在接口处出现: 本 crate 消费校正后的强度体数据和
//! 各组织类别的概率体数据, 产出以 HU 为单位的 `i16` 伪 CT.
//!
//! # 流程
//!
//! ```text
//! 概率体数据 --阈值--> 最大连通分量 --空洞填充--> 头部 / 颅骨掩码 ─┐
//!                                                                  ├─> HU 映射 -> 伪 CT
//! 强度体数据 --直方图峰值归一化----------------------------------─┘
//! ```
//!
//! ### 连通分量选择 ✅
//!
//! 6-邻接 (3D) / 4-邻接 (单切片 2D) 标记, 按体素数降序保留前 `k` 个.
//! 实现位于 `pct-berry/src/morph/components.rs`.
//!
//! ### 小空洞填充 (颅骨) ✅
//!
//! 先闭运算, 再按等效球半径区分噪声空洞和真实解剖腔 (鼻窦等).
//! 实现位于 `pct-berry/src/refine/small_holes.rs`.
//!
//! ### 全空洞填充 (头部) ✅
//!
//! 膨胀 -> 沿多个轴逐切片填洞 -> 腐蚀. 实现位于 `pct-berry/src/refine/full_holes.rs`.
//!
//! ### 直方图峰值归一化 ✅
//!
//! 软组织峰映射到 1.0. 实现位于 `pct-berry/src/histogram`.
//!
//! ### HU 映射 ✅
//!
//! 背景 / 软组织常数 / 颅骨线性映射, 后写优先. 实现位于 `pct-berry/src/hu.rs`.
//!
//! ### 小功能 ✅
//!
//! 1. nifti 读写, 切片 PNG 导出, 掩码 `.npy` 导出.
//! 2. 手动编辑掩码的撤销/重做历史 (压缩快照).
//! 3. JSON 配置文件 (需要 `serde` feature).
//!
//! # 注意
//!
//! 体数据统一按 `(z, H, W)` 访问. 2D 图像以 `(1, H, W)` 的单切片体数据表示,
//! 此时形态学算子自动改用圆盘结构元, 连通性退化为切片内 4-邻接.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 有符号三维偏移量, 结构元内部使用.
type Offset3d = (isize, isize, isize);

pub mod consts;

mod error;

pub use error::{PctError, PctResult, Stage};

/// 体数据, 掩码与伪 CT 的基础数据结构.
mod data;

pub use data::{
    BinaryMask, CompactMask, CtWindow, ImgWriteVis, MaskEditor, MaskSlice, MaskSliceMut,
    NiftiHeaderAttr, PseudoCt, PseudoCtSlice, Stroke, Volume,
};

pub mod morph;

pub mod refine;

pub mod histogram;

pub mod hu;

pub mod segment;

pub mod config;

pub mod pipeline;

pub mod prelude;

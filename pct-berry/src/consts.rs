//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 掩码持久化 (nifti / npy) 时, 背景的体素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 掩码持久化 (nifti / npy) 时, 前景的体素值.
    pub const MASK_FOREGROUND: u8 = 1;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 掩码体素值 -> 可视化灰度.
    #[inline]
    pub const fn pretty(p: bool) -> u8 {
        if p {
            WHITE
        } else {
            BLACK
        }
    }

    /// 持久化的体素值是否为前景? 非零即前景.
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        p != MASK_BACKGROUND
    }
}

/// HU 标定常数.
///
/// 这些常数由离线的 MR/CT 配对标定研究得到, 与同一修订版本发布的
/// "HU -> 质量密度" 查找表一一对应. 单独修改其中任何一个都会使下游的物理属性映射失效,
/// 因此新标定必须作为新的修订版本加入, 而不是原地修改.
pub mod calibration {
    /// 修订版本 1 的线性映射斜率, 即 `HU = slope * I + intercept` 中的 `slope`.
    pub const V1_SLOPE: f64 = -2929.6;

    /// 修订版本 1 的线性映射截距.
    pub const V1_INTERCEPT: f64 = 3274.9;

    /// 修订版本 1 的背景 (空气) HU 值.
    pub const V1_BACKGROUND_HU: f64 = -1000.0;

    /// 修订版本 1 的软组织 HU 值.
    pub const V1_SOFT_TISSUE_HU: f64 = 42.0;
}

/// 各阶段参数默认值.
pub mod defaults {
    /// 头部概率阈值.
    pub const HEAD_THRESHOLD: f32 = 0.5;

    /// 颅骨概率阈值.
    pub const SKULL_THRESHOLD: f32 = 0.5;

    /// 阈值化后保留的连通分量个数.
    pub const COMPONENT_COUNT: usize = 1;

    /// 颅骨小空洞填充前闭运算的结构元半径 (体素).
    pub const SKULL_CLOSE_RADIUS: f64 = 1.0;

    /// 颅骨中被视为噪声而填充的最大空洞等效球半径 (体素).
    pub const SKULL_MAX_HOLE_RADIUS: f64 = 60.0;

    /// 头部全空洞填充的膨胀/腐蚀半径 (体素).
    pub const HEAD_DILATION_SIZE: usize = 3;

    /// 头部全空洞填充的扫掠轴 (从 1 开始编号).
    pub const HEAD_SWEEP_AXES: [usize; 3] = [1, 2, 3];

    /// 直方图中保留的峰个数.
    pub const N_PEAKS: usize = 2;

    /// 直方图峰之间的最小间距 (强度单位).
    pub const MIN_PEAK_DISTANCE: f64 = 50.0;
}

/// 允许的直方图最大分箱数. 超出时认为强度体数据不是合理的 MR 强度范围.
pub const MAX_HISTOGRAM_BINS: usize = 1 << 24;

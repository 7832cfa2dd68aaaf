//! 运行时错误.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::refine::TissueClass;
use crate::Idx3d;

/// 伪 CT 流程的运行时结果.
pub type PctResult<T> = Result<T, PctError>;

/// 出错时所处的流程阶段.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Stage {
    /// 配置校验.
    Config,

    /// 外部分割 (概率体数据获取).
    Segmentation,

    /// 概率阈值化.
    Threshold,

    /// 连通分量选择.
    ComponentSelection,

    /// 小空洞填充.
    SmallHoleFill,

    /// 全空洞填充.
    FullHoleFill,

    /// 直方图峰值归一化.
    Histogram,

    /// HU 映射.
    HuMapping,

    /// 掩码手动编辑.
    Editing,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Config => "config",
            Stage::Segmentation => "segmentation",
            Stage::Threshold => "threshold",
            Stage::ComponentSelection => "component selection",
            Stage::SmallHoleFill => "small hole fill",
            Stage::FullHoleFill => "full hole fill",
            Stage::Histogram => "histogram normalization",
            Stage::HuMapping => "HU mapping",
            Stage::Editing => "mask editing",
        };
        f.write_str(s)
    }
}

/// 伪 CT 流程的错误类型.
///
/// 所有错误都携带足够的上下文 (阶段, 组织类别, 参数值), 以便调用方修正配置后重试.
/// 流程本身是确定性的, 不修改输入或参数的重试没有意义.
#[derive(Error, Debug)]
pub enum PctError {
    /// 参数不合法. 在任何计算开始前被拒绝, 从不静默截断.
    #[error("[{stage}] invalid parameter `{param}` = {value}: {reason}")]
    Configuration {
        /// 所处阶段.
        stage: Stage,
        /// 参数名.
        param: &'static str,
        /// 参数值的文本形式.
        value: String,
        /// 拒绝原因.
        reason: &'static str,
    },

    /// 概率体数据 / 掩码与参考体数据形状不一致.
    #[error("[{stage}] shape mismatch for {class}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// 所处阶段.
        stage: Stage,
        /// 出问题的数据 (组织类别或输入名).
        class: String,
        /// 参考形状 `(z, H, W)`.
        expected: Idx3d,
        /// 实际形状 `(z, H, W)`.
        found: Idx3d,
    },

    /// 直方图中找不到峰, 无法归一化. 调用方需要调整 `n_peaks` / `min_peak_distance`.
    #[error("[{}] no histogram peak found (n_peaks = {n_peaks}, min_peak_distance = {min_peak_distance})", Stage::Histogram)]
    PeakNotFound {
        /// 请求的峰个数.
        n_peaks: usize,
        /// 峰之间的最小间距.
        min_peak_distance: f64,
    },

    /// 被选中的峰位于非正强度处, 不能作为除数.
    #[error("[{}] selected peak intensity {intensity} is not positive", Stage::Histogram)]
    NonPositivePeak {
        /// 峰所在的强度.
        intensity: f64,
    },

    /// 颅骨掩码内存在非有限强度 (NaN / 无穷), 无法线性映射为 HU.
    #[error("[{}] {count} skull voxels have non-finite intensity", Stage::HuMapping)]
    NonFiniteIntensity {
        /// 颅骨掩码内非有限强度的体素个数.
        count: usize,
    },

    /// 精化后的掩码为空. 默认只作为告警记录, 由调用方决定是否升级为错误.
    #[error("refined {class} mask is empty")]
    EmptyMask {
        /// 组织类别.
        class: TissueClass,
    },

    /// 体数据维度不是 3.
    #[error("volume must be 3-dimensional, found {ndim} dimensions")]
    Dimensionality {
        /// 实际维度.
        ndim: usize,
    },

    /// nifti 读写错误.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// 数组形状错误.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// PNG 导出错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// `.npy` 导出错误.
    #[error(transparent)]
    Npy(#[from] ndarray_npy::WriteNpyError),

    /// 一般 I/O 错误 (包括压缩快照).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 配置文件 (反) 序列化错误.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PctError {
    /// 构造 `Configuration` 错误的便捷方法.
    pub(crate) fn config(
        stage: Stage,
        param: &'static str,
        value: impl std::fmt::Debug,
        reason: &'static str,
    ) -> Self {
        PctError::Configuration {
            stage,
            param,
            value: format!("{value:?}"),
            reason,
        }
    }

    /// 构造 `ShapeMismatch` 错误的便捷方法.
    pub(crate) fn shape(
        stage: Stage,
        class: impl Display,
        expected: Idx3d,
        found: Idx3d,
    ) -> Self {
        PctError::ShapeMismatch {
            stage,
            class: class.to_string(),
            expected,
            found,
        }
    }
}

/// 校验半径参数: 有限且非负.
pub(crate) fn check_radius(stage: Stage, param: &'static str, r: f64) -> PctResult<()> {
    if r.is_finite() && r >= 0.0 {
        Ok(())
    } else {
        Err(PctError::config(stage, param, r, "must be finite and >= 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let e = PctError::config(Stage::SmallHoleFill, "close_radius", -1.0, "must be >= 0");
        let msg = e.to_string();
        assert!(msg.contains("small hole fill"));
        assert!(msg.contains("close_radius"));
        assert!(msg.contains("-1.0"));

        let e = PctError::shape(Stage::Threshold, TissueClass::Skull, (1, 2, 3), (1, 2, 4));
        assert!(e.to_string().contains("skull"));
    }

    #[test]
    fn test_check_radius() {
        assert!(check_radius(Stage::Config, "r", 0.0).is_ok());
        assert!(check_radius(Stage::Config, "r", 2.5).is_ok());
        assert!(check_radius(Stage::Config, "r", -0.1).is_err());
        assert!(check_radius(Stage::Config, "r", f64::NAN).is_err());
        assert!(check_radius(Stage::Config, "r", f64::INFINITY).is_err());
    }
}

//! 流程参数. 所有参数都有默认值, 且都可以被覆盖.
//!
//! 打开 `serde` feature 后, [`PipelineConfig`] 可以从 JSON 文件读取, 或序列化为 JSON.
//! JSON 中缺失的字段使用默认值.

use crate::consts::defaults::*;
use crate::error::{check_radius, PctError, PctResult, Stage};
use crate::hu::Calibration;
use crate::refine::TissueClass;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个组织类别的阈值化与连通分量选择参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MaskConfig {
    /// 概率严格大于该值的体素为前景.
    pub threshold: f32,

    /// 阈值化后保留的最大连通分量个数.
    pub component_count: usize,
}

impl MaskConfig {
    /// 头部默认参数.
    pub const fn head() -> Self {
        Self {
            threshold: HEAD_THRESHOLD,
            component_count: COMPONENT_COUNT,
        }
    }

    /// 颅骨默认参数.
    pub const fn skull() -> Self {
        Self {
            threshold: SKULL_THRESHOLD,
            component_count: COMPONENT_COUNT,
        }
    }

    /// 校验参数.
    pub fn validate(&self, class: TissueClass) -> PctResult<()> {
        if !self.threshold.is_finite() {
            return Err(PctError::config(
                Stage::Threshold,
                class.threshold_param(),
                self.threshold,
                "must be finite",
            ));
        }
        if self.component_count == 0 {
            return Err(PctError::config(
                Stage::ComponentSelection,
                "component_count",
                self.component_count,
                "must be >= 1",
            ));
        }
        Ok(())
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self::head()
    }
}

/// 颅骨小空洞填充参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SmallHoleConfig {
    /// 闭运算结构元半径 (体素).
    pub close_radius: f64,

    /// 被填充空洞的最大等效球 (2D 为圆) 半径 (体素).
    pub max_hole_radius: f64,
}

impl Default for SmallHoleConfig {
    fn default() -> Self {
        Self {
            close_radius: SKULL_CLOSE_RADIUS,
            max_hole_radius: SKULL_MAX_HOLE_RADIUS,
        }
    }
}

impl SmallHoleConfig {
    /// 校验参数: 两个半径都必须有限且非负.
    pub fn validate(&self) -> PctResult<()> {
        check_radius(Stage::SmallHoleFill, "close_radius", self.close_radius)?;
        check_radius(Stage::SmallHoleFill, "max_hole_radius", self.max_hole_radius)
    }
}

/// 头部全空洞填充参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FullHoleConfig {
    /// 膨胀/腐蚀结构元半径 (体素).
    pub dilation_size: usize,

    /// 扫掠轴, 取值于 `{1, 2, 3}`, 对应 `(z, H, W)` 布局的第几个数组轴.
    pub sweep_axes: Vec<usize>,
}

impl Default for FullHoleConfig {
    fn default() -> Self {
        Self {
            dilation_size: HEAD_DILATION_SIZE,
            sweep_axes: HEAD_SWEEP_AXES.to_vec(),
        }
    }
}

impl FullHoleConfig {
    /// 校验参数: 扫掠轴非空, 且都在 `{1, 2, 3}` 中.
    pub fn validate(&self) -> PctResult<()> {
        validate_sweep_axes(&self.sweep_axes)
    }
}

/// 校验扫掠轴集合.
pub(crate) fn validate_sweep_axes(axes: &[usize]) -> PctResult<()> {
    if axes.is_empty() {
        return Err(PctError::config(
            Stage::FullHoleFill,
            "sweep_axes",
            axes,
            "must not be empty",
        ));
    }
    if axes.iter().any(|a| !(1..=3).contains(a)) {
        return Err(PctError::config(
            Stage::FullHoleFill,
            "sweep_axes",
            axes,
            "axes must be in {1, 2, 3}",
        ));
    }
    Ok(())
}

/// 直方图峰值归一化参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HistogramConfig {
    /// 保留的最高峰个数.
    pub n_peaks: usize,

    /// 峰之间的最小间距 (强度单位).
    pub min_peak_distance: f64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            n_peaks: N_PEAKS,
            min_peak_distance: MIN_PEAK_DISTANCE,
        }
    }
}

impl HistogramConfig {
    /// 校验参数.
    pub fn validate(&self) -> PctResult<()> {
        if self.n_peaks == 0 {
            return Err(PctError::config(
                Stage::Histogram,
                "n_peaks",
                self.n_peaks,
                "must be >= 1",
            ));
        }
        if !(self.min_peak_distance.is_finite() && self.min_peak_distance >= 0.0) {
            return Err(PctError::config(
                Stage::Histogram,
                "min_peak_distance",
                self.min_peak_distance,
                "must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// 诊断输出. 这些选项从不改变计算结果.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DiagnosticConfig {
    /// 若给出, 将直方图及其峰位置绘制为 PNG 并保存到该路径.
    pub histogram_plot: Option<PathBuf>,

    /// 精化后的掩码为空时返回 `EmptyMask` 错误, 而不仅仅是告警.
    pub fail_on_empty_mask: bool,
}

/// 完整的流程参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// 头部阈值化与连通分量选择.
    pub head: MaskConfig,

    /// 颅骨阈值化与连通分量选择.
    pub skull: MaskConfig,

    /// 颅骨小空洞填充.
    pub small_holes: SmallHoleConfig,

    /// 头部全空洞填充.
    pub full_holes: FullHoleConfig,

    /// 直方图峰值归一化.
    pub histogram: HistogramConfig,

    /// HU 标定常数.
    pub calibration: Calibration,

    /// 诊断输出.
    pub diagnostics: DiagnosticConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            head: MaskConfig::head(),
            skull: MaskConfig::skull(),
            small_holes: SmallHoleConfig::default(),
            full_holes: FullHoleConfig::default(),
            histogram: HistogramConfig::default(),
            calibration: Calibration::default(),
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// 校验所有参数. 任何计算开始前调用.
    pub fn validate(&self) -> PctResult<()> {
        self.head.validate(TissueClass::Head)?;
        self.skull.validate(TissueClass::Skull)?;
        self.small_holes.validate()?;
        self.full_holes.validate()?;
        self.histogram.validate()?;
        self.calibration.validate()
    }
}

#[cfg(feature = "serde")]
impl PipelineConfig {
    /// 从 JSON 文件读取参数并校验.
    pub fn from_json_file<P: AsRef<std::path::Path>>(path: P) -> PctResult<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 字符串读取参数并校验.
    pub fn from_json(json: &str) -> PctResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为格式化的 JSON 字符串.
    pub fn to_json_string(&self) -> PctResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = PipelineConfig::default();
        assert_eq!(c.head.threshold, 0.5);
        assert_eq!(c.skull.threshold, 0.5);
        assert_eq!(c.head.component_count, 1);
        assert_eq!(c.small_holes.close_radius, 1.0);
        assert_eq!(c.small_holes.max_hole_radius, 60.0);
        assert_eq!(c.full_holes.dilation_size, 3);
        assert_eq!(c.full_holes.sweep_axes, vec![1, 2, 3]);
        assert_eq!(c.histogram.n_peaks, 2);
        assert_eq!(c.histogram.min_peak_distance, 50.0);
        assert!(c.diagnostics.histogram_plot.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_invalid_parameters() {
        let mut c = PipelineConfig::default();
        c.small_holes.close_radius = -1.0;
        assert!(matches!(
            c.validate(),
            Err(PctError::Configuration { stage: Stage::SmallHoleFill, param: "close_radius", .. })
        ));

        let mut c = PipelineConfig::default();
        c.full_holes.sweep_axes = vec![];
        assert!(c.validate().is_err());
        c.full_holes.sweep_axes = vec![0, 1];
        assert!(c.validate().is_err());
        c.full_holes.sweep_axes = vec![4];
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.histogram.n_peaks = 0;
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.skull.threshold = f32::NAN;
        assert!(matches!(
            c.validate(),
            Err(PctError::Configuration { param: "skull_threshold", .. })
        ));

        let mut c = PipelineConfig::default();
        c.head.component_count = 0;
        assert!(c.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let mut c = PipelineConfig::default();
        c.small_holes.max_hole_radius = 12.5;
        c.full_holes.sweep_axes = vec![1, 3];
        let json = c.to_json_string().unwrap();
        assert_eq!(PipelineConfig::from_json(&json).unwrap(), c);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_partial_and_invalid() {
        let c = PipelineConfig::from_json(r#"{ "histogram": { "n_peaks": 3 } }"#).unwrap();
        assert_eq!(c.histogram.n_peaks, 3);
        assert_eq!(c.histogram.min_peak_distance, 50.0);
        assert_eq!(c.calibration, Calibration::v1());

        assert!(matches!(
            PipelineConfig::from_json(r#"{ "full_holes": { "sweep_axes": [] } }"#),
            Err(PctError::Configuration { .. })
        ));
        assert!(matches!(
            PipelineConfig::from_json(r#"{ "full_holes": { "dilation_size": -1 } }"#),
            Err(PctError::Json(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "head": { "threshold": 0.4 } }"#).unwrap();
        let c = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(c.head.threshold, 0.4);
        assert_eq!(c.head.component_count, 1);
    }
}

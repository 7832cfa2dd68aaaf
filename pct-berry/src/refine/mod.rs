//! 掩码精化流程.
//!
//! 对每个组织类别: 概率阈值化 -> 保留最大连通分量 -> 按类别选择空洞填充算法.
//! 头部使用全空洞填充, 颅骨使用小空洞填充. 两个类别相互独立,
//! 打开 `rayon` feature 时并行处理.

use crate::config::{FullHoleConfig, MaskConfig, PipelineConfig, SmallHoleConfig};
use crate::error::{PctError, PctResult, Stage};
use crate::morph;
use crate::segment::TissueProbabilities;
use crate::{BinaryMask, Volume};
use std::fmt::{Display, Formatter};

mod full_holes;
mod small_holes;

pub use full_holes::{fill_all_holes, fill_all_holes_with_stats};
pub use small_holes::{fill_small_holes, fill_small_holes_with_stats, SmallHoleStats};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 需要精化掩码的组织类别.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TissueClass {
    /// 整个头部 (软组织 + 骨).
    Head,

    /// 颅骨.
    Skull,
}

impl TissueClass {
    /// 对应的阈值参数名.
    pub(crate) const fn threshold_param(self) -> &'static str {
        match self {
            TissueClass::Head => "head_threshold",
            TissueClass::Skull => "skull_threshold",
        }
    }
}

impl Display for TissueClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TissueClass::Head => f.write_str("head"),
            TissueClass::Skull => f.write_str("skull"),
        }
    }
}

/// 空洞填充阶段的统计信息.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HoleReport {
    /// 全空洞填充: 每个扫掠轴 `(轴, 新增体素个数)`.
    Full(Vec<(usize, usize)>),

    /// 小空洞填充.
    Small(SmallHoleStats),
}

/// 单个组织类别的精化报告.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassReport {
    /// 组织类别.
    pub class: TissueClass,

    /// 阈值化后的前景体素个数.
    pub thresholded: usize,

    /// 阈值化后的连通分量个数.
    pub components: usize,

    /// 保留的连通分量个数.
    pub kept: usize,

    /// 连通分量选择后的前景体素个数.
    pub selected: usize,

    /// 空洞填充后 (最终) 的前景体素个数.
    pub refined: usize,

    /// 空洞填充统计.
    pub holes: HoleReport,
}

impl ClassReport {
    /// 被丢弃的连通分量个数.
    #[inline]
    pub fn discarded_components(&self) -> usize {
        self.components - self.kept
    }

    /// 最终掩码是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.refined == 0
    }
}

/// 两个组织类别的精化报告.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefineReport {
    /// 头部.
    pub head: ClassReport,

    /// 颅骨.
    pub skull: ClassReport,
}

impl RefineReport {
    /// 最终掩码为空的类别.
    pub fn empty_classes(&self) -> Vec<TissueClass> {
        [&self.head, &self.skull]
            .into_iter()
            .filter(|r| r.is_empty())
            .map(|r| r.class)
            .collect()
    }
}

/// 精化后的头部与颅骨掩码. 形状与输入概率体数据一致.
#[derive(Debug, Clone)]
pub struct RefinedMasks {
    /// 头部掩码.
    pub head: BinaryMask,

    /// 颅骨掩码.
    pub skull: BinaryMask,

    /// 精化报告.
    pub report: RefineReport,
}

impl RefinedMasks {
    /// 若任一掩码为空, 返回 `EmptyMask` 错误. 空掩码默认只作为告警.
    pub fn check_non_empty(&self) -> PctResult<()> {
        match self.report.empty_classes().first() {
            Some(&class) => Err(PctError::EmptyMask { class }),
            None => Ok(()),
        }
    }
}

/// 掩码精化器.
#[derive(Clone, Debug)]
pub struct MaskRefiner {
    head: MaskConfig,
    skull: MaskConfig,
    small_holes: SmallHoleConfig,
    full_holes: FullHoleConfig,
}

impl Default for MaskRefiner {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl MaskRefiner {
    /// 从流程参数中提取精化相关参数.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            head: config.head.clone(),
            skull: config.skull.clone(),
            small_holes: config.small_holes.clone(),
            full_holes: config.full_holes.clone(),
        }
    }

    /// 校验参数.
    pub fn validate(&self) -> PctResult<()> {
        self.head.validate(TissueClass::Head)?;
        self.skull.validate(TissueClass::Skull)?;
        self.small_holes.validate()?;
        self.full_holes.validate()
    }

    /// 精化头部与颅骨掩码.
    ///
    /// 两个概率体数据的形状必须与 `reference` 一致, 否则返回 `ShapeMismatch`.
    /// 精化后为空的掩码只会被记录为告警, 并体现在报告中.
    pub fn refine(&self, probs: &TissueProbabilities, reference: &Volume) -> PctResult<RefinedMasks> {
        self.validate()?;
        let shape = reference.shape();
        probs
            .head
            .ensure_shape(shape, Stage::Segmentation, TissueClass::Head)?;
        probs
            .skull
            .ensure_shape(shape, Stage::Segmentation, TissueClass::Skull)?;

        let run_head = || self.refine_class(TissueClass::Head, &probs.head);
        let run_skull = || self.refine_class(TissueClass::Skull, &probs.skull);
        #[cfg(feature = "rayon")]
        let (head, skull) = rayon::join(run_head, run_skull);
        #[cfg(not(feature = "rayon"))]
        let (head, skull) = (run_head(), run_skull());
        let (head, head_report) = head?;
        let (skull, skull_report) = skull?;

        let report = RefineReport {
            head: head_report,
            skull: skull_report,
        };
        for class in report.empty_classes() {
            log::warn!("refined {class} mask is empty");
        }
        Ok(RefinedMasks {
            head,
            skull,
            report,
        })
    }

    /// 精化单个组织类别的掩码.
    pub fn refine_class(
        &self,
        class: TissueClass,
        prob: &Volume,
    ) -> PctResult<(BinaryMask, ClassReport)> {
        let config = match class {
            TissueClass::Head => &self.head,
            TissueClass::Skull => &self.skull,
        };
        config.validate(class)?;

        let raw = prob.threshold(config.threshold);
        let components = morph::label_components(raw.data());
        let selected = raw.like(components.largest(config.component_count));
        log::debug!(
            "{class}: {} voxels above {}, {} components, kept {} voxels",
            raw.count(),
            config.threshold,
            components.len(),
            selected.count()
        );

        let (refined, holes) = match class {
            TissueClass::Head => {
                let FullHoleConfig {
                    dilation_size,
                    sweep_axes,
                } = &self.full_holes;
                let (m, swept) = fill_all_holes_with_stats(&selected, *dilation_size, sweep_axes)?;
                (m, HoleReport::Full(swept))
            }
            TissueClass::Skull => {
                let SmallHoleConfig {
                    close_radius,
                    max_hole_radius,
                } = self.small_holes;
                let (m, stats) =
                    fill_small_holes_with_stats(&selected, close_radius, max_hole_radius)?;
                (m, HoleReport::Small(stats))
            }
        };

        let report = ClassReport {
            class,
            thresholded: raw.count(),
            components: components.len(),
            kept: config.component_count.min(components.len()),
            selected: selected.count(),
            refined: refined.count(),
            holes,
        };
        log::info!("{class} mask refined: {} voxels", report.refined);
        Ok((refined, report))
    }
}

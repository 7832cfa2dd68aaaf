//! 强度 -> HU 映射.
//!
//! 逐体素分类, 后写优先:
//!
//! 1. 所有体素先置为背景 HU;
//! 2. 头部掩码内的体素置为软组织 HU;
//! 3. 颅骨掩码内的体素置为 `slope * I + intercept`.
//!
//! 结果四舍五入 (远离零) 后饱和转换为 `i16`. 不做任何混合或插值.

use crate::consts::calibration::*;
use crate::error::{PctError, PctResult, Stage};
use crate::{BinaryMask, NiftiHeaderAttr, PseudoCt, Volume};
use ndarray::{Array3, Zip};
use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 标定常数的修订版本.
///
/// 每个修订版本都与一张 "HU -> 质量密度" 查找表绑定, 输出伪 CT 时需要一并报告.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CalibrationRevision {
    /// 第一版 MR/CT 配对标定.
    V1,

    /// 由调用方给出的常数, 不对应任何已发布的查找表.
    Custom,
}

impl Display for CalibrationRevision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationRevision::V1 => f.write_str("v1"),
            CalibrationRevision::Custom => f.write_str("custom"),
        }
    }
}

/// HU 映射的标定常数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    /// 修订版本.
    pub revision: CalibrationRevision,

    /// 颅骨体素 `HU = slope * I + intercept` 中的斜率.
    pub slope: f64,

    /// 颅骨体素线性映射的截距.
    pub intercept: f64,

    /// 背景 (空气) HU.
    pub background_hu: f64,

    /// 软组织 HU.
    pub soft_tissue_hu: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::v1()
    }
}

impl Calibration {
    /// 修订版本 1: 斜率 -2929.6, 截距 3274.9, 背景 -1000, 软组织 42.
    pub const fn v1() -> Self {
        Self {
            revision: CalibrationRevision::V1,
            slope: V1_SLOPE,
            intercept: V1_INTERCEPT,
            background_hu: V1_BACKGROUND_HU,
            soft_tissue_hu: V1_SOFT_TISSUE_HU,
        }
    }

    /// 由调用方给出的常数.
    pub const fn custom(slope: f64, intercept: f64, background_hu: f64, soft_tissue_hu: f64) -> Self {
        Self {
            revision: CalibrationRevision::Custom,
            slope,
            intercept,
            background_hu,
            soft_tissue_hu,
        }
    }

    /// 所有常数必须是有限值.
    pub fn validate(&self) -> PctResult<()> {
        let fields = [
            ("slope", self.slope),
            ("intercept", self.intercept),
            ("background_hu", self.background_hu),
            ("soft_tissue_hu", self.soft_tissue_hu),
        ];
        for (param, value) in fields {
            if !value.is_finite() {
                return Err(PctError::config(
                    Stage::HuMapping,
                    param,
                    value,
                    "must be finite",
                ));
            }
        }
        Ok(())
    }

    /// 颅骨体素的 HU.
    #[inline]
    pub fn skull_hu(&self, intensity: f32) -> i16 {
        to_hu(self.slope * intensity as f64 + self.intercept)
    }
}

/// 四舍五入 (远离零) 并饱和转换到 `i16`. NaN 映射为 0.
#[inline]
pub fn to_hu(value: f64) -> i16 {
    // `as` 对浮点到整数的转换是饱和的.
    value.round() as i16
}

/// 将归一化强度体数据映射为伪 CT. 输出沿用 `normalized` 的 header.
///
/// 三者形状必须一致, 否则返回 `ShapeMismatch`. 颅骨掩码内的强度必须是有限值,
/// 否则返回 `NonFiniteIntensity`; 掩码外的非有限强度不参与计算.
pub fn map_to_hu(
    normalized: &Volume,
    head: &BinaryMask,
    skull: &BinaryMask,
    calibration: &Calibration,
) -> PctResult<PseudoCt> {
    calibration.validate()?;
    let shape = normalized.shape();
    head.ensure_shape(shape, Stage::HuMapping, "head mask")?;
    skull.ensure_shape(shape, Stage::HuMapping, "skull mask")?;
    let non_finite = Zip::from(normalized.data())
        .and(skull.data())
        .fold(0usize, |acc, v, &s| acc + (s && !v.is_finite()) as usize);
    if non_finite > 0 {
        return Err(PctError::NonFiniteIntensity { count: non_finite });
    }

    let background = to_hu(calibration.background_hu);
    let soft_tissue = to_hu(calibration.soft_tissue_hu);
    let mut out = Array3::<i16>::zeros(shape);
    let zip = Zip::from(&mut out)
        .and(normalized.data())
        .and(head.data())
        .and(skull.data());
    let op = |hu: &mut i16, &intensity: &f32, &in_head: &bool, &in_skull: &bool| {
        *hu = if in_skull {
            calibration.skull_hu(intensity)
        } else if in_head {
            soft_tissue
        } else {
            background
        };
    };
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            zip.par_for_each(op);
        } else {
            zip.for_each(op);
        }
    }

    log::info!(
        "mapped to HU with calibration {} ({} skull, {} soft tissue voxels)",
        calibration.revision,
        skull.count(),
        Zip::from(head.data())
            .and(skull.data())
            .fold(0usize, |acc, &h, &s| acc + (h && !s) as usize)
    );
    Ok(PseudoCt::with_header(normalized.header(), out))
}

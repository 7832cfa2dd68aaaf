//! 完整的伪 CT 转换流程.
//!
//! 分割 -> 掩码精化 -> 直方图峰值归一化 -> HU 映射. 偏置场校正在进入本流程之前完成,
//! 输入的强度体数据应当已经校正.

use crate::config::PipelineConfig;
use crate::error::PctResult;
use crate::histogram::{normalize_by_histogram_peak, Normalized, Peak};
use crate::hu::{map_to_hu, CalibrationRevision};
use crate::refine::{MaskRefiner, RefinedMasks};
use crate::segment::SegmentationProvider;
use crate::{PseudoCt, Volume};

/// 一次转换的结果.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// 伪 CT.
    pub pseudo_ct: PseudoCt,

    /// 精化后的掩码及报告.
    pub masks: RefinedMasks,

    /// 归一化除数. 跳过归一化时为 `1.0`.
    pub divisor: f64,

    /// 归一化时保留的直方图峰. 跳过归一化时为空.
    pub peaks: Vec<Peak>,

    /// 使用的标定修订版本, 决定下游使用哪一张 "HU -> 质量密度" 查找表.
    pub revision: CalibrationRevision,
}

/// 伪 CT 转换流程.
///
/// 参数在构造时校验一次; 之后的每次转换互不影响, 可以对多个体数据重复调用.
pub struct PseudoCtPipeline<S> {
    config: PipelineConfig,
    refiner: MaskRefiner,
    provider: S,
}

impl<S: SegmentationProvider> PseudoCtPipeline<S> {
    /// 校验参数并构造流程.
    pub fn new(config: PipelineConfig, provider: S) -> PctResult<Self> {
        config.validate()?;
        Ok(Self {
            refiner: MaskRefiner::from_config(&config),
            config,
            provider,
        })
    }

    /// 流程参数.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 分割协作者.
    #[inline]
    pub fn provider(&self) -> &S {
        &self.provider
    }

    /// 直方图峰值归一化.
    pub fn normalize(&self, intensity: &Volume) -> PctResult<Normalized> {
        let hist = &self.config.histogram;
        normalize_by_histogram_peak(
            intensity,
            hist.n_peaks,
            hist.min_peak_distance,
            self.config.diagnostics.histogram_plot.as_deref(),
        )
    }

    /// 分割并精化头部与颅骨掩码.
    ///
    /// 开启 `fail_on_empty_mask` 时, 空掩码返回 `EmptyMask` 错误.
    pub fn refine_masks(&self, intensity: &Volume) -> PctResult<RefinedMasks> {
        let probs = self.provider.segment(intensity)?;
        let masks = self.refiner.refine(&probs, intensity)?;
        if self.config.diagnostics.fail_on_empty_mask {
            masks.check_non_empty()?;
        }
        Ok(masks)
    }

    /// 完整转换. 分割使用原始强度, HU 映射使用归一化后的强度.
    pub fn convert(&self, intensity: &Volume) -> PctResult<Conversion> {
        let masks = self.refine_masks(intensity)?;
        let Normalized {
            volume,
            divisor,
            peaks,
        } = self.normalize(intensity)?;
        self.finish(&volume, masks, divisor, peaks)
    }

    /// 跳过归一化, `normalized` 直接作为 HU 映射的输入 (同时也用于分割).
    pub fn convert_normalized(&self, normalized: &Volume) -> PctResult<Conversion> {
        let masks = self.refine_masks(normalized)?;
        self.finish(normalized, masks, 1.0, vec![])
    }

    fn finish(
        &self,
        normalized: &Volume,
        masks: RefinedMasks,
        divisor: f64,
        peaks: Vec<Peak>,
    ) -> PctResult<Conversion> {
        let calibration = &self.config.calibration;
        let pseudo_ct = map_to_hu(normalized, &masks.head, &masks.skull, calibration)?;
        Ok(Conversion {
            pseudo_ct,
            masks,
            divisor,
            peaks,
            revision: calibration.revision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::TissueProbabilities;
    use crate::{PctError, Stage};
    use ndarray::Array3;

    fn uniform(v: &Volume) -> PctResult<TissueProbabilities> {
        Ok(TissueProbabilities {
            head: v.like(v.data().mapv(|_| 1.0)),
            skull: v.like(v.data().mapv(|_| 0.0)),
        })
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let mut config = PipelineConfig::default();
        config.full_holes.sweep_axes = vec![];
        assert!(matches!(
            PseudoCtPipeline::new(config, uniform),
            Err(PctError::Configuration {
                stage: Stage::FullHoleFill,
                param: "sweep_axes",
                ..
            })
        ));
    }

    #[test]
    fn test_fail_on_empty_mask() {
        let v = Volume::from_array(Array3::from_elem((6, 6, 6), 1.0));
        let pipeline = PseudoCtPipeline::new(PipelineConfig::default(), uniform).unwrap();
        let out = pipeline.convert_normalized(&v).unwrap();
        assert_eq!(out.pseudo_ct.count(42), 216);
        assert_eq!(out.divisor, 1.0);
        assert_eq!(out.revision, CalibrationRevision::V1);

        let mut config = PipelineConfig::default();
        config.diagnostics.fail_on_empty_mask = true;
        let pipeline = PseudoCtPipeline::new(config, uniform).unwrap();
        assert!(matches!(
            pipeline.convert_normalized(&v),
            Err(PctError::EmptyMask { .. })
        ));
    }

    #[test]
    fn test_provider_error_propagates() {
        let failing = |_: &Volume| -> PctResult<TissueProbabilities> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "segmentation failed").into())
        };
        let pipeline = PseudoCtPipeline::new(PipelineConfig::default(), failing).unwrap();
        let v = Volume::from_array(Array3::zeros((2, 2, 2)));
        assert!(matches!(pipeline.convert(&v), Err(PctError::Io(_))));
    }
}

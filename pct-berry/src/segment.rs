//! 外部组织分割的接口.
//!
//! 统计分割模型本身不在本 crate 中实现. 流程只通过 [`SegmentationProvider`]
//! 获取每个组织类别的概率体数据.

use crate::error::{PctResult, Stage};
use crate::refine::TissueClass;
use crate::Volume;
use ndarray::Zip;
use std::path::{Path, PathBuf};

/// 分割方法. 目前只支持调用外部工具.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SegmentationMethod {
    /// 外部统计分割工具 (以子进程或预先计算的文件提供结果).
    #[default]
    External,
}

/// 精化流程需要的两类概率体数据. 取值范围 `[0, 1]`, 不强制检查.
#[derive(Debug, Clone)]
pub struct TissueProbabilities {
    /// 头部 (任意非空气组织) 概率.
    pub head: Volume,

    /// 颅骨 (骨) 概率.
    pub skull: Volume,
}

impl TissueProbabilities {
    /// 由骨与软组织概率组合: 头部概率为两者之和 (截断到 `[0, 1]`), 颅骨概率即骨概率.
    pub fn from_classes(bone: Volume, soft_tissue: Volume) -> PctResult<Self> {
        soft_tissue.ensure_shape(bone.shape(), Stage::Segmentation, "soft tissue probability")?;
        let head = Zip::from(bone.data())
            .and(soft_tissue.data())
            .map_collect(|&b, &s| (b + s).clamp(0.0, 1.0));
        Ok(Self {
            head: bone.like(head),
            skull: bone,
        })
    }

    /// 获取某组织类别的概率.
    #[inline]
    pub fn get(&self, class: TissueClass) -> &Volume {
        match class {
            TissueClass::Head => &self.head,
            TissueClass::Skull => &self.skull,
        }
    }
}

/// 组织分割协作者.
pub trait SegmentationProvider {
    /// 分割方法.
    fn method(&self) -> SegmentationMethod {
        SegmentationMethod::External
    }

    /// 对偏置场校正后的强度体数据进行分割, 返回各组织类别的概率体数据.
    fn segment(&self, intensity: &Volume) -> PctResult<TissueProbabilities>;
}

impl<F> SegmentationProvider for F
where
    F: Fn(&Volume) -> PctResult<TissueProbabilities>,
{
    fn segment(&self, intensity: &Volume) -> PctResult<TissueProbabilities> {
        self(intensity)
    }
}

/// 从外部分割工具预先写出的 nii 概率图中读取结果.
#[derive(Debug, Clone)]
pub struct NiftiProbabilityProvider {
    bone: PathBuf,
    soft_tissue: PathBuf,
}

impl NiftiProbabilityProvider {
    /// 骨概率图的默认文件名.
    pub const BONE_FILE: &'static str = "bone.nii.gz";

    /// 软组织概率图的默认文件名.
    pub const SOFT_TISSUE_FILE: &'static str = "soft_tissue.nii.gz";

    /// 指定两个概率图文件.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(bone: P, soft_tissue: Q) -> Self {
        Self {
            bone: bone.as_ref().to_path_buf(),
            soft_tissue: soft_tissue.as_ref().to_path_buf(),
        }
    }

    /// 使用 `dir` 目录下的默认文件名.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(Self::BONE_FILE), dir.join(Self::SOFT_TISSUE_FILE))
    }
}

impl SegmentationProvider for NiftiProbabilityProvider {
    fn segment(&self, intensity: &Volume) -> PctResult<TissueProbabilities> {
        log::info!(
            "loading probabilities from {} and {}",
            self.bone.display(),
            self.soft_tissue.display()
        );
        let bone = Volume::open(&self.bone)?;
        bone.ensure_shape(intensity.shape(), Stage::Segmentation, "bone probability")?;
        let soft_tissue = Volume::open(&self.soft_tissue)?;
        TissueProbabilities::from_classes(bone, soft_tissue)
    }
}

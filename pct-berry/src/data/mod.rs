use std::ops::{Index, IndexMut};
use std::path::Path;

use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis, Ix3, Zip};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::gray::*;
use crate::error::{PctError, PctResult, Stage};
use crate::morph::{self, Dimensionality};
use crate::Idx3d;

mod edit;
pub mod slice;
pub mod window;

pub use edit::{CompactMask, MaskEditor, Stroke};
pub use slice::{ImgWriteVis, MaskSlice, MaskSliceMut, PseudoCtSlice};
pub use window::CtWindow;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 为合成数据构造一个 header. 体素分辨率按 `(z, H, W)` 给出, 单位为毫米.
fn synthetic_header((z, h, w): Idx3d, [pz, ph, pw]: [f32; 3]) -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    header.dim = [3, w as u16, h as u16, z as u16, 1, 1, 1, 1];
    header.pixdim = [1.0, pw, ph, pz, 0.0, 0.0, 0.0, 0.0];
    header.intent_name[..4].copy_from_slice(b"fake");
    header
}

/// 读取 nifti 文件, 并将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
///
/// 允许第四维长度为 1 的体数据 (部分分割工具会这样保存概率图).
fn read_nifti_f32(path: &Path) -> PctResult<(BoxedHeader, Array3<f32>)> {
    let obj = ReaderOptions::new().read_file(path)?;
    let header = Box::new(obj.header().clone());

    let data = obj.into_volume().into_ndarray::<f32>()?;
    let data = if data.ndim() == 4 && data.shape()[3] == 1 {
        data.index_axis_move(Axis(3), 0)
    } else {
        data
    };
    let ndim = data.ndim();
    let data = data
        .into_dimensionality::<Ix3>()
        .map_err(|_| PctError::Dimensionality { ndim })?;

    // [W, H, z] -> [z, H, W].
    // hint: 原第一维向下增长, 原第二维向右增长.
    let data = data.permuted_axes([2, 1, 0]).as_standard_layout().into_owned();
    Ok((header, data))
}

/// 3D nii 文件 header 的共用属性和部分通用操作.
///
/// header 仅作为元数据原样传递, 核心算法从不解释其中的空间信息.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }
}

/// 为三类体数据生成共用的 header 访问、索引和形状方法.
macro_rules! impl_volume_common {
    ($($volume: ty => $elem: ty),+) => {
        $(
            impl NiftiHeaderAttr for $volume {
                #[inline]
                fn header(&self) -> &NiftiHeader {
                    &self.header
                }
            }

            impl Index<Idx3d> for $volume {
                type Output = $elem;

                #[inline]
                fn index(&self, index: Idx3d) -> &Self::Output {
                    &self.data[index]
                }
            }

            impl IndexMut<Idx3d> for $volume {
                #[inline]
                fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
                    &mut self.data[index]
                }
            }

            impl $volume {
                /// 数据形状 `(z, H, W)`.
                #[inline]
                pub fn shape(&self) -> Idx3d {
                    self.data.dim()
                }

                /// 体素个数.
                #[inline]
                pub fn size(&self) -> usize {
                    self.data.len()
                }

                /// 数据的原生维度. 单切片数据被视为 2D.
                #[inline]
                pub fn dims(&self) -> Dimensionality {
                    Dimensionality::of(self.shape())
                }

                /// 获得数据的一份不可变 shallow copy.
                #[inline]
                pub fn data(&self) -> ArrayView3<'_, $elem> {
                    self.data.view()
                }

                /// 获得数据的一份可变 shallow copy.
                #[inline]
                pub fn data_mut(&mut self) -> ArrayViewMut3<'_, $elem> {
                    self.data.view_mut()
                }

                /// 若 `self` 与参考形状 `expected` 不一致, 返回 `ShapeMismatch`.
                pub fn ensure_shape(
                    &self,
                    expected: Idx3d,
                    stage: Stage,
                    what: impl std::fmt::Display,
                ) -> PctResult<()> {
                    if self.shape() == expected {
                        Ok(())
                    } else {
                        Err(PctError::shape(stage, what, expected, self.shape()))
                    }
                }
            }
        )+
    };
}

/// nii 格式 3D 强度体数据 (例如偏置场校正后的 PETRA 扫描, 或某个组织类别的概率图).
/// 体素值以 `f32` 保存.
#[derive(Debug, Clone)]
pub struct Volume {
    header: BoxedHeader,
    data: Array3<f32>,
}

impl Volume {
    /// 打开 nii 文件格式的 3D 体数据. `path` 为 nii 文件的本地路径.
    pub fn open<P: AsRef<Path>>(path: P) -> PctResult<Self> {
        let (header, data) = read_nifti_f32(path.as_ref())?;
        Ok(Self { header, data })
    }

    /// 以各向同性 1mm 分辨率直接从 `(z, H, W)` 数组创建体数据.
    pub fn from_array(data: Array3<f32>) -> Self {
        let header = synthetic_header(data.dim(), [1.0; 3]);
        Self { header, data }
    }

    /// 以给定 header 创建体数据. header 中的形状信息不被使用.
    pub fn with_header(header: &NiftiHeader, data: Array3<f32>) -> Self {
        Self {
            header: Box::new(header.clone()),
            data,
        }
    }

    /// 共享 `self` 的 header 创建一个新的体数据.
    #[inline]
    pub fn like(&self, data: Array3<f32>) -> Self {
        Self {
            header: self.header.clone(),
            data,
        }
    }

    /// 逐体素阈值化: 严格大于 `threshold` 的体素为前景. NaN 被视为背景.
    pub fn threshold(&self, threshold: f32) -> BinaryMask {
        BinaryMask {
            header: self.header.clone(),
            data: self.data.mapv(|p| p > threshold),
        }
    }

    /// 有限体素值的 `(最小值, 最大值)`. 若不存在有限值则返回 `None`.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// 以 `self` 的 header 为参考, 保存为 nii 文件.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PctResult<()> {
        WriterOptions::new(path.as_ref())
            .reference_header(&self.header)
            .write_nifti(&self.data.view().permuted_axes([2, 1, 0]))?;
        Ok(())
    }
}

/// 3D 二值掩码, 代表每个体素是否属于某组织类别.
///
/// 不变量: 形状与阈值化前的源体数据一致.
#[derive(Debug, Clone)]
pub struct BinaryMask {
    header: BoxedHeader,
    data: Array3<bool>,
}

impl BinaryMask {
    /// 打开 nii 文件格式的 3D 掩码. 非零体素为前景.
    pub fn open<P: AsRef<Path>>(path: P) -> PctResult<Self> {
        let (header, data) = read_nifti_f32(path.as_ref())?;
        Ok(Self {
            header,
            data: data.mapv(|p| p != 0.0 && !p.is_nan()),
        })
    }

    /// 以各向同性 1mm 分辨率直接从 `(z, H, W)` 数组创建掩码.
    pub fn from_array(data: Array3<bool>) -> Self {
        let header = synthetic_header(data.dim(), [1.0; 3]);
        Self { header, data }
    }

    /// 以给定 header 创建掩码.
    pub fn with_header(header: &NiftiHeader, data: Array3<bool>) -> Self {
        Self {
            header: Box::new(header.clone()),
            data,
        }
    }

    /// 共享 `self` 的 header 创建一个新的掩码.
    #[inline]
    pub fn like(&self, data: Array3<bool>) -> Self {
        Self {
            header: self.header.clone(),
            data,
        }
    }

    /// 前景体素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|p| **p).count()
    }

    /// 掩码是否为全背景?
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|p| *p)
    }

    /// 前景的实际体积, 以立方毫米为单位.
    #[inline]
    pub fn volume_mm3(&self) -> f64 {
        self.count() as f64 * self.voxel()
    }

    /// 按原生维度的面邻接规则统计前景连通分量个数.
    pub fn component_count(&self) -> usize {
        morph::label_components(self.data()).len()
    }

    /// 逐体素 `self OR other`. 两者形状必须一致.
    pub fn union(&self, other: &BinaryMask) -> PctResult<BinaryMask> {
        self.zip_with(other, |a, b| a || b)
    }

    /// 逐体素 `self AND other`. 两者形状必须一致.
    pub fn intersection(&self, other: &BinaryMask) -> PctResult<BinaryMask> {
        self.zip_with(other, |a, b| a && b)
    }

    /// 逐体素 `self AND NOT other`. 两者形状必须一致.
    pub fn difference(&self, other: &BinaryMask) -> PctResult<BinaryMask> {
        self.zip_with(other, |a, b| a && !b)
    }

    /// `self` 是否是 `other` 的子集? 形状不一致时返回 `false`.
    pub fn is_subset_of(&self, other: &BinaryMask) -> bool {
        self.shape() == other.shape()
            && Zip::from(&self.data)
                .and(&other.data)
                .all(|&a, &b| !a || b)
    }

    fn zip_with(&self, other: &BinaryMask, op: fn(bool, bool) -> bool) -> PctResult<BinaryMask> {
        other.ensure_shape(self.shape(), Stage::Editing, "mask operand")?;
        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|&a, &b| op(a, b));
        Ok(self.like(data))
    }

    /// 获取 3D 掩码 z 空间的第 `z_index` 层不可变切片.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> MaskSlice<'_> {
        MaskSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 转为持久化使用的 `u8` 数组 (`MASK_BACKGROUND` / `MASK_FOREGROUND`).
    pub fn to_u8(&self) -> Array3<u8> {
        self.data
            .mapv(|p| if p { MASK_FOREGROUND } else { MASK_BACKGROUND })
    }

    /// 以 `self` 的 header 为参考, 以 `u8` 体素保存为 nii 文件.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PctResult<()> {
        let raw = self.to_u8();
        WriterOptions::new(path.as_ref())
            .reference_header(&self.header)
            .write_nifti(&raw.view().permuted_axes([2, 1, 0]))?;
        Ok(())
    }

    /// 以 `(z, H, W)` 顺序的 `u8` 数组保存为 `.npy` 文件, 便于外部检查.
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> PctResult<()> {
        ndarray_npy::write_npy(path, &self.to_u8())?;
        Ok(())
    }
}

/// 伪 CT 体数据, 体素值为 HU, 以 `i16` 保存 (标准 CT 值存储范围).
#[derive(Debug, Clone)]
pub struct PseudoCt {
    header: BoxedHeader,
    data: Array3<i16>,
}

impl PseudoCt {
    /// 以给定 header 创建伪 CT.
    pub fn with_header(header: &NiftiHeader, data: Array3<i16>) -> Self {
        Self {
            header: Box::new(header.clone()),
            data,
        }
    }

    /// 获取 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> PseudoCtSlice<'_> {
        PseudoCtSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 统计 HU 值为 `hu` 的体素个数.
    #[inline]
    pub fn count(&self, hu: i16) -> usize {
        self.data.iter().filter(|p| **p == hu).count()
    }

    /// 以 `self` 的 header 为参考, 保存为 nii 文件.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> PctResult<()> {
        WriterOptions::new(path.as_ref())
            .reference_header(&self.header)
            .write_nifti(&self.data.view().permuted_axes([2, 1, 0]))?;
        Ok(())
    }
}

impl_volume_common!(Volume => f32, BinaryMask => bool, PseudoCt => i16);

//! 切片的持久化存储.

use super::core::{MaskSlice, MaskSliceMut, PseudoCtSlice};
use crate::consts::gray::pretty;
use crate::CtWindow;
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好" 的方式保存, 而不是 "as is"
/// 的方式. 这意味着, 对于 `MaskSlice`, `MaskSliceMut` 这类仅存在前景/背景的图像,
/// 在保存时会映射为白色/黑色; 对于以 HU 值存储的 `PseudoCtSlice`,
/// 在保存时会用骨窗规范化.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

macro_rules! impl_mask_vis {
    ($($slice: ty),+) => {
        $(
            /// 会将前景/背景像素分别映射为白色/黑色.
            impl ImgWriteVis for $slice {
                fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    let (height, width) = self.shape();
                    let mut buf = image::GrayImage::new(width as u32, height as u32);
                    for ((h, w), &pix) in self.indexed_iter() {
                        buf.put_pixel(w as u32, h as u32, image::Luma([pretty(pix)]));
                    }
                    buf.save(path)
                }
            }
        )+
    };
}

impl_mask_vis!(MaskSlice<'_>, MaskSliceMut<'_>);

/// 骨窗 (窗位 400, 窗宽 1800).
impl ImgWriteVis for PseudoCtSlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        const WINDOW: CtWindow = CtWindow::from_bone_visual();
        for ((h, w), &hu) in self.indexed_iter() {
            // i16 总是有限值.
            let gray = WINDOW.eval(hu as f32).unwrap_or(0);
            buf.put_pixel(w as u32, h as u32, image::Luma([gray]));
        }
        buf.save(path)
    }
}

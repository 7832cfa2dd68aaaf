//! 掩码 / 伪 CT 二维切片对象的操作.

mod core;
mod iter;
mod save;

pub use core::{MaskSlice, MaskSliceMut, PseudoCtSlice};

pub use save::ImgWriteVis;

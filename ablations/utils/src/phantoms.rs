//! 消融实验使用的合成头部掩码.
//!
//! 每个体模都给出 "带空洞的输入" 与 "填充完成后应得到的实心掩码".

use pct_berry::morph::phantom;
use pct_berry::BinaryMask;

/// 一个体模用例.
pub struct Case {
    /// 用例名.
    pub name: &'static str,

    /// 带空洞的输入掩码.
    pub input: BinaryMask,

    /// 期望的实心掩码.
    pub solid: BinaryMask,
}

/// 球壳, 内部空腔完全封闭.
pub fn closed_shell(side: usize) -> Case {
    let c = side / 2;
    let r = side as f64 * 0.4;
    let shape = (side, side, side);
    Case {
        name: "closed shell",
        input: BinaryMask::from_array(phantom::hollow_ball(shape, (c, c, c), r, r * 0.6)),
        solid: BinaryMask::from_array(phantom::ball(shape, (c, c, c), r)),
    }
}

/// 球壳, 沿 W 方向开一条 1 体素宽的通道通向外部.
pub fn channeled_shell(side: usize) -> Case {
    let mut case = closed_shell(side);
    let c = side / 2;
    let r = side as f64 * 0.4;
    for w in 0..c.saturating_sub((r * 0.6) as usize) {
        case.input[(c, c, w)] = false;
    }
    case.name = "channeled shell";
    case
}

/// 沿 z 贯通的管, 两端开口. 管腔只在水平切片中是空洞.
pub fn open_tube(side: usize) -> Case {
    let c = side / 2;
    let r = side as f64 * 0.4;
    let shape = (side, side, side);
    let mut solid = phantom::tube_z(shape, (c, c), r, 0.0);
    for z in 0..side {
        solid[(z, c, c)] = true;
    }
    Case {
        name: "open tube",
        input: BinaryMask::from_array(phantom::tube_z(shape, (c, c), r, r * 0.5)),
        solid: BinaryMask::from_array(solid),
    }
}

/// 全部用例.
pub fn all(side: usize) -> Vec<Case> {
    vec![closed_shell(side), channeled_shell(side), open_tube(side)]
}

/// CT 窗口, 包含窗位 (window level) 和窗宽 (window width).
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug)]
pub struct CtWindow {
    level: f32,
    width: f32,
}

impl CtWindow {
    /// 构建 CT 窗.
    ///
    /// `level` 和 `width` 必须在合理范围内, 否则返回 `None`.
    pub fn new(level: f32, width: f32) -> Option<CtWindow> {
        if (-1e5..=1e5).contains(&level) && 0.0 < width && width <= 1e5 {
            Some(Self { level, width })
        } else {
            None
        }
    }

    /// 构建一个便于展示伪 CT 颅骨结构的骨窗. 该窗口的窗位为 400, 窗宽为 1800.
    #[inline]
    pub const fn from_bone_visual() -> CtWindow {
        Self {
            level: 400.0,
            width: 1800.0,
        }
    }

    /// 构建一个便于展示头部软组织的脑窗. 该窗口的窗位为 40, 窗宽为 80.
    #[inline]
    pub const fn from_head_visual() -> CtWindow {
        Self {
            level: 40.0,
            width: 80.0,
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.level - self.width / 2.0
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.level + self.width / 2.0
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// 求在当前 CT 窗设置下, `ct` HU 值对应的灰度图像素整数值 (0 <= value <= 255)
    ///
    /// 如果 `ct` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, ct: f32) -> Option<u8> {
        if !ct.is_finite() {
            return None;
        }
        let lb = self.lower_bound();
        if ct <= lb {
            Some(u8::MIN)
        } else if ct >= self.upper_bound() {
            Some(u8::MAX)
        } else {
            // 255, not 256.
            Some((((ct - lb) / self.width()) * 255.0) as u8)
        }
    }
}

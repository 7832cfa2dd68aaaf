//! 直方图峰值归一化.
//!
//! 在 PETRA 强度直方图上定位软组织峰, 并整体缩放强度使该峰落在 1.0 处.
//!
//! 1. 以宽度为 1 的整数分箱统计有限强度值, 分箱边界为 `floor(min) ..= ceil(max) + 1`;
//! 2. 丢弃最低强度的分箱 (背景);
//! 3. 寻找局部极大值, 按高度降序施加最小间距约束, 保留至多 `n_peaks` 个最高峰;
//! 4. 除数取保留峰中 **强度最大** 者 (而非最高者) 所在分箱的左边界.

use crate::config::HistogramConfig;
use crate::consts::MAX_HISTOGRAM_BINS;
use crate::error::{PctError, PctResult, Stage};
use crate::Volume;
use num::ToPrimitive;
use std::cmp::Reverse;
use std::path::Path;

mod plot;

pub use plot::plot_histogram;

/// 宽度为 1 的整数分箱直方图. 第 `i` 个分箱覆盖 `[lo + i, lo + i + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityHistogram {
    lo: i64,
    counts: Vec<u64>,
}

impl IntensityHistogram {
    /// 统计 `volume` 中所有有限强度值. 没有有限值时返回空直方图.
    ///
    /// 分箱数超过 [`MAX_HISTOGRAM_BINS`] 时返回 `Configuration` 错误.
    pub fn from_volume(volume: &Volume) -> PctResult<Self> {
        let Some((min, max)) = volume.finite_range() else {
            return Ok(Self::from_counts(0, vec![]));
        };
        let bounds = min
            .floor()
            .to_i64()
            .zip(max.ceil().to_i64())
            .and_then(|(lo, hi)| Some((lo, hi.checked_add(1)?.checked_sub(lo)?.to_usize()?)));
        let (lo, n_bins) = match bounds {
            Some((lo, n)) if n <= MAX_HISTOGRAM_BINS => (lo, n),
            _ => {
                return Err(PctError::config(
                    Stage::Histogram,
                    "intensity_range",
                    (min, max),
                    "too many unit-width bins",
                ))
            }
        };

        let mut counts = vec![0u64; n_bins];
        for v in volume.data().iter().filter(|v| v.is_finite()) {
            let bin = (v.floor() as i64 - lo) as usize;
            counts[bin] += 1;
        }
        Ok(Self { lo, counts })
    }

    /// 直接由分箱计数构造. 第 `0` 个分箱的左边界为 `lo`.
    pub fn from_counts(lo: i64, counts: Vec<u64>) -> Self {
        Self { lo, counts }
    }

    /// 第一个分箱的左边界.
    #[inline]
    pub fn lo(&self) -> i64 {
        self.lo
    }

    /// 分箱计数.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// 分箱个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// 是否没有任何分箱?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// 第 `bin` 个分箱的左边界.
    #[inline]
    pub fn left_edge(&self, bin: usize) -> f64 {
        (self.lo + bin as i64) as f64
    }

    /// 丢弃第一个分箱后寻找峰, 返回至多 `n_peaks` 个最高峰, 按高度降序排列
    /// (高度相同时强度较低者在前).
    ///
    /// 剩余直方图两端之外视为计数 0, 因此剩余部分的首尾分箱也可以是峰.
    pub fn find_peaks(&self, n_peaks: usize, min_peak_distance: f64) -> Vec<Peak> {
        if self.counts.len() < 2 {
            return vec![];
        }
        // 下标 `i` 与完整直方图的第 `i` 个分箱对齐, 第 0 个分箱被 0 取代.
        let mut padded = Vec::with_capacity(self.counts.len() + 1);
        padded.push(0);
        padded.extend_from_slice(&self.counts[1..]);
        padded.push(0);

        let maxima = local_maxima(&padded);
        let keep = select_by_distance(&maxima, &padded, min_peak_distance);

        let mut peaks: Vec<Peak> = maxima
            .iter()
            .zip(keep)
            .filter(|(_, k)| *k)
            .map(|(&bin, _)| Peak {
                bin,
                intensity: self.left_edge(bin),
                height: padded[bin],
            })
            .collect();
        peaks.sort_by_key(|p| (Reverse(p.height), p.bin));
        peaks.truncate(n_peaks);
        peaks
    }
}

/// 直方图中的一个峰.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Peak {
    /// 分箱下标 (相对于完整直方图).
    pub bin: usize,

    /// 分箱左边界, 即峰所在的强度.
    pub intensity: f64,

    /// 分箱计数.
    pub height: u64,
}

/// 严格局部极大值. 平台 (连续相等的值) 取其中点, 首尾两个样本永远不是峰.
fn local_maxima(x: &[u64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }
    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < i_max && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// 按高度从高到低处理每个仍保留的峰, 删除与它距离小于 `ceil(distance)` 的其他峰.
///
/// `peaks` 必须升序. 返回与 `peaks` 对应的保留标记.
fn select_by_distance(peaks: &[usize], x: &[u64], distance: f64) -> Vec<bool> {
    let mut keep = vec![true; peaks.len()];
    let distance = distance.ceil();
    if distance <= 1.0 {
        return keep;
    }
    let distance = distance as usize;

    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by_key(|&j| (Reverse(x[peaks[j]]), j));
    for j in order {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }
    keep
}

/// 归一化结果.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// 归一化后的强度体数据, 沿用输入的 header.
    pub volume: Volume,

    /// 除数, 即被映射到 1.0 的强度.
    pub divisor: f64,

    /// 保留的峰, 按高度降序排列.
    pub peaks: Vec<Peak>,
}

/// 以直方图峰值归一化强度体数据.
///
/// 若给出 `plot`, 同时将直方图与峰位置绘制为 PNG 保存到该路径. 绘图失败只记录告警,
/// 不影响归一化结果.
///
/// # 错误
///
/// - 参数不合法时返回 `Configuration`;
/// - 找不到峰时返回 `PeakNotFound`;
/// - 被选中的峰强度不为正数时返回 `NonPositivePeak`.
pub fn normalize_by_histogram_peak(
    volume: &Volume,
    n_peaks: usize,
    min_peak_distance: f64,
    plot: Option<&Path>,
) -> PctResult<Normalized> {
    HistogramConfig {
        n_peaks,
        min_peak_distance,
    }
    .validate()?;

    let hist = IntensityHistogram::from_volume(volume)?;
    let peaks = hist.find_peaks(n_peaks, min_peak_distance);
    if let Some(path) = plot {
        if let Err(e) = plot_histogram(&hist, &peaks, path) {
            log::warn!("failed to write histogram plot to {}: {e}", path.display());
        }
    }

    let Some(divisor) = peaks.iter().map(|p| p.intensity).reduce(f64::max) else {
        return Err(PctError::PeakNotFound {
            n_peaks,
            min_peak_distance,
        });
    };
    if peaks.len() < n_peaks {
        log::warn!("only {} of {n_peaks} histogram peaks found", peaks.len());
    }
    if divisor <= 0.0 {
        return Err(PctError::NonPositivePeak { intensity: divisor });
    }
    log::info!(
        "histogram peaks at {:?}, divisor {divisor}",
        peaks.iter().map(|p| p.intensity).collect::<Vec<_>>()
    );

    let data = volume.data().mapv(|v| (v as f64 / divisor) as f32);
    Ok(Normalized {
        volume: volume.like(data),
        divisor,
        peaks,
    })
}

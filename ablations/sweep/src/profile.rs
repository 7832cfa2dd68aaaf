//! 算法运行统计.

use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时.
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 累计时间 (微秒).
    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 单个扫掠轴子集的统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 体模用例个数.
    cases: u64,

    /// 填充的总体素个数 (相对于输入).
    filled: u64,

    /// 应被填充却未被填充的体素个数.
    missed: u64,

    /// 不应属于掩码却被填充的体素个数.
    spurious: u64,

    /// 填充算法本身的耗时.
    fill_time: AccTimer,

    /// 最耗时的一次填充.
    most: Option<Duration>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            cases: 0,
            filled: 0,
            missed: 0,
            spurious: 0,
            fill_time: AccTimer::new(),
            most: None,
        }
    }

    /// 开始一次填充计时.
    #[inline]
    pub fn case_start(&mut self) {
        self.cases += 1;
        self.fill_time.start();
    }

    /// 结束一次填充计时.
    #[inline]
    pub fn case_elapsed(&mut self) {
        let d = self.fill_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
    }

    /// 记录一次填充结果.
    #[inline]
    pub fn count(&mut self, filled: usize, missed: usize, spurious: usize) {
        self.filled += filled as u64;
        self.missed += missed as u64;
        self.spurious += spurious as u64;
    }

    /// 用例个数.
    #[inline]
    pub fn get_cases(&self) -> u64 {
        self.cases
    }

    /// 填充的总体素个数.
    #[inline]
    pub fn get_filled(&self) -> u64 {
        self.filled
    }

    /// 漏填的总体素个数.
    #[inline]
    pub fn get_missed(&self) -> u64 {
        self.missed
    }

    /// 多填的总体素个数.
    #[inline]
    pub fn get_spurious(&self) -> u64 {
        self.spurious
    }

    /// 填充总耗时 (微秒).
    #[inline]
    pub fn get_fill_time_us(&self) -> u64 {
        self.fill_time.total_us()
    }

    /// 平均每个用例的耗时 (微秒).
    #[inline]
    pub fn get_avg_fill_time_us(&self) -> Option<f64> {
        match self.cases {
            0 => None,
            n => Some(self.get_fill_time_us() as f64 / n as f64),
        }
    }

    /// 最耗时的一次填充. 没有用例时返回 `None`.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

//! 消融实验依赖的通用组件.

use std::env;
use std::path::PathBuf;

pub mod phantoms;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 获取实验输出目录.
///
/// 1. 若环境变量 `$PCT_ABLATION_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/pct-ablations`;
/// 3. 无法确定 home 目录时返回 `None`.
pub fn output_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var("PCT_ABLATION_DIR") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => dirs::home_dir().map(|h| h.join("pct-ablations")),
    }
}

//! 全空洞填充扫掠轴消融实验.
//!
//! 比较不同扫掠轴子集在合成头部体模上的填充效果与耗时.

mod profile;
mod result;
mod runner;

fn main() {
    simple_logger::init_with_level(log::Level::Info).expect("logger initialization error");
    runner::run().analyze();
}

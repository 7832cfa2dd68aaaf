//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use pct_berry::refine::fill_all_holes;
use pct_berry::{BinaryMask, ImgWriteVis};
use std::path::Path;
use std::thread;
use utils::phantoms::{self, Case};

/// 参与比较的扫掠轴子集.
const AXIS_SUBSETS: [&[usize]; 5] = [&[1], &[2], &[3], &[1, 2], &[1, 2, 3]];

/// 体模边长.
const SIDE: usize = 48;

/// 膨胀/腐蚀半径.
const DILATION: usize = 2;

fn sweep(cases: &[Case], axes: &'static [usize], out_dir: Option<&Path>) -> Profile {
    let mut profile = Profile::new();
    for case in cases {
        log::info!("{}: sweeping axes {axes:?}...", case.name);
        profile.case_start();
        let filled = fill_all_holes(&case.input, DILATION, axes).expect("invalid sweep axes");
        profile.case_elapsed();

        let count = |a: &BinaryMask, b: &BinaryMask| a.difference(b).map_or(0, |d| d.count());
        profile.count(
            count(&filled, &case.input),
            count(&case.solid, &filled),
            count(&filled, &case.solid),
        );

        if let Some(dir) = out_dir {
            let name = format!("{}-{axes:?}.png", case.name.replace(' ', "_"));
            if let Err(e) = filled.slice_at(SIDE / 2).save(dir.join(&name)) {
                log::warn!("failed to save {name}: {e}");
            }
        }
    }
    profile
}

/// 实际运行.
pub fn run() -> AblationResult {
    let cases = phantoms::all(SIDE);
    let out_dir = utils::output_dir_from_env_or_home()
        .filter(|d| std::fs::create_dir_all(d).is_ok());
    if let Some(d) = &out_dir {
        log::info!("Writing middle slices to {}", d.display());
    }

    log::info!("Running ablation studies ({} cpus)...", utils::cpus());
    thread::scope(|s| {
        let (cases, out_dir) = (&cases, out_dir.as_deref());
        let handles = AXIS_SUBSETS.map(|axes| s.spawn(move || sweep(cases, axes, out_dir)));

        AXIS_SUBSETS
            .into_iter()
            .zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            )
            .collect()
    })
}

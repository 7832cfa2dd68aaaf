//! 实验结果.

use crate::profile::Profile;
use std::io::{self, Write};

/// 将 `p` 的结果写进 `w` 中.
fn describe_into<W: Write>(axes: &[usize], p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.3}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Sweep axes {axes:?}:")?;
    writeln!(w, "{S4}Cases: {}", p.get_cases())?;
    writeln!(w, "{S4}Filled voxels: {}", p.get_filled())?;
    writeln!(w, "{S4}Missed voxels: {}", p.get_missed())?;
    writeln!(w, "{S4}Spurious voxels: {}", p.get_spurious())?;
    writeln!(w, "{S4}Total fill time: {} us", p.get_fill_time_us())?;
    writeln!(
        w,
        "{S4}Average fill time: {} us",
        f64_to_display(p.get_avg_fill_time_us())
    )?;
    let t = p.get_most_time_consuming().map(|d| d.as_micros() as f64);
    write!(w, "{S4}Most time-consuming case costs {} us", f64_to_display(t))?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static [usize], Profile)>,
}

impl FromIterator<(&'static [usize], Profile)> for AblationResult {
    fn from_iter<I: IntoIterator<Item = (&'static [usize], Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }
}

impl AblationResult {
    /// 输出运行结果.
    pub fn analyze(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for (axes, profile) in self.data.iter() {
            let written = utils::sep_to(&mut out)
                .and_then(|_| describe_into(axes, profile, &mut out))
                .and_then(|_| writeln!(out));
            if let Err(e) = written {
                log::error!("failed to write result: {e}");
                return;
            }
        }
        utils::sep();
    }
}

//! 直方图可视化.

use super::{IntensityHistogram, Peak};
use crate::error::PctResult;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use std::path::Path;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 400;
const MARGIN: f32 = 20.0;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BAR: Rgb<u8> = Rgb([64, 64, 64]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const PEAK: Rgb<u8> = Rgb([220, 30, 30]);

/// 将直方图绘制为 PNG, 被选中的峰以红色竖线 (位于柱形之后) 标出.
///
/// 第一个 (背景) 分箱不参与纵轴缩放, 否则其余分箱几乎不可见.
pub fn plot_histogram<P: AsRef<Path>>(
    hist: &IntensityHistogram,
    peaks: &[Peak],
    path: P,
) -> PctResult<()> {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let (w, h) = (WIDTH as f32 - 2.0 * MARGIN, HEIGHT as f32 - 2.0 * MARGIN);
    let base = HEIGHT as f32 - MARGIN;

    let n = hist.len().max(1) as f32;
    let x_of = |bin: usize| MARGIN + (bin as f32 + 0.5) / n * w;
    let y_max = hist.counts().iter().skip(1).copied().max().unwrap_or(0).max(1) as f32;

    for p in peaks {
        let x = x_of(p.bin);
        draw_line_segment_mut(&mut img, (x, base), (x, MARGIN), PEAK);
    }
    for (bin, &c) in hist.counts().iter().enumerate().skip(1) {
        let top = base - (c as f32 / y_max).min(1.0) * h;
        let x = x_of(bin);
        draw_line_segment_mut(&mut img, (x, base), (x, top), BAR);
    }
    draw_line_segment_mut(&mut img, (MARGIN, base), (MARGIN + w, base), AXIS);
    draw_line_segment_mut(&mut img, (MARGIN, base), (MARGIN, MARGIN), AXIS);

    img.save(path)?;
    log::debug!("histogram plot: {} bins, {} peaks", hist.len(), peaks.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_marks_peaks() {
        let mut counts = vec![0u64; 400];
        counts[0] = 100_000;
        counts[100] = 50;
        counts[300] = 20;
        let hist = IntensityHistogram::from_counts(0, counts);
        let peaks = hist.find_peaks(2, 10.0);
        assert_eq!(peaks.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hist.png");
        plot_histogram(&hist, &peaks, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        assert!(img.pixels().any(|p| *p == PEAK));
        assert!(img.pixels().any(|p| *p == BAR));
    }

    #[test]
    fn test_plot_empty_histogram() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        plot_histogram(&IntensityHistogram::from_counts(0, vec![]), &[], &path).unwrap();
        assert!(path.is_file());
    }
}

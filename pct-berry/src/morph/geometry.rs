//! 半径与等效球体积 / 圆面积之间的换算.

use super::Dimensionality;
use std::f64::consts::PI;

/// 半径 `r` 对应的度量: 3D 为球体积 `4/3·π·r³`, 2D 为圆面积 `π·r²`.
#[inline]
pub fn radius_to_measure(r: f64, dims: Dimensionality) -> f64 {
    match dims {
        Dimensionality::Two => PI * r * r,
        Dimensionality::Three => 4.0 / 3.0 * PI * r.powi(3),
    }
}

/// [`radius_to_measure`] 的逆运算.
#[inline]
pub fn measure_to_radius(measure: f64, dims: Dimensionality) -> f64 {
    match dims {
        Dimensionality::Two => (measure / PI).sqrt(),
        Dimensionality::Three => (measure * 3.0 / (4.0 * PI)).cbrt(),
    }
}

//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::{PctError, PctResult, Stage};

pub use crate::data::{
    BinaryMask, CompactMask, CtWindow, ImgWriteVis, MaskEditor, MaskSlice, MaskSliceMut,
    NiftiHeaderAttr, PseudoCt, PseudoCtSlice, Stroke, Volume,
};

pub use crate::config::{
    DiagnosticConfig, FullHoleConfig, HistogramConfig, MaskConfig, PipelineConfig,
    SmallHoleConfig,
};

pub use crate::morph::{
    fill_holes, measure_to_radius, radius_to_measure, select_largest_components, Dimensionality,
    Footprint,
};

pub use crate::refine::{
    fill_all_holes, fill_small_holes, MaskRefiner, RefineReport, RefinedMasks, TissueClass,
};

pub use crate::histogram::{normalize_by_histogram_peak, IntensityHistogram, Normalized, Peak};

pub use crate::hu::{map_to_hu, Calibration, CalibrationRevision};

pub use crate::segment::{
    NiftiProbabilityProvider, SegmentationMethod, SegmentationProvider, TissueProbabilities,
};

pub use crate::pipeline::{Conversion, PseudoCtPipeline};

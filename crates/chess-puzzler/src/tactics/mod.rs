/// Tactical detectors. Each inspects a played solution line and reports
/// evidence for one theme; the classifier weighs the results.

pub mod attacks;
pub mod line_geometry;
pub mod material;
pub mod mate_patterns;
pub mod positional;
pub mod simple;

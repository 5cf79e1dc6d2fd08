pub mod charts;
pub mod filters;
pub mod heatmap;
pub mod popup;

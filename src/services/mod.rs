pub mod chart_service;
pub mod export_service;
pub mod glyph_service;
pub mod scale_service;
pub mod summary_service;

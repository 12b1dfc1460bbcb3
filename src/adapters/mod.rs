//! Concrete adapter implementations for ports.

pub mod fs_store_adapter;
pub mod file_config_adapter;
pub mod svg_chart;
pub mod text_view_adapter;
pub mod html_view_adapter;

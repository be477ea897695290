//! Dashboard output.
//!
//! - **SVG**: one standalone chart per panel
//! - **HTML**: the full page with sidebar and chart grid
//! - **JSON**: computed chart data for downstream tools

mod charts;
mod common;
mod html;
mod json;
mod palette;
mod svg;

pub use charts::{render_panel_svg, write_panel_svg};
pub use common::NO_DATA_NOTICE;
pub use html::{HtmlOptions, render_dashboard_html, write_dashboard_html};
pub use json::{dashboard_to_json, write_dashboard_json};
pub use palette::{ColorScale, SEVERITY, sequential};

/// Output rendering for the inflow tools.
///
/// Submodules:
/// - `markdown`: tables shown to the user.
/// - `charts`: ECharts option objects for the front end.

pub mod charts;
pub mod markdown;

use serde_json::Value;

/// Returned instead of a table when no station reported any data.
pub const NO_DATA_SENTINEL: &str = "没有找到有效数据";

/// Wraps a titled table and its chart option in the delimiter tags the host
/// front end splits on.
pub fn wrap_output(title: &str, table: &str, chart: &Value) -> String {
    format!(
        "<text>### {}\n\n{}</text>\n<display>{}</display>",
        title, table, chart
    )
}

//! Centralized default values for the dashboard.
//!
//! Fallbacks used when neither the command line nor a configuration file
//! provides a value.

// ============================================================================
// Filter Defaults
// ============================================================================

/// Whether the series pattern is restricted to tables that discriminate
/// controllers from samples. Tables without that distinction then ignore the
/// pattern entirely.
pub const DEFAULT_FILTERS_ONLY_SAMPLE_SERIES: bool = true;

/// Whether controller-discriminating tables hide non-controller rows.
pub const DEFAULT_SHOW_CONTROLLERS_ONLY: bool = false;

// ============================================================================
// Report Defaults
// ============================================================================

pub const DEFAULT_REPORT_TITLE: &str = "Load Test Dashboard";

/// Title of the requests summary pie chart.
pub const SUMMARY_CHART_TITLE: &str = "Requests Summary";

/// Slice colors of the requests summary, as CSS colors.
pub const FAIL_COLOR: &str = "#FF6347";
pub const PASS_COLOR: &str = "#9ACD32";

/// Decimals kept when labelling a pie slice with its percentage.
pub const SLICE_PERCENT_DECIMALS: u32 = 2;

// ============================================================================
// Configuration Files
// ============================================================================

/// Directory below the user configuration directory holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "loadtest-dashboard";

/// Per-project configuration file, searched from the current directory upwards.
pub const PROJECT_CONFIG_FILE_NAME: &str = ".loadtestdashboard";

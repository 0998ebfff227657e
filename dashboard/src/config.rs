use config::{Config, ConfigError, File, FileFormat};
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::defaults::{self, CONFIG_DIR_NAME, PROJECT_CONFIG_FILE_NAME};
use crate::filter::FilterState;

/// User-wide config file: `$XDG_CONFIG_HOME/loadtest-dashboard/config.toml`,
/// falling back to `~/.config/loadtest-dashboard/config.toml`.
pub fn system_config_path() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Some(
                Path::new(&xdg_config_home)
                    .join(CONFIG_DIR_NAME)
                    .join("config.toml"),
            );
        }
    }
    dirs_next::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join("config.toml")
    })
}

/// Nearest project config file, searching `start` and its ancestors.
pub fn find_project_config_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

pub fn find_project_config() -> Option<PathBuf> {
    let current_dir = env::current_dir().ok()?;
    find_project_config_from(&current_dir)
}

/// Layer the given files, later ones overriding earlier ones. Missing files
/// are skipped.
pub fn read_config_from(
    system: Option<&Path>,
    project: Option<&Path>,
) -> Result<Config, ConfigError> {
    let mut builder = Config::builder();
    for path in [system, project].into_iter().flatten() {
        builder = builder.add_source(
            File::from(path.to_path_buf())
                .format(FileFormat::Toml)
                .required(false),
        );
    }
    builder.build()
}

/// Read hierarchical configuration (user config -> project override)
pub fn read_hierarchical_config() -> Result<Config, ConfigError> {
    read_config_from(
        system_config_path().as_deref(),
        find_project_config().as_deref(),
    )
}

/// Typed view of the configuration keys the dashboard understands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardConfig {
    pub title: Option<String>,
    pub template: Option<PathBuf>,
    pub custom_css: Option<PathBuf>,
    pub series_pattern: Option<String>,
    pub filters_only_sample_series: Option<bool>,
    pub show_controllers_only: Option<bool>,
}

impl DashboardConfig {
    pub fn from_config(config: &Config) -> DashboardConfig {
        DashboardConfig {
            title: config.get_string("report.title").ok(),
            template: config.get_string("report.template").ok().map(PathBuf::from),
            custom_css: config
                .get_string("report.custom_css")
                .ok()
                .map(PathBuf::from),
            series_pattern: config.get_string("filter.series_pattern").ok(),
            filters_only_sample_series: config.get_bool("filter.filters_only_sample_series").ok(),
            show_controllers_only: config.get_bool("filter.show_controllers_only").ok(),
        }
    }

    /// Effective configuration. Unreadable files are logged and ignored.
    pub fn load() -> DashboardConfig {
        match read_hierarchical_config() {
            Ok(config) => DashboardConfig::from_config(&config),
            Err(e) => {
                log::debug!("Ignoring configuration: {}", e);
                DashboardConfig::default()
            }
        }
    }

    /// Filter toggles from config, defaults where unset.
    pub fn filter_state(&self) -> FilterState {
        FilterState {
            series_pattern: self.series_pattern.clone().unwrap_or_default(),
            filters_only_sample_series: self
                .filters_only_sample_series
                .unwrap_or(defaults::DEFAULT_FILTERS_ONLY_SAMPLE_SERIES),
            show_controllers_only: self
                .show_controllers_only
                .unwrap_or(defaults::DEFAULT_SHOW_CONTROLLERS_ONLY),
        }
    }
}

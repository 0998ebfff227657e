use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::Level;

use crate::config::{find_project_config, system_config_path, DashboardConfig};
use crate::filter::FilterState;
use crate::reporting::{check, report, ReportTemplateConfig};
use dashboard_cli_types::{Cli, CliFilter, Commands};

pub fn handle_calls() -> Result<()> {
    let cli = Cli::parse();
    let logger_level = match cli.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(logger_level.as_str())).init();

    match cli.command {
        Commands::Report {
            input,
            output,
            filter,
            table,
            title,
            template,
            custom_css,
        } => {
            let config = DashboardConfig::load();
            report(
                &input.input,
                &output,
                resolve_filter_state(&filter, &config),
                &table,
                resolve_template_config(title, template, custom_css, &config),
            )
        }
        Commands::Check { input } => check(&input.input),
        Commands::Config {} => show_config_info(),
    }
}

/// Command line flags win over config, config over built-in defaults.
fn resolve_filter_state(cli: &CliFilter, config: &DashboardConfig) -> FilterState {
    let mut filter_state = config.filter_state();
    if let Some(pattern) = &cli.series_filter {
        filter_state.set_series_pattern(pattern.as_str());
    }
    if cli.controllers_only {
        filter_state.set_show_controllers_only(true);
    }
    if cli.filter_all_series {
        filter_state.set_filters_only_sample_series(false);
    }
    filter_state
}

fn resolve_template_config(
    title: Option<String>,
    template: Option<PathBuf>,
    custom_css: Option<PathBuf>,
    config: &DashboardConfig,
) -> ReportTemplateConfig {
    ReportTemplateConfig {
        template_path: template.or_else(|| config.template.clone()),
        custom_css_path: custom_css.or_else(|| config.custom_css.clone()),
        title: title.or_else(|| config.title.clone()),
    }
}

fn describe_path(label: &str, path: Option<PathBuf>) {
    match path {
        Some(path) if path.is_file() => println!("{}: {} (exists)", label, path.display()),
        Some(path) => println!("{}: {} (not found)", label, path.display()),
        None => println!("{}: none", label),
    }
}

/// Show where configuration is read from and the effective values
fn show_config_info() -> Result<()> {
    println!("Load Test Dashboard Configuration");
    println!("=================================");

    describe_path("User config", system_config_path());
    describe_path("Project config", find_project_config());

    match crate::config::read_hierarchical_config() {
        Ok(config) => {
            let config = DashboardConfig::from_config(&config);
            let filter_state = config.filter_state();
            println!("\nEffective values");
            println!(
                "  report.title: {}",
                config.title.as_deref().unwrap_or(crate::defaults::DEFAULT_REPORT_TITLE)
            );
            if let Some(template) = &config.template {
                println!("  report.template: {}", template.display());
            }
            if let Some(css) = &config.custom_css {
                println!("  report.custom_css: {}", css.display());
            }
            println!("  filter.series_pattern: '{}'", filter_state.series_pattern);
            println!(
                "  filter.filters_only_sample_series: {}",
                filter_state.filters_only_sample_series
            );
            println!(
                "  filter.show_controllers_only: {}",
                filter_state.show_controllers_only
            );
        }
        Err(e) => {
            println!("\nConfiguration: Error loading - {}", e);
        }
    }

    Ok(())
}

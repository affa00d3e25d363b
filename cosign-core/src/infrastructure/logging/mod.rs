//! Logging via the `log` facade and `log4rs`.

mod consts;

pub use consts::*;

use crate::foundation::{CosignError, Result};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::filter::threshold::ThresholdFilter;
use log4rs::Config;
use std::io::IsTerminal;
use std::path::Path;

const CONSOLE_APPENDER: &str = "stderr";
const LOG_FILE_APPENDER: &str = "log_file";
const ERR_LOG_FILE_APPENDER: &str = "err_log_file";

/// Parsed form of a filter expression such as `info,cosign_core=debug,root=warn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilters {
    pub app_level: LevelFilter,
    pub root_level: LevelFilter,
    pub modules: Vec<(String, LevelFilter)>,
}

impl LogFilters {
    /// Unparseable parts are skipped. A bare level sets the app level; `root=<level>` opens third-party logs.
    pub fn parse(filters: &str) -> Self {
        let mut out = Self { app_level: LevelFilter::Info, root_level: THIRD_PARTY_DEFAULT_LEVEL, modules: Vec::new() };
        let mut app_level_seen = false;
        for part in filters.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                None => {
                    if let (false, Ok(level)) = (app_level_seen, part.parse()) {
                        out.app_level = level;
                        app_level_seen = true;
                    }
                }
                Some((module, level)) => {
                    let (module, level) = (module.trim(), level.trim());
                    let Ok(level) = level.parse::<LevelFilter>() else {
                        continue;
                    };
                    if module == "root" {
                        out.root_level = level;
                    } else if !module.is_empty() {
                        out.modules.push((module.to_string(), level));
                    }
                }
            }
        }
        out
    }
}

fn rolling_appender(dir: &Path, file_name: &str) -> Result<RollingFileAppender> {
    let archive_pattern = dir.join(format!("{file_name}.{{}}.gz"));
    let archive_pattern = archive_pattern
        .to_str()
        .ok_or_else(|| CosignError::ConfigError(format!("log dir is not valid utf-8: {}", dir.display())))?
        .to_string();
    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(&archive_pattern, LOG_FILE_MAX_ROLLS)
        .map_err(|err| CosignError::ConfigError(format!("log roller for {}: {}", file_name, err)))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(LOG_FILE_MAX_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_LINE_PATTERN)))
        .build(dir.join(file_name), Box::new(policy))
        .map_err(|err| CosignError::ConfigError(format!("log file {}: {}", file_name, err)))
}

/// Initializes the global logger: stderr always, plus `cosign.log` and `cosign.err.log` under `log_dir` when given.
///
/// The logger is global; a repeated call returns `Ok(())` and keeps the first configuration.
pub fn init_logger(log_dir: Option<&str>, filters: &str) -> Result<()> {
    let filters = LogFilters::parse(filters);

    let console_pattern = if std::io::stderr().is_terminal() { LOG_LINE_PATTERN_COLORED } else { LOG_LINE_PATTERN };
    let console = ConsoleAppender::builder().target(Target::Stderr).encoder(Box::new(PatternEncoder::new(console_pattern))).build();

    let mut builder = Config::builder().appender(Appender::builder().build(CONSOLE_APPENDER, Box::new(console)));
    let mut appenders = vec![CONSOLE_APPENDER.to_string()];

    if let Some(dir) = log_dir.map(str::trim).filter(|d| !d.is_empty()) {
        let dir = Path::new(dir);
        builder = builder.appender(Appender::builder().build(LOG_FILE_APPENDER, Box::new(rolling_appender(dir, LOG_FILE_NAME)?)));
        builder = builder.appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Warn)))
                .build(ERR_LOG_FILE_APPENDER, Box::new(rolling_appender(dir, ERR_LOG_FILE_NAME)?)),
        );
        appenders.push(LOG_FILE_APPENDER.to_string());
        appenders.push(ERR_LOG_FILE_APPENDER.to_string());
    }

    for crate_name in WHITELISTED_CRATES {
        if !filters.modules.iter().any(|(m, _)| m == crate_name) {
            builder = builder.logger(Logger::builder().appenders(appenders.clone()).additive(false).build(*crate_name, filters.app_level));
        }
    }
    for (module, level) in &filters.modules {
        builder = builder.logger(Logger::builder().appenders(appenders.clone()).additive(false).build(module, *level));
    }

    let config = builder
        .build(Root::builder().appenders(appenders).build(filters.root_level))
        .map_err(|err| CosignError::ConfigError(format!("invalid log4rs config: {}", err)))?;
    // Already initialized; keep the first logger.
    let _ = log4rs::init_config(config);
    Ok(())
}

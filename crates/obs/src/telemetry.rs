// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::ObsConfig;
use crate::error::ObsError;
use std::fs;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the background log writer alive; buffered lines are flushed on drop.
#[derive(Debug)]
pub struct ObsGuard {
    _worker: WorkerGuard,
}

/// Builds the filter from `RUST_LOG` when set, else from `logger_level`.
///
/// Below debug, chatty HTTP client crates are silenced.
pub(crate) fn build_env_filter(logger_level: &str) -> Result<EnvFilter, ObsError> {
    let mut filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(logger_level).map_err(|e| ObsError::Filter(format!("{logger_level}: {e}")))?,
    };

    if !matches!(logger_level, "trace" | "debug") {
        for name in ["hyper", "hyper_util", "reqwest"] {
            let directive = format!("{name}=off")
                .parse()
                .map_err(|e| ObsError::Filter(format!("{name}: {e}")))?;
            filter = filter.add_directive(directive);
        }
    }

    Ok(filter)
}

/// Installs the process-wide subscriber.
///
/// Lines go to stdout, or to a daily-rolling file when a log directory is
/// configured. Fails when a subscriber is already installed.
pub fn init_obs(config: &ObsConfig) -> Result<ObsGuard, ObsError> {
    let env_filter = build_env_filter(&config.logger_level)?;

    let (writer, worker) = match config.log_directory.as_deref() {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&config.log_filename)
                .build(dir)
                .map_err(std::io::Error::other)?;
            tracing_appender::non_blocking(appender)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let fmt_layer = if config.log_json {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(config.log_directory.is_none())
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()?;

    info!(
        level = %config.logger_level,
        directory = config.log_directory.as_deref().unwrap_or("stdout"),
        json = config.log_json,
        "logging initialized"
    );

    Ok(ObsGuard { _worker: worker })
}

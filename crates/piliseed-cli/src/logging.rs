// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PILISEED_LOG";
const LOG_FILE_PREFIX: &str = "piliseed.log";

/// Routes events to a daily rolling file so the terminal UI stays clean.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_tracing(dir: &Path, level: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(dir).with_context(|| format!("create log directory {}", dir.display()))?;

    let filter = env_filter(env::var(LOG_ENV).ok().as_deref(), level)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install tracing subscriber: {error}"))?;
    Ok(guard)
}

fn env_filter(override_directives: Option<&str>, level: &str) -> Result<EnvFilter> {
    let directives = match override_directives {
        Some(value) if !value.trim().is_empty() => value,
        _ => level,
    };
    EnvFilter::try_new(directives).with_context(|| {
        format!("invalid log filter {directives:?}; set {LOG_ENV} or [log].level to a level such as info")
    })
}

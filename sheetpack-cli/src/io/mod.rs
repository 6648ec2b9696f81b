use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use log::{LevelFilter, info};
use serde::Serialize;
use svg::Document;

use crate::EPOCH;
use crate::config::RunConfig;

pub mod cli;
pub mod output;
pub mod svg_export;

pub fn read_config(path: &Path) -> Result<RunConfig> {
    let file = File::open(path)
        .with_context(|| format!("could not open config file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("incorrect config file format: {}", path.display()))
}

pub fn write_json(json: &impl Serialize, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not open report file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, json)
        .with_context(|| format!("could not write report file: {}", path.display()))?;

    info!("[IO] report written to file://{}", fs::canonicalize(path)?.display());
    Ok(())
}

pub fn write_svg(document: &Document, path: &Path) -> Result<()> {
    svg::save(path, document)
        .with_context(|| format!("could not write svg file: {}", path.display()))?;
    info!("[IO] svg written to file://{}", fs::canonicalize(path)?.display());
    Ok(())
}

pub fn init_logger(level_filter: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            let handle = std::thread::current();
            let thread_name = handle.name().unwrap_or("-");

            let duration = EPOCH.elapsed();
            let sec = duration.as_secs() % 60;
            let min = (duration.as_secs() / 60) % 60;
            let hours = (duration.as_secs() / 60) / 60;

            let prefix = format!(
                "[{}] [{:0>2}:{:0>2}:{:0>2}] <{}>",
                record.level(),
                hours,
                min,
                sec,
                thread_name,
            );

            out.finish(format_args!("{prefix:<27}{message}"))
        })
        .level(level_filter)
        .chain(std::io::stdout())
        .apply()
        .context("could not initialize logger")?;
    info!("[EPOCH]: {:?}", *EPOCH);
    Ok(())
}

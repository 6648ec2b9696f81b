use std::fs;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{info, warn};
use sheetpack_cli::config::RunConfig;
use sheetpack_cli::io;
use sheetpack_cli::io::cli::Cli;
use sheetpack_cli::io::output::RunOutput;
use sheetpack_cli::io::svg_export::layout_to_svg;
use sheetpack_cli::runner;

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let config = match args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            RunConfig::default()
        }
        Some(config_file) => io::read_config(&config_file)?,
    };

    info!("Successfully parsed RunConfig: {config:?}");

    if !args.output_folder.exists() {
        fs::create_dir_all(&args.output_folder).with_context(|| {
            format!(
                "could not create output folder: {}",
                args.output_folder.display()
            )
        })?;
    }

    let report = runner::run(&config)?;

    {
        let svg_path = args.output_folder.join("layout.svg");
        let title = format!("{:?}", config.algorithm);
        let svg = layout_to_svg(&report, config.svg_draw_options, &title);
        io::write_svg(&svg, &svg_path)?;
    }

    {
        let output = RunOutput { config, report };
        let report_path = args.output_folder.join("report.json");
        io::write_json(&output, &report_path)?;
    }

    Ok(())
}

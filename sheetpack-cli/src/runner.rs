use std::time::Instant;

use anyhow::{Result, bail};
use log::{info, warn};
use rand::SeedableRng;
use rand::prelude::SmallRng;
use serde::{Deserialize, Serialize};
use sheetpack::geometry::Rect;
use sheetpack::packers::{
    GuillotineBinPack, LayoutSummary, MaxRectsBinPack, Packer, ShelfBinPack, SingleBinPack,
    SkylineBinPack,
};
use thousands::Separable;

use crate::config::{Algorithm, ItemSource, RunConfig};
use crate::verify;

/// Rectangle placed for the item at index `item` of the item list
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PlacedItem {
    pub item: usize,
    pub rect: Rect,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RunReport {
    pub bin_width: i32,
    pub bin_height: i32,
    pub n_requested: usize,
    pub placed: Vec<PlacedItem>,
    /// Free space as tracked by the packer at the end of the run
    pub free_rects: Vec<Rect>,
    pub occupancy: f64,
    pub elapsed_ms: f64,
    /// Winning layout of the uniform-item engine
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub layout: Option<LayoutSummary>,
}

/// Packs the configured items, verifies the result and reports it.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    let mut rng = match config.prng_seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let sizes = config.items.sizes(&mut rng)?;
    let (width, height) = (config.bin_width, config.bin_height);
    let batch = config.batch;

    info!(
        "[RUN] packing {} items on a {width}x{height} sheet with {:?}",
        sizes.len().separate_with_commas(),
        config.algorithm
    );
    let start = Instant::now();

    let report = match config.algorithm {
        Algorithm::MaxRects {
            heuristic,
            allow_rotation,
        } => {
            let mut packer = MaxRectsBinPack::new(width, height, allow_rotation)?;
            let placed = match batch {
                true => to_placed(packer.insert_batch(&sizes, heuristic)?),
                false => insert_each(&sizes, |w, h| packer.insert(w, h, heuristic))?,
            };
            build_report(&packer, sizes.len(), placed, start)
        }
        Algorithm::Guillotine {
            choice,
            split,
            merge,
        } => {
            let mut packer = GuillotineBinPack::new(width, height)?;
            let placed = match batch {
                true => to_placed(packer.insert_batch(&sizes, merge, choice, split)?),
                false => insert_each(&sizes, |w, h| packer.insert(w, h, merge, choice, split))?,
            };
            build_report(&packer, sizes.len(), placed, start)
        }
        Algorithm::Skyline {
            heuristic,
            use_waste_map,
        } => {
            let mut packer = SkylineBinPack::new(width, height, use_waste_map)?;
            let placed = match batch {
                true => to_placed(packer.insert_batch(&sizes, heuristic)?),
                false => insert_each(&sizes, |w, h| packer.insert(w, h, heuristic))?,
            };
            build_report(&packer, sizes.len(), placed, start)
        }
        Algorithm::Shelf {
            heuristic,
            use_waste_map,
        } => {
            if batch {
                warn!("[RUN] shelf packer has no batch insertion, inserting in list order");
            }
            let mut packer = ShelfBinPack::new(width, height, use_waste_map)?;
            let placed = insert_each(&sizes, |w, h| packer.insert(w, h, heuristic))?;
            build_report(&packer, sizes.len(), placed, start)
        }
        Algorithm::SingleBin { config: sb_config } => {
            let ItemSource::Uniform {
                width: item_width,
                height: item_height,
                quantity,
            } = config.items
            else {
                bail!("the uniform-item engine requires a uniform item source");
            };
            let mut packer = SingleBinPack::with_config(width, height, sb_config)?;
            let rects = packer.insert(item_width, item_height, quantity)?;
            let placed = rects
                .into_iter()
                .enumerate()
                .map(|(item, rect)| PlacedItem { item, rect })
                .collect();
            RunReport {
                layout: packer.last_layout().copied(),
                ..build_report(&packer, quantity, placed, start)
            }
        }
    };

    verify::verify_placements(&report.placed, &sizes, width, height)?;

    info!(
        "[RUN] placed {}/{} items, occupancy: {:.3}%, took {:.3}ms",
        report.placed.len().separate_with_commas(),
        report.n_requested.separate_with_commas(),
        report.occupancy * 100.0,
        report.elapsed_ms
    );
    Ok(report)
}

fn insert_each(
    sizes: &[(i32, i32)],
    mut insert: impl FnMut(i32, i32) -> Result<Option<Rect>>,
) -> Result<Vec<PlacedItem>> {
    let mut placed = vec![];
    for (item, &(w, h)) in sizes.iter().enumerate() {
        if let Some(rect) = insert(w, h)? {
            placed.push(PlacedItem { item, rect });
        }
    }
    Ok(placed)
}

fn to_placed(batch: Vec<(usize, Rect)>) -> Vec<PlacedItem> {
    batch
        .into_iter()
        .map(|(item, rect)| PlacedItem { item, rect })
        .collect()
}

fn build_report(
    packer: &impl Packer,
    n_requested: usize,
    placed: Vec<PlacedItem>,
    start: Instant,
) -> RunReport {
    let (bin_width, bin_height) = packer.bin_size();
    RunReport {
        bin_width,
        bin_height,
        n_requested,
        placed,
        free_rects: packer.free_rectangles(),
        occupancy: packer.occupancy(),
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        layout: None,
    }
}

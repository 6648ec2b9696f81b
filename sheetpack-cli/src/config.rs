use anyhow::{Result, ensure};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sheetpack::packers::{
    FreeRectChoice, MaxRectsHeuristic, ShelfHeuristic, SkylineHeuristic, SplitRule,
};
use sheetpack::util::SingleBinConfig;

use crate::io::svg_export::SvgDrawOptions;

/// Configuration of a packing run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RunConfig {
    pub bin_width: i32,
    pub bin_height: i32,
    /// Packer and its heuristics
    pub algorithm: Algorithm,
    /// Items to pack, in insertion order
    pub items: ItemSource,
    /// Hand the whole item list to the packer at once, letting it choose the order.
    /// Ignored by packers without batch insertion.
    #[serde(default)]
    pub batch: bool,
    /// Seed for the PRNG. If undefined, random item sources draw from OS entropy
    pub prng_seed: Option<u64>,
    /// Optional SVG drawing options
    #[serde(default)]
    pub svg_draw_options: SvgDrawOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            bin_width: 1024,
            bin_height: 1024,
            algorithm: Algorithm::MaxRects {
                heuristic: MaxRectsHeuristic::BestShortSideFit,
                allow_rotation: true,
            },
            items: ItemSource::Random {
                n_items: 500,
                min_side: 8,
                max_side: 96,
            },
            batch: false,
            prng_seed: Some(0),
            svg_draw_options: SvgDrawOptions::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "kind")]
pub enum Algorithm {
    MaxRects {
        heuristic: MaxRectsHeuristic,
        allow_rotation: bool,
    },
    Guillotine {
        choice: FreeRectChoice,
        split: SplitRule,
        merge: bool,
    },
    Skyline {
        heuristic: SkylineHeuristic,
        use_waste_map: bool,
    },
    Shelf {
        heuristic: ShelfHeuristic,
        use_waste_map: bool,
    },
    /// Uniform-item layout engine, requires [`ItemSource::Uniform`]
    SingleBin {
        #[serde(default)]
        config: SingleBinConfig,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum ItemSource {
    /// Explicit `(width, height)` pairs
    List { sizes: Vec<(i32, i32)> },
    /// Sides drawn uniformly from `[min_side, max_side]`
    Random {
        n_items: usize,
        min_side: i32,
        max_side: i32,
    },
    /// `quantity` copies of a single item
    Uniform {
        width: i32,
        height: i32,
        quantity: usize,
    },
}

impl ItemSource {
    pub fn sizes(&self, rng: &mut impl Rng) -> Result<Vec<(i32, i32)>> {
        match self {
            ItemSource::List { sizes } => Ok(sizes.clone()),
            ItemSource::Random {
                n_items,
                min_side,
                max_side,
            } => {
                ensure!(
                    *min_side > 0 && min_side <= max_side,
                    "invalid side range: [{min_side}, {max_side}]"
                );
                Ok((0..*n_items)
                    .map(|_| {
                        (
                            rng.random_range(*min_side..=*max_side),
                            rng.random_range(*min_side..=*max_side),
                        )
                    })
                    .collect())
            }
            ItemSource::Uniform {
                width,
                height,
                quantity,
            } => Ok(vec![(*width, *height); *quantity]),
        }
    }
}

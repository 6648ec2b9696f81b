mod lane;
mod layouts;

#[doc(inline)]
pub use layouts::LayoutKind;

use crate::geometry::Rect;
use crate::packers::Packer;
use crate::util::{FPA, SingleBinConfig, assertions, ensure_positive_size};
use anyhow::Result;
use layouts::{Candidate, LayoutBuilder};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which layout won the last [`SingleBinPack::insert`], and how it scored.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LayoutSummary {
    pub kind: LayoutKind,
    pub placed: usize,
    pub requested: usize,
    /// Right edge of the rightmost placed item
    pub max_x: f64,
}

/// Layout engine for a quantity of identical items on one sheet.
///
/// Three layout families are built for every request: all items with their long side along X,
/// all with their long side along Y, and a mix of both stacked in two horizontal bands.
/// The one placing the most items wins, ties go to the smallest max-X extent.
#[derive(Clone, Debug)]
pub struct SingleBinPack {
    bin_width: i32,
    bin_height: i32,
    config: SingleBinConfig,
    used: Vec<Rect>,
    last_layout: Option<LayoutSummary>,
}

impl SingleBinPack {
    pub fn new(bin_width: i32, bin_height: i32) -> Result<Self> {
        Self::with_config(bin_width, bin_height, SingleBinConfig::default())
    }

    pub fn with_config(bin_width: i32, bin_height: i32, config: SingleBinConfig) -> Result<Self> {
        ensure_positive_size(bin_width, bin_height)?;
        Ok(Self {
            bin_width,
            bin_height,
            config,
            used: vec![],
            last_layout: None,
        })
    }

    /// Lays out up to `quantity` items of `width × height` and returns their positions.
    /// Fewer rectangles are returned when the sheet cannot hold all of them.
    ///
    /// Each call starts from an empty sheet and replaces the previous result.
    pub fn insert(&mut self, width: i32, height: i32, quantity: usize) -> Result<Vec<Rect>> {
        ensure_positive_size(width, height)?;
        self.used.clear();
        self.last_layout = None;
        if quantity == 0 {
            return Ok(vec![]);
        }

        let builder = LayoutBuilder::new(
            (self.bin_width, self.bin_height),
            (width, height),
            quantity,
            self.config,
        );
        let candidates = [Some(builder.all_horizontal()), Some(builder.all_vertical()), builder.mixed()?];
        let best = candidates
            .into_iter()
            .flatten()
            .inspect(|c| debug!("[SBP] {:?}: {} items, max x: {}", c.kind, c.count(), FPA(c.max_x)))
            .reduce(|best, c| match c.is_better_than(&best) {
                true => c,
                false => best,
            });
        let Some(Candidate {
            kind,
            placements,
            max_x,
        }) = best
        else {
            return Ok(vec![]);
        };

        let rects = placements
            .iter()
            .map(|p| p.to_rect(width, height))
            .collect::<Vec<_>>();
        debug_assert!(rects.len() <= quantity);
        debug_assert!(assertions::rects_within_bin(
            &rects,
            self.bin_width,
            self.bin_height
        ));
        debug_assert!(assertions::rects_are_disjoint(&rects));

        debug!(
            "[SBP] {:?} layout placed {}/{quantity} items of {width}x{height}",
            kind,
            rects.len()
        );
        self.last_layout = Some(LayoutSummary {
            kind,
            placed: rects.len(),
            requested: quantity,
            max_x,
        });
        self.used.clone_from(&rects);
        Ok(rects)
    }

    pub fn last_layout(&self) -> Option<&LayoutSummary> {
        self.last_layout.as_ref()
    }
}

impl Packer for SingleBinPack {
    fn bin_size(&self) -> (i32, i32) {
        (self.bin_width, self.bin_height)
    }

    fn used_rectangles(&self) -> &[Rect] {
        &self.used
    }

    /// Free space is not tracked by this engine.
    fn free_rectangles(&self) -> Vec<Rect> {
        vec![]
    }
}

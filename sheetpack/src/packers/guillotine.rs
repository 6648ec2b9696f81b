use crate::geometry::Rect;
use crate::packers::Packer;
use crate::util::{assertions, ensure_positive_size};
use anyhow::Result;
use log::trace;
use serde::{Deserialize, Serialize};

/// Rule to choose the free rectangle that receives a new item.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FreeRectChoice {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    WorstAreaFit,
    WorstShortSideFit,
    WorstLongSideFit,
}

impl FreeRectChoice {
    pub const ALL: [FreeRectChoice; 6] = [
        FreeRectChoice::BestAreaFit,
        FreeRectChoice::BestShortSideFit,
        FreeRectChoice::BestLongSideFit,
        FreeRectChoice::WorstAreaFit,
        FreeRectChoice::WorstShortSideFit,
        FreeRectChoice::WorstLongSideFit,
    ];

    /// Scores placing a `width × height` item in `free`. Lower is better.
    /// The worst-fit variants are the negated best-fit scores.
    pub fn score(&self, width: i32, height: i32, free: &Rect) -> i64 {
        let leftover_w = (free.width - width) as i64;
        let leftover_h = (free.height - height) as i64;
        let area_fit = free.area() - width as i64 * height as i64;
        let short_side = i64::min(leftover_w, leftover_h);
        let long_side = i64::max(leftover_w, leftover_h);

        match self {
            FreeRectChoice::BestAreaFit => area_fit,
            FreeRectChoice::BestShortSideFit => short_side,
            FreeRectChoice::BestLongSideFit => long_side,
            FreeRectChoice::WorstAreaFit => -area_fit,
            FreeRectChoice::WorstShortSideFit => -short_side,
            FreeRectChoice::WorstLongSideFit => -long_side,
        }
    }
}

/// Rule to decide the direction of the guillotine cut through the leftover of a free rectangle.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitRule {
    ShorterLeftoverAxis,
    LongerLeftoverAxis,
    MinimizeArea,
    MaximizeArea,
    ShorterAxis,
    LongerAxis,
}

impl SplitRule {
    pub const ALL: [SplitRule; 6] = [
        SplitRule::ShorterLeftoverAxis,
        SplitRule::LongerLeftoverAxis,
        SplitRule::MinimizeArea,
        SplitRule::MaximizeArea,
        SplitRule::ShorterAxis,
        SplitRule::LongerAxis,
    ];

    /// `true` when the cut runs horizontally: the bottom piece spans the full free width.
    pub fn split_horizontal(&self, free: &Rect, placed: &Rect) -> bool {
        let leftover_w = (free.width - placed.width) as i64;
        let leftover_h = (free.height - placed.height) as i64;
        let (placed_w, placed_h) = (placed.width as i64, placed.height as i64);

        match self {
            SplitRule::ShorterLeftoverAxis => leftover_w <= leftover_h,
            SplitRule::LongerLeftoverAxis => leftover_w > leftover_h,
            SplitRule::MinimizeArea => placed_w * leftover_h > leftover_w * placed_h,
            SplitRule::MaximizeArea => placed_w * leftover_h <= leftover_w * placed_h,
            SplitRule::ShorterAxis => free.width <= free.height,
            SplitRule::LongerAxis => free.width > free.height,
        }
    }
}

/// Packer that keeps the free space as a list of pairwise disjoint rectangles,
/// produced by edge-to-edge (guillotine) cuts.
///
/// Items are never rotated.
#[derive(Clone, Debug)]
pub struct GuillotineBinPack {
    bin_width: i32,
    bin_height: i32,
    free: Vec<Rect>,
    used: Vec<Rect>,
    /// Only covers the space another packer handed over
    is_waste_map: bool,
}

impl GuillotineBinPack {
    pub fn new(bin_width: i32, bin_height: i32) -> Result<Self> {
        ensure_positive_size(bin_width, bin_height)?;
        Ok(Self {
            bin_width,
            bin_height,
            free: vec![Rect::new(0, 0, bin_width, bin_height)],
            used: vec![],
            is_waste_map: false,
        })
    }

    /// Waste map for another packer: starts without any free space,
    /// which is handed over through [`GuillotineBinPack::recover`].
    pub(crate) fn new_waste_map(bin_width: i32, bin_height: i32) -> Self {
        Self {
            bin_width,
            bin_height,
            free: vec![],
            used: vec![],
            is_waste_map: true,
        }
    }

    /// Places a `width × height` item, returns `None` when no free rectangle can hold it.
    /// A failed insert leaves the free list untouched.
    pub fn insert(
        &mut self,
        width: i32,
        height: i32,
        merge: bool,
        choice: FreeRectChoice,
        split: SplitRule,
    ) -> Result<Option<Rect>> {
        ensure_positive_size(width, height)?;

        let Some(free_index) = self.find_position(width, height, choice) else {
            trace!("[GUIL] no free rectangle for {width}x{height}");
            return Ok(None);
        };
        let node = self.place(free_index, width, height, merge, split);
        Ok(Some(node))
    }

    /// Places as many of `sizes` as possible, always committing the globally best
    /// (size, free rectangle) pair next. Returns the indices into `sizes` with their placements.
    pub fn insert_batch(
        &mut self,
        sizes: &[(i32, i32)],
        merge: bool,
        choice: FreeRectChoice,
        split: SplitRule,
    ) -> Result<Vec<(usize, Rect)>> {
        for &(w, h) in sizes {
            ensure_positive_size(w, h)?;
        }
        let mut pending = (0..sizes.len()).collect::<Vec<_>>();
        let mut placed = vec![];

        loop {
            //(score, free index, position in pending)
            let mut best: Option<(i64, usize, usize)> = None;
            for (p, &idx) in pending.iter().enumerate() {
                let (w, h) = sizes[idx];
                for (i, free) in self.free.iter().enumerate() {
                    if w > free.width || h > free.height {
                        continue;
                    }
                    let score = match w == free.width && h == free.height {
                        true => i64::MIN,
                        false => choice.score(w, h, free),
                    };
                    if best.is_none_or(|(s, _, _)| score < s) {
                        best = Some((score, i, p));
                    }
                }
            }
            let Some((_, free_index, p)) = best else {
                break;
            };
            let idx = pending.remove(p);
            let (w, h) = sizes[idx];
            let node = self.place(free_index, w, h, merge, split);
            placed.push((idx, node));
        }
        Ok(placed)
    }

    fn find_position(&self, width: i32, height: i32, choice: FreeRectChoice) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (i, free) in self.free.iter().enumerate() {
            if width == free.width && height == free.height {
                //perfect fit, stop searching
                return Some(i);
            }
            if width <= free.width && height <= free.height {
                let score = choice.score(width, height, free);
                if best.is_none_or(|(_, s)| score < s) {
                    best = Some((i, score));
                }
            }
        }
        best.map(|(i, _)| i)
    }

    fn place(
        &mut self,
        free_index: usize,
        width: i32,
        height: i32,
        merge: bool,
        split: SplitRule,
    ) -> Rect {
        let free = self.free.remove(free_index);
        let node = Rect::new(free.x, free.y, width, height);
        self.split_free_rect(&free, &node, split);
        if merge {
            self.merge_free_rectangles();
        }
        self.used.push(node);

        trace!("[GUIL] placed {node} in {free}");
        debug_assert!(assertions::rects_are_disjoint(&self.free));
        debug_assert!(
            self.is_waste_map
                || assertions::area_is_conserved(
                    &self.used,
                    &self.free,
                    self.bin_width,
                    self.bin_height
                )
        );
        node
    }

    /// Cuts the leftover of `free` around `placed` (top-left aligned) into at most two pieces.
    fn split_free_rect(&mut self, free: &Rect, placed: &Rect, split: SplitRule) {
        let horizontal = split.split_horizontal(free, placed);

        let bottom_height = free.height - placed.height;
        let right_width = free.width - placed.width;
        let (bottom_width, right_height) = match horizontal {
            true => (free.width, placed.height),
            false => (placed.width, free.height),
        };

        if bottom_width > 0 && bottom_height > 0 {
            self.free.push(Rect::new(
                free.x,
                free.y + placed.height,
                bottom_width,
                bottom_height,
            ));
        }
        if right_width > 0 && right_height > 0 {
            self.free.push(Rect::new(
                free.x + placed.width,
                free.y,
                right_width,
                right_height,
            ));
        }
    }

    /// Coalesces pairs of free rectangles that share a complete edge.
    /// Runs a single nested pass: merges enabled by an earlier merge can be missed.
    pub fn merge_free_rectangles(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut j = i + 1;
            while j < self.free.len() {
                match merged(&self.free[i], &self.free[j]) {
                    Some(m) => {
                        self.free[i] = m;
                        //the element shifted into `j` is visited next
                        self.free.remove(j);
                    }
                    None => j += 1,
                }
            }
            i += 1;
        }
    }

    /// Hands a free region over to this waste map. The region must be disjoint from the free list.
    pub(crate) fn recover(&mut self, rect: Rect) {
        debug_assert!(self.free.iter().all(|f| !f.intersects(&rect)));
        self.free.push(rect);
    }

    pub fn free_list(&self) -> &[Rect] {
        &self.free
    }
}

fn merged(a: &Rect, b: &Rect) -> Option<Rect> {
    if a.width == b.width && a.x == b.x {
        if a.y == b.bottom() {
            return Some(Rect::new(a.x, b.y, a.width, a.height + b.height));
        }
        if a.bottom() == b.y {
            return Some(Rect::new(a.x, a.y, a.width, a.height + b.height));
        }
    } else if a.height == b.height && a.y == b.y {
        if a.x == b.right() {
            return Some(Rect::new(b.x, a.y, a.width + b.width, a.height));
        }
        if a.right() == b.x {
            return Some(Rect::new(a.x, a.y, a.width + b.width, a.height));
        }
    }
    None
}

impl Packer for GuillotineBinPack {
    fn bin_size(&self) -> (i32, i32) {
        (self.bin_width, self.bin_height)
    }

    fn used_rectangles(&self) -> &[Rect] {
        &self.used
    }

    fn free_rectangles(&self) -> Vec<Rect> {
        self.free.clone()
    }
}

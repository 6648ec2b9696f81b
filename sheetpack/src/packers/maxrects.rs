use crate::geometry::Rect;
use crate::packers::Packer;
use crate::util::{assertions, ensure_positive_size};
use anyhow::Result;
use log::trace;
use serde::{Deserialize, Serialize};

/// Placement rule of the [`MaxRectsBinPack`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaxRectsHeuristic {
    /// Minimize the shorter leftover side of the free rectangle
    BestShortSideFit,
    /// Minimize the longer leftover side of the free rectangle
    BestLongSideFit,
    /// Minimize the leftover area of the free rectangle
    BestAreaFit,
    /// Tetris-style: lowest bottom edge first, then leftmost
    BottomLeft,
    /// Maximize the edge length touching the bin border or placed items
    ContactPoint,
}

impl MaxRectsHeuristic {
    pub const ALL: [MaxRectsHeuristic; 5] = [
        MaxRectsHeuristic::BestShortSideFit,
        MaxRectsHeuristic::BestLongSideFit,
        MaxRectsHeuristic::BestAreaFit,
        MaxRectsHeuristic::BottomLeft,
        MaxRectsHeuristic::ContactPoint,
    ];
}

/// (primary, secondary), lexicographically lower is better
type Score = (i64, i64);

/// Packer that keeps every maximal free rectangle, free rectangles may overlap each other.
#[derive(Clone, Debug)]
pub struct MaxRectsBinPack {
    bin_width: i32,
    bin_height: i32,
    allow_rotation: bool,
    free: Vec<Rect>,
    used: Vec<Rect>,
}

impl MaxRectsBinPack {
    pub fn new(bin_width: i32, bin_height: i32, allow_rotation: bool) -> Result<Self> {
        ensure_positive_size(bin_width, bin_height)?;
        Ok(Self {
            bin_width,
            bin_height,
            allow_rotation,
            free: vec![Rect::new(0, 0, bin_width, bin_height)],
            used: vec![],
        })
    }

    /// Places a `width × height` item (rotated by 90° if allowed and better scoring).
    /// Returns `None` and leaves the packer untouched when the item fits nowhere.
    pub fn insert(
        &mut self,
        width: i32,
        height: i32,
        heuristic: MaxRectsHeuristic,
    ) -> Result<Option<Rect>> {
        ensure_positive_size(width, height)?;

        match self.find_position(width, height, heuristic) {
            Some((node, _)) => {
                self.place_rect(node);
                Ok(Some(node))
            }
            None => {
                trace!("[MAXR] no position for {width}x{height}");
                Ok(None)
            }
        }
    }

    /// Places as many of `sizes` as possible. Each round commits the item and position
    /// with the best score over all remaining items.
    /// Returns the indices into `sizes` with their placements.
    pub fn insert_batch(
        &mut self,
        sizes: &[(i32, i32)],
        heuristic: MaxRectsHeuristic,
    ) -> Result<Vec<(usize, Rect)>> {
        for &(w, h) in sizes {
            ensure_positive_size(w, h)?;
        }
        let mut pending = (0..sizes.len()).collect::<Vec<_>>();
        let mut placed = vec![];

        while !pending.is_empty() {
            let mut best: Option<(usize, Rect, Score)> = None;
            for (p, &idx) in pending.iter().enumerate() {
                let (w, h) = sizes[idx];
                let Some((node, score)) = self.find_position(w, h, heuristic) else {
                    continue;
                };
                if best.is_none_or(|(_, _, s)| score < s) {
                    best = Some((p, node, score));
                }
            }
            let Some((p, node, _)) = best else {
                break;
            };
            self.place_rect(node);
            placed.push((pending.remove(p), node));
        }
        Ok(placed)
    }

    fn find_position(
        &self,
        width: i32,
        height: i32,
        heuristic: MaxRectsHeuristic,
    ) -> Option<(Rect, Score)> {
        let rotate = self.allow_rotation && width != height;
        let orientations = [Some((width, height)), rotate.then_some((height, width))];

        let mut best: Option<(Rect, Score)> = None;
        for free in &self.free {
            for (w, h) in orientations.into_iter().flatten() {
                if w > free.width || h > free.height {
                    continue;
                }
                let node = Rect::new(free.x, free.y, w, h);
                let score = self.score(&node, free, heuristic);
                if best.is_none_or(|(_, s)| score < s) {
                    best = Some((node, score));
                }
            }
        }
        best
    }

    fn score(&self, node: &Rect, free: &Rect, heuristic: MaxRectsHeuristic) -> Score {
        let leftover_w = (free.width - node.width) as i64;
        let leftover_h = (free.height - node.height) as i64;
        let short_side = i64::min(leftover_w, leftover_h);
        let long_side = i64::max(leftover_w, leftover_h);

        match heuristic {
            MaxRectsHeuristic::BestShortSideFit => (short_side, long_side),
            MaxRectsHeuristic::BestLongSideFit => (long_side, short_side),
            MaxRectsHeuristic::BestAreaFit => (free.area() - node.area(), short_side),
            MaxRectsHeuristic::BottomLeft => (node.bottom() as i64, node.x as i64),
            MaxRectsHeuristic::ContactPoint => (-self.contact_point_score(node), 0),
        }
    }

    /// Total edge length of `node` touching the bin border or an already placed rectangle.
    fn contact_point_score(&self, node: &Rect) -> i64 {
        let mut score = 0;
        if node.x == 0 || node.right() == self.bin_width {
            score += node.height as i64;
        }
        if node.y == 0 || node.bottom() == self.bin_height {
            score += node.width as i64;
        }
        for used in &self.used {
            if used.x == node.right() || used.right() == node.x {
                score += common_interval_length(used.y, used.bottom(), node.y, node.bottom());
            }
            if used.y == node.bottom() || used.bottom() == node.y {
                score += common_interval_length(used.x, used.right(), node.x, node.right());
            }
        }
        score
    }

    fn place_rect(&mut self, node: Rect) {
        let mut residuals = vec![];
        self.free.retain(|free| match free.intersects(&node) {
            true => {
                residuals.extend(split_free_node(free, &node).into_iter().flatten());
                false
            }
            false => true,
        });
        self.free.extend(residuals);
        self.prune_free_list();
        self.used.push(node);

        trace!("[MAXR] placed {node}, {} free rects", self.free.len());
        debug_assert!(assertions::free_list_is_pruned(&self.free));
        debug_assert!(self.free.iter().all(|f| !f.intersects(&node)));
    }

    /// Removes every free rectangle that is contained in another one.
    fn prune_free_list(&mut self) {
        let mut i = 0;
        'outer: while i < self.free.len() {
            let mut j = i + 1;
            while j < self.free.len() {
                if self.free[i].is_contained_in(&self.free[j]) {
                    self.free.remove(i);
                    continue 'outer;
                }
                if self.free[j].is_contained_in(&self.free[i]) {
                    self.free.remove(j);
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }
}

/// Maximal bands of `free` that remain uncovered by `used`. The two must intersect.
fn split_free_node(free: &Rect, used: &Rect) -> [Option<Rect>; 4] {
    let above = (used.y > free.y).then(|| Rect::new(free.x, free.y, free.width, used.y - free.y));
    let below = (used.bottom() < free.bottom()).then(|| {
        Rect::new(
            free.x,
            used.bottom(),
            free.width,
            free.bottom() - used.bottom(),
        )
    });
    let left =
        (used.x > free.x).then(|| Rect::new(free.x, free.y, used.x - free.x, free.height));
    let right = (used.right() < free.right()).then(|| {
        Rect::new(
            used.right(),
            free.y,
            free.right() - used.right(),
            free.height,
        )
    });
    [above, below, left, right]
}

/// Length of the overlap of two 1D intervals, 0 when they are disjoint.
fn common_interval_length(start_a: i32, end_a: i32, start_b: i32, end_b: i32) -> i64 {
    if end_a < start_b || end_b < start_a {
        return 0;
    }
    (i32::min(end_a, end_b) - i32::max(start_a, start_b)) as i64
}

impl Packer for MaxRectsBinPack {
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

use crate::geometry::Rect;
use crate::packers::guillotine::{FreeRectChoice, GuillotineBinPack, SplitRule};
use crate::packers::Packer;
use crate::util::{assertions, ensure_positive_size};
use anyhow::Result;
use log::trace;
use serde::{Deserialize, Serialize};

/// Placement rule of the [`SkylineBinPack`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkylineHeuristic {
    /// Lowest resulting top edge, ties broken by the narrower segment
    BottomLeft,
    /// Least area trapped below the item, ties broken by the lowest top edge
    MinWasteFit,
}

impl SkylineHeuristic {
    pub const ALL: [SkylineHeuristic; 2] =
        [SkylineHeuristic::BottomLeft, SkylineHeuristic::MinWasteFit];
}

/// Horizontal piece of the skyline: everything in `[x, x + width)` below `y` is considered filled.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkylineSegment {
    pub x: i32,
    pub y: i32,
    pub width: i32,
}

struct Candidate {
    index: usize,
    node: Rect,
    score: (i64, i64),
}

/// Packer that tracks the filled region as a height profile over the bin width.
/// Items are tried in both orientations.
///
/// With a waste map, the gaps trapped below newly placed items are recovered into an
/// embedded [`GuillotineBinPack`] which is tried first on every insert.
#[derive(Clone, Debug)]
pub struct SkylineBinPack {
    bin_width: i32,
    bin_height: i32,
    skyline: Vec<SkylineSegment>,
    used: Vec<Rect>,
    waste_map: Option<GuillotineBinPack>,
}

impl SkylineBinPack {
    pub fn new(bin_width: i32, bin_height: i32, use_waste_map: bool) -> Result<Self> {
        ensure_positive_size(bin_width, bin_height)?;
        Ok(Self {
            bin_width,
            bin_height,
            skyline: vec![SkylineSegment {
                x: 0,
                y: 0,
                width: bin_width,
            }],
            used: vec![],
            waste_map: use_waste_map.then(|| GuillotineBinPack::new_waste_map(bin_width, bin_height)),
        })
    }

    pub fn insert(
        &mut self,
        width: i32,
        height: i32,
        heuristic: SkylineHeuristic,
    ) -> Result<Option<Rect>> {
        ensure_positive_size(width, height)?;

        if let Some(node) = self.insert_in_waste_map(width, height)? {
            return Ok(Some(node));
        }

        let Some(candidate) = self.find_position(width, height, heuristic) else {
            trace!("[SKYL] no position for {width}x{height}");
            return Ok(None);
        };
        self.place(candidate);
        Ok(self.used.last().copied())
    }

    /// Places as many of `sizes` as possible. Each round commits the item and skyline
    /// position with the best score over all remaining items. Items that fit nowhere on
    /// the skyline are offered to the waste map in order.
    /// Returns the indices into `sizes` with their placements.
    pub fn insert_batch(
        &mut self,
        sizes: &[(i32, i32)],
        heuristic: SkylineHeuristic,
    ) -> Result<Vec<(usize, Rect)>> {
        for &(w, h) in sizes {
            ensure_positive_size(w, h)?;
        }
        let mut pending = (0..sizes.len()).collect::<Vec<_>>();
        let mut placed = vec![];

        'rounds: while !pending.is_empty() {
            let mut best: Option<(usize, Candidate)> = None;
            for (p, &idx) in pending.iter().enumerate() {
                let (w, h) = sizes[idx];
                let Some(candidate) = self.find_position(w, h, heuristic) else {
                    continue;
                };
                if best.as_ref().is_none_or(|(_, b)| candidate.score < b.score) {
                    best = Some((p, candidate));
                }
            }
            if let Some((p, candidate)) = best {
                let node = candidate.node;
                self.place(candidate);
                placed.push((pending.remove(p), node));
                continue;
            }
            for p in 0..pending.len() {
                let (w, h) = sizes[pending[p]];
                if let Some(node) = self.insert_in_waste_map(w, h)? {
                    placed.push((pending.remove(p), node));
                    continue 'rounds;
                }
            }
            break;
        }
        Ok(placed)
    }

    fn insert_in_waste_map(&mut self, width: i32, height: i32) -> Result<Option<Rect>> {
        let Some(waste_map) = self.waste_map.as_mut() else {
            return Ok(None);
        };
        let node = waste_map.insert(
            width,
            height,
            true,
            FreeRectChoice::BestShortSideFit,
            SplitRule::MaximizeArea,
        )?;
        if let Some(node) = node {
            trace!("[SKYL] placed {node} in the waste map");
            self.used.push(node);
        }
        Ok(node)
    }

    fn find_position(
        &self,
        width: i32,
        height: i32,
        heuristic: SkylineHeuristic,
    ) -> Option<Candidate> {
        let orientations = [Some((width, height)), (width != height).then_some((height, width))];

        let mut best: Option<Candidate> = None;
        for (index, segment) in self.skyline.iter().enumerate() {
            for (w, h) in orientations.into_iter().flatten() {
                let Some(y) = self.fit_height(index, w, h) else {
                    continue;
                };
                let node = Rect::new(segment.x, y, w, h);
                let score = match heuristic {
                    SkylineHeuristic::BottomLeft => (node.bottom() as i64, segment.width as i64),
                    SkylineHeuristic::MinWasteFit => {
                        (self.wasted_area(index, w, y), node.bottom() as i64)
                    }
                };
                if best.as_ref().is_none_or(|b| score < b.score) {
                    best = Some(Candidate { index, node, score });
                }
            }
        }
        best
    }

    /// Height at which a `width × height` item rests when its left edge is aligned
    /// with segment `index`, `None` if it would leave the bin.
    fn fit_height(&self, index: usize, width: i32, height: i32) -> Option<i32> {
        let x = self.skyline[index].x;
        if width > self.bin_width - x {
            return None;
        }
        let mut width_left = width;
        let mut y = self.skyline[index].y;
        let mut i = index;
        while width_left > 0 {
            //running out of segments means the item leaves the bin on the right
            let segment = self.skyline.get(i)?;
            y = y.max(segment.y);
            if height > self.bin_height - y {
                return None;
            }
            width_left -= segment.width;
            i += 1;
        }
        Some(y)
    }

    /// Regions between the skyline and the bottom of an item resting at height `y`
    /// over segments starting at `index`.
    fn gaps_below(&self, index: usize, width: i32, y: i32) -> impl Iterator<Item = Rect> + '_ {
        let left = self.skyline[index].x;
        let right = left + width;
        self.skyline[index..]
            .iter()
            .take_while(move |s| s.x < right)
            .filter(move |s| s.y < y)
            .map(move |s| {
                let segment_right = i32::min(right, s.x + s.width);
                Rect::new(s.x, s.y, segment_right - s.x, y - s.y)
            })
    }

    fn wasted_area(&self, index: usize, width: i32, y: i32) -> i64 {
        self.gaps_below(index, width, y).map(|r| r.area()).sum()
    }

    fn place(&mut self, candidate: Candidate) {
        let Candidate { index, node, .. } = candidate;

        if self.waste_map.is_some() {
            let gaps = self.gaps_below(index, node.width, node.y).collect::<Vec<_>>();
            if let Some(waste_map) = self.waste_map.as_mut() {
                gaps.into_iter().for_each(|gap| waste_map.recover(gap));
            }
        }
        self.add_skyline_level(index, &node);
        self.used.push(node);

        trace!("[SKYL] placed {node}, {} segments", self.skyline.len());
        debug_assert!(assertions::skyline_is_valid(
            &self.skyline,
            self.bin_width,
            self.bin_height
        ));
    }

    fn add_skyline_level(&mut self, index: usize, node: &Rect) {
        self.skyline.insert(
            index,
            SkylineSegment {
                x: node.x,
                y: node.bottom(),
                width: node.width,
            },
        );

        //shrink or drop the segments now covered by the new one
        let i = index + 1;
        while i < self.skyline.len() {
            let covered_until = self.skyline[i - 1].x + self.skyline[i - 1].width;
            let segment = &mut self.skyline[i];
            if segment.x >= covered_until {
                break;
            }
            let shrink = covered_until - segment.x;
            if segment.width <= shrink {
                self.skyline.remove(i);
            } else {
                segment.x += shrink;
                segment.width -= shrink;
                break;
            }
        }

        self.merge_skylines();
    }

    /// Joins neighbouring segments at the same height.
    fn merge_skylines(&mut self) {
        let mut i = 0;
        while i + 1 < self.skyline.len() {
            if self.skyline[i].y == self.skyline[i + 1].y {
                self.skyline[i].width += self.skyline[i + 1].width;
                self.skyline.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    pub fn skyline(&self) -> &[SkylineSegment] {
        &self.skyline
    }

    pub fn waste_map(&self) -> Option<&GuillotineBinPack> {
        self.waste_map.as_ref()
    }
}

impl Packer for SkylineBinPack {
    fn bin_size(&self) -> (i32, i32) {
        (self.bin_width, self.bin_height)
    }

    fn used_rectangles(&self) -> &[Rect] {
        &self.used
    }

    /// Waste map contents plus the open space above every skyline segment.
    fn free_rectangles(&self) -> Vec<Rect> {
        let above_skyline = self
            .skyline
            .iter()
            .filter(|s| s.y < self.bin_height)
            .map(|s| Rect::new(s.x, s.y, s.width, self.bin_height - s.y));

        self.waste_map
            .iter()
            .flat_map(|w| w.free_list().iter().copied())
            .chain(above_skyline)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_height_rests_on_highest_covered_segment() {
        let mut packer = SkylineBinPack::new(10, 10, false).unwrap();
        packer.insert(4, 3, SkylineHeuristic::BottomLeft).unwrap();
        assert_eq!(
            packer.skyline(),
            &[
                SkylineSegment { x: 0, y: 3, width: 4 },
                SkylineSegment { x: 4, y: 0, width: 6 }
            ]
        );
        assert_eq!(packer.fit_height(0, 6, 2), Some(3));
        assert_eq!(packer.fit_height(1, 6, 2), Some(0));
        assert_eq!(packer.fit_height(1, 7, 2), None);
        assert_eq!(packer.fit_height(0, 2, 8), None);
        assert_eq!(packer.wasted_area(0, 6, 3), 6);
    }

    #[test]
    fn covered_segments_are_dropped_and_merged() {
        let mut packer = SkylineBinPack::new(10, 10, false).unwrap();
        let node = Rect::new(0, 0, 3, 2);
        packer.place(Candidate { index: 0, node, score: (0, 0) });
        let node = Rect::new(3, 0, 3, 2);
        packer.place(Candidate { index: 1, node, score: (0, 0) });
        assert_eq!(
            packer.skyline(),
            &[
                SkylineSegment { x: 0, y: 2, width: 6 },
                SkylineSegment { x: 6, y: 0, width: 4 }
            ]
        );
        let node = Rect::new(0, 2, 8, 1);
        packer.place(Candidate { index: 0, node, score: (0, 0) });
        assert_eq!(
            packer.skyline(),
            &[
                SkylineSegment { x: 0, y: 3, width: 8 },
                SkylineSegment { x: 8, y: 0, width: 2 }
            ]
        );
    }
}

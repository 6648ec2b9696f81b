use crate::geometry::Rect;
use crate::packers::guillotine::{FreeRectChoice, GuillotineBinPack, SplitRule};
use crate::packers::Packer;
use crate::util::{assertions, ensure_positive_size};
use anyhow::Result;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Rule to choose the shelf that receives a new item.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShelfHeuristic {
    /// Only the last (open) shelf is considered
    NextFit,
    /// First shelf that fits
    FirstFit,
    /// Shelf with the smallest remaining area
    BestAreaFit,
    /// Shelf with the largest remaining area
    WorstAreaFit,
    /// Shelf whose height is closest to the item height, above or below.
    /// An item taller than the last shelf would raise it by the difference.
    BestHeightFit,
    /// Shelf with the least horizontal space left after placing
    BestWidthFit,
    /// Shelf with the most horizontal space left after placing
    WorstWidthFit,
}

impl ShelfHeuristic {
    pub const ALL: [ShelfHeuristic; 7] = [
        ShelfHeuristic::NextFit,
        ShelfHeuristic::FirstFit,
        ShelfHeuristic::BestAreaFit,
        ShelfHeuristic::WorstAreaFit,
        ShelfHeuristic::BestHeightFit,
        ShelfHeuristic::BestWidthFit,
        ShelfHeuristic::WorstWidthFit,
    ];

    /// Scores putting a `width × height` item on `shelf`. Lower is better,
    /// equal scores keep the earliest shelf.
    fn score(&self, shelf: &Shelf, bin_width: i32, width: i32, height: i32) -> i64 {
        let remaining_width = (bin_width - shelf.current_x) as i64;
        match self {
            ShelfHeuristic::NextFit | ShelfHeuristic::FirstFit => 0,
            ShelfHeuristic::BestAreaFit => remaining_width * shelf.height as i64,
            ShelfHeuristic::WorstAreaFit => -remaining_width * shelf.height as i64,
            ShelfHeuristic::BestHeightFit => (shelf.height as i64 - height as i64).abs(),
            ShelfHeuristic::BestWidthFit => remaining_width - width as i64,
            ShelfHeuristic::WorstWidthFit => -(remaining_width - width as i64),
        }
    }
}

/// Horizontal band of the bin, filled from left to right.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Shelf {
    /// Left edge of the space still open on the shelf
    pub current_x: i32,
    pub start_y: i32,
    /// Height of the tallest item on the shelf
    pub height: i32,
    /// Items on the shelf, handed to the waste map when the shelf closes
    items: Vec<Rect>,
}

impl Shelf {
    fn new(start_y: i32, height: i32) -> Self {
        Shelf {
            current_x: 0,
            start_y,
            height,
            items: vec![],
        }
    }

    /// Unused regions of the shelf: above each item and the strip right of the last item.
    fn gaps(&self, bin_width: i32) -> impl Iterator<Item = Rect> + '_ {
        let above_items = self
            .items
            .iter()
            .filter(|r| r.height < self.height)
            .map(|r| Rect::new(r.x, r.bottom(), r.width, self.height - r.height));
        let trailing = (self.current_x < bin_width && self.height > 0).then(|| {
            Rect::new(
                self.current_x,
                self.start_y,
                bin_width - self.current_x,
                self.height,
            )
        });
        above_items.chain(trailing)
    }
}

/// Packer that stacks horizontal shelves from the top of the bin downward.
/// Only the last shelf may still grow in height.
///
/// With a waste map, the unused parts of a shelf are recovered into an embedded
/// [`GuillotineBinPack`] once the shelf is closed.
#[derive(Clone, Debug)]
pub struct ShelfBinPack {
    bin_width: i32,
    bin_height: i32,
    shelves: Vec<Shelf>,
    used: Vec<Rect>,
    waste_map: Option<GuillotineBinPack>,
}

impl ShelfBinPack {
    pub fn new(bin_width: i32, bin_height: i32, use_waste_map: bool) -> Result<Self> {
        ensure_positive_size(bin_width, bin_height)?;
        Ok(Self {
            bin_width,
            bin_height,
            shelves: vec![Shelf::new(0, 0)],
            used: vec![],
            waste_map: use_waste_map.then(|| GuillotineBinPack::new_waste_map(bin_width, bin_height)),
        })
    }

    pub fn insert(
        &mut self,
        width: i32,
        height: i32,
        heuristic: ShelfHeuristic,
    ) -> Result<Option<Rect>> {
        ensure_positive_size(width, height)?;

        if let Some(waste_map) = self.waste_map.as_mut() {
            let node = waste_map.insert(
                width,
                height,
                true,
                FreeRectChoice::BestShortSideFit,
                SplitRule::MaximizeArea,
            )?;
            if let Some(node) = node {
                trace!("[SHLF] placed {node} in the waste map");
                self.used.push(node);
                return Ok(Some(node));
            }
        }

        let last = self.shelves.len() - 1;
        let first = match heuristic {
            ShelfHeuristic::NextFit => last,
            _ => 0,
        };
        let mut best: Option<(usize, (i32, i32), i64)> = None;
        for (i, shelf) in self.shelves.iter().enumerate().skip(first) {
            let Some((w, h)) = self.orient_on_shelf(shelf, width, height, i == last) else {
                continue;
            };
            let score = heuristic.score(shelf, self.bin_width, w, h);
            if best.is_none_or(|(_, _, s)| score < s) {
                best = Some((i, (w, h), score));
            }
        }
        if let Some((i, (w, h), _)) = best {
            return Ok(Some(self.add_to_shelf(i, w, h)));
        }

        //no shelf fits, open a new one with the long side laid horizontally
        let (w, h) = match width < height && height <= self.bin_width {
            true => (height, width),
            false => (width, height),
        };
        if w > self.bin_width || !self.can_start_new_shelf(h) {
            trace!("[SHLF] no room for {width}x{height}");
            return Ok(None);
        }
        self.start_new_shelf(h);
        Ok(Some(self.add_to_shelf(self.shelves.len() - 1, w, h)))
    }

    /// Orientation in which the item goes on `shelf`, trying the preferred one first.
    fn orient_on_shelf(
        &self,
        shelf: &Shelf,
        width: i32,
        height: i32,
        can_resize: bool,
    ) -> Option<(i32, i32)> {
        let max_height = match can_resize {
            true => self.bin_height - shelf.start_y,
            false => shelf.height,
        };
        let fits = |&(w, h): &(i32, i32)| w <= self.bin_width - shelf.current_x && h <= max_height;
        let preferred = self.rotate_to_shelf(shelf, width, height);
        let other = (preferred.1, preferred.0);
        [preferred, other].into_iter().find(fits)
    }

    /// Preferred orientation on `shelf`: long side upright when it fits the shelf height
    /// or the long side no longer fits horizontally, long side horizontal when standing
    /// it up would raise the shelf.
    fn rotate_to_shelf(&self, shelf: &Shelf, width: i32, height: i32) -> (i32, i32) {
        let remaining_width = self.bin_width - shelf.current_x;
        let stand_up = width > height && (width > remaining_width || width < shelf.height);
        let lay_down = width < height && height > shelf.height && height <= remaining_width;
        match stand_up || lay_down {
            true => (height, width),
            false => (width, height),
        }
    }

    fn add_to_shelf(&mut self, index: usize, width: i32, height: i32) -> Rect {
        let shelf = &mut self.shelves[index];
        let node = Rect::new(shelf.current_x, shelf.start_y, width, height);
        shelf.current_x += width;
        shelf.height = shelf.height.max(height);
        shelf.items.push(node);
        self.used.push(node);

        trace!("[SHLF] placed {node} on shelf {index}");
        debug_assert!(assertions::rects_within_bin(
            &[node],
            self.bin_width,
            self.bin_height
        ));
        node
    }

    fn can_start_new_shelf(&self, height: i32) -> bool {
        self.shelves
            .last()
            .is_some_and(|s| height <= self.bin_height - (s.start_y + s.height))
    }

    fn start_new_shelf(&mut self, height: i32) {
        let last = self.shelves.len() - 1;
        debug_assert!(self.shelves[last].height > 0);
        if self.waste_map.is_some() {
            self.move_shelf_to_waste_map(last);
        }
        let start_y = self.shelves[last].start_y + self.shelves[last].height;
        debug!("[SHLF] opening shelf {} at y: {start_y}", self.shelves.len());
        self.shelves.push(Shelf::new(start_y, height));
    }

    /// Closes the shelf: its unused regions now belong to the waste map.
    fn move_shelf_to_waste_map(&mut self, index: usize) {
        let shelf = &mut self.shelves[index];
        let gaps = shelf.gaps(self.bin_width).collect::<Vec<_>>();
        shelf.items.clear();
        shelf.current_x = self.bin_width;

        if let Some(waste_map) = self.waste_map.as_mut() {
            gaps.into_iter().for_each(|gap| waste_map.recover(gap));
            waste_map.merge_free_rectangles();
        }
    }

    pub fn shelves(&self) -> &[Shelf] {
        &self.shelves
    }

    pub fn waste_map(&self) -> Option<&GuillotineBinPack> {
        self.waste_map.as_ref()
    }
}

impl Packer for ShelfBinPack {
    fn bin_size(&self) -> (i32, i32) {
        (self.bin_width, self.bin_height)
    }

    fn used_rectangles(&self) -> &[Rect] {
        &self.used
    }

    /// Waste map contents, the unused parts of open shelves and the space below the last shelf.
    fn free_rectangles(&self) -> Vec<Rect> {
        let on_shelves = self.shelves.iter().flat_map(|s| s.gaps(self.bin_width));
        let below = self.shelves.last().and_then(|s| {
            let top = s.start_y + s.height;
            (top < self.bin_height).then(|| Rect::new(0, top, self.bin_width, self.bin_height - top))
        });

        self.waste_map
            .iter()
            .flat_map(|w| w.free_list().iter().copied())
            .chain(on_shelves)
            .chain(below)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_is_stood_up_to_fit_the_shelf_height() {
        let mut packer = ShelfBinPack::new(100, 100, false).unwrap();
        let first = packer.insert(40, 20, ShelfHeuristic::FirstFit).unwrap();
        assert_eq!(first, Some(Rect::new(0, 0, 40, 20)));
        //15 < 20: rotating keeps the shelf height
        let second = packer.insert(15, 10, ShelfHeuristic::FirstFit).unwrap();
        assert_eq!(second, Some(Rect::new(40, 0, 10, 15)));
    }

    #[test]
    fn closed_shelf_is_recovered_into_waste_map() {
        let mut packer = ShelfBinPack::new(100, 50, true).unwrap();
        packer.insert(60, 30, ShelfHeuristic::NextFit).unwrap();
        //fits the first shelf in neither orientation
        let second = packer.insert(60, 20, ShelfHeuristic::NextFit).unwrap();
        assert_eq!(second, Some(Rect::new(0, 30, 60, 20)));
        assert_eq!(packer.shelves().len(), 2);

        //the trailing strip of the first shelf
        let waste_map = packer.waste_map().unwrap();
        assert_eq!(waste_map.free_list(), &[Rect::new(60, 0, 40, 30)]);

        let in_waste = packer.insert(40, 30, ShelfHeuristic::NextFit).unwrap();
        assert_eq!(in_waste, Some(Rect::new(60, 0, 40, 30)));
    }

    #[test]
    fn best_height_fit_counts_the_raise_of_the_last_shelf() {
        let mut packer = ShelfBinPack::new(100, 100, false).unwrap();
        let heuristic = ShelfHeuristic::BestHeightFit;
        assert_eq!(packer.insert(90, 30, heuristic).unwrap(), Some(Rect::new(0, 0, 90, 30)));
        assert_eq!(packer.insert(95, 20, heuristic).unwrap(), Some(Rect::new(0, 30, 95, 20)));

        //2 below the first shelf beats raising the last one by 8
        let node = packer.insert(5, 28, heuristic).unwrap();
        assert_eq!(node, Some(Rect::new(90, 0, 5, 28)));
        assert_eq!(packer.shelves()[1].height, 20);
    }
}

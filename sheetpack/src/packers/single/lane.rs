use crate::geometry::Rect;
use crate::util::FPA;

/// Orientation of an item on the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Long side along the X-axis
    Horizontal,
    /// Long side along the Y-axis
    Vertical,
}

/// Extent of one item in one orientation, with the rotation that produces it.
#[derive(Clone, Copy, Debug)]
pub struct Footprint {
    /// Rotation relative to the requested item, in degrees (0 or 90)
    pub angle: f64,
    pub width: f64,
    pub height: f64,
}

impl Footprint {
    /// Both footprints of a `width × height` item: `(horizontal, vertical)`.
    pub fn of_item(width: i32, height: i32) -> (Footprint, Footprint) {
        let long = width.max(height) as f64;
        let short = width.min(height) as f64;
        let (h_angle, v_angle) = match width >= height {
            true => (0.0, 90.0),
            false => (90.0, 0.0),
        };
        //a square never needs a rotation
        let v_angle = if width == height { 0.0 } else { v_angle };

        let horizontal = Footprint {
            angle: h_angle,
            width: long,
            height: short,
        };
        let vertical = Footprint {
            angle: v_angle,
            width: short,
            height: long,
        };
        (horizontal, vertical)
    }
}

/// Item position produced by a lane, in sheet coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Placement {
    pub angle: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Converts to a sheet rectangle of the requested `width × height` item.
    pub fn to_rect(&self, width: i32, height: i32) -> Rect {
        let (w, h) = match FPA(self.angle) == FPA(90.0) {
            true => (height, width),
            false => (width, height),
        };
        debug_assert!(FPA(w as f64) == FPA(self.width) && FPA(h as f64) == FPA(self.height));
        Rect::new(FPA(self.x).to_grid(), FPA(self.y).to_grid(), w, h)
    }
}

/// Part of the sheet a lane is allowed to fill.
#[derive(Clone, Copy, Debug)]
pub struct Region {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub height: f64,
}

/// Open position in a column and the length still available below it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slot {
    pub x: f64,
    pub y: f64,
    pub available: f64,
}

/// Where the next item of a lane goes.
#[derive(Clone, Copy, Debug)]
pub enum Frontier {
    /// All columns are complete, the next item opens a fresh column at the slot
    Flush(Slot),
    /// The last column still has room at `open`, the column after it starts at `flush`
    Stepped { open: Slot, flush: Slot },
}

impl Frontier {
    pub fn next_slot(&self) -> Slot {
        match self {
            Frontier::Flush(slot) => *slot,
            Frontier::Stepped { open, .. } => *open,
        }
    }

    /// Right edge of the columns opened so far.
    pub fn extent(&self) -> f64 {
        match self {
            Frontier::Flush(slot) => slot.x,
            Frontier::Stepped { flush, .. } => flush.x,
        }
    }
}

/// Region of the sheet filled column by column with items of a single orientation.
/// Columns grow downward from `y_min` and are laid left to right from `x_min`.
#[derive(Clone, Debug)]
pub struct Lane {
    footprint: Footprint,
    region: Region,
    frontier: Frontier,
    placements: Vec<Placement>,
}

impl Lane {
    pub fn new(footprint: Footprint, region: Region) -> Self {
        Lane {
            footprint,
            region,
            frontier: Frontier::Flush(Self::column_start(&region, region.x_min)),
            placements: vec![],
        }
    }

    fn column_start(region: &Region, x: f64) -> Slot {
        Slot {
            x,
            y: region.y_min,
            available: region.height,
        }
    }

    /// Number of items stacked in one full column
    pub fn per_column(&self) -> usize {
        count_fitting(self.region.height, self.footprint.height)
    }

    /// Number of full columns the region can hold
    pub fn max_columns(&self) -> usize {
        count_fitting(self.region.x_max - self.region.x_min, self.footprint.width)
    }

    /// Next slot, if an item still fits in it.
    pub fn peek(&self) -> Option<Slot> {
        let slot = self.frontier.next_slot();
        let fits_width = FPA(slot.x + self.footprint.width) <= FPA(self.region.x_max);
        let fits_height = FPA(self.footprint.height) <= FPA(slot.available);
        (fits_width && fits_height).then_some(slot)
    }

    /// Places the next item, `None` if the lane is full.
    pub fn advance(&mut self) -> Option<Placement> {
        let slot = self.peek()?;
        let Footprint {
            angle,
            width,
            height,
            ..
        } = self.footprint;
        let placement = Placement {
            angle,
            x: slot.x,
            y: slot.y,
            width,
            height,
        };

        let below = Slot {
            x: slot.x,
            y: slot.y + height,
            available: slot.available - height,
        };
        let flush = match self.frontier {
            Frontier::Flush(s) => Self::column_start(&self.region, s.x + width),
            Frontier::Stepped { flush, .. } => flush,
        };
        self.frontier = match FPA(height) <= FPA(below.available) {
            true => Frontier::Stepped { open: below, flush },
            false => Frontier::Flush(flush),
        };
        self.placements.push(placement);
        Some(placement)
    }

    /// Places up to `n` items, returns how many were placed.
    pub fn fill(&mut self, n: usize) -> usize {
        (0..n).take_while(|_| self.advance().is_some()).count()
    }

    /// Right edge of the lane's columns, `x_min` while empty.
    pub fn extent(&self) -> f64 {
        self.frontier.extent()
    }

    /// Extent after one more item is placed.
    pub fn extent_after_advance(&self) -> f64 {
        match self.frontier {
            Frontier::Flush(slot) => slot.x + self.footprint.width,
            Frontier::Stepped { flush, .. } => flush.x,
        }
    }

    /// Removes every item of the last column, which becomes the next column to open.
    /// Returns the number of items removed.
    pub fn retract_last_column(&mut self) -> usize {
        let Some(column_x) = self.placements.last().map(|p| p.x) else {
            return 0;
        };
        let keep = self
            .placements
            .iter()
            .rposition(|p| FPA(p.x) != FPA(column_x))
            .map_or(0, |i| i + 1);
        let removed = self.placements.len() - keep;
        self.placements.truncate(keep);
        self.frontier = Frontier::Flush(Self::column_start(&self.region, column_x));
        removed
    }

    /// Narrows the region from the right, columns beyond `x_max` stay untouched.
    pub fn restrict_x_max(&mut self, x_max: f64) {
        self.region.x_max = x_max;
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }
}

/// How many `size` lengths fit in `length`, tolerant to rounding noise.
pub fn count_fitting(length: f64, size: f64) -> usize {
    FPA(length).whole_steps(size)
}

use crate::packers::single::lane::{
    Footprint, Frontier, Lane, Orientation, Placement, Region, count_fitting,
};
use crate::util::{FPA, SingleBinConfig};
use anyhow::{Result, bail};
use log::{error, trace};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

/// Family of the layout a [`Candidate`] was built with.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Horizontal columns, completed by vertical items
    AllHorizontal,
    /// Vertical columns, topped up with horizontal items
    AllVertical,
    /// A vertical band above a horizontal band, grown side by side
    Mixed,
}

/// Complete solution of one layout family.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub kind: LayoutKind,
    pub placements: Vec<Placement>,
    /// Right edge of the rightmost item, 0 when empty
    pub max_x: f64,
}

impl Candidate {
    fn from_lanes<'a>(kind: LayoutKind, lanes: impl IntoIterator<Item = &'a Lane>) -> Self {
        let placements = lanes
            .into_iter()
            .flat_map(|l| l.placements().iter().copied())
            .collect::<Vec<_>>();
        let max_x = placements.iter().map(|p| p.right()).fold(0.0, f64::max);
        Candidate {
            kind,
            placements,
            max_x,
        }
    }

    fn empty(kind: LayoutKind) -> Self {
        Candidate {
            kind,
            placements: vec![],
            max_x: 0.0,
        }
    }

    pub fn count(&self) -> usize {
        self.placements.len()
    }

    /// More items first, then the smaller max-X extent.
    pub fn is_better_than(&self, other: &Candidate) -> bool {
        match self.count().cmp(&other.count()) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => FPA(self.max_x) < FPA(other.max_x),
        }
    }

    fn best(self, other: Candidate) -> Candidate {
        match other.is_better_than(&self) {
            true => other,
            false => self,
        }
    }
}

/// Builds the layouts of `quantity` identical items on a `sheet_width × sheet_height` sheet.
pub struct LayoutBuilder {
    sheet_width: f64,
    sheet_height: f64,
    horizontal: Footprint,
    vertical: Footprint,
    quantity: usize,
    config: SingleBinConfig,
}

impl LayoutBuilder {
    pub fn new(
        sheet: (i32, i32),
        item: (i32, i32),
        quantity: usize,
        config: SingleBinConfig,
    ) -> Self {
        let (horizontal, vertical) = Footprint::of_item(item.0, item.1);
        LayoutBuilder {
            sheet_width: sheet.0 as f64,
            sheet_height: sheet.1 as f64,
            horizontal,
            vertical,
            quantity,
            config,
        }
    }

    fn full_sheet(&self) -> Region {
        Region {
            x_min: 0.0,
            x_max: self.sheet_width,
            y_min: 0.0,
            height: self.sheet_height,
        }
    }

    fn long(&self) -> f64 {
        self.horizontal.width
    }

    fn short(&self) -> f64 {
        self.horizontal.height
    }

    /// Full horizontal columns first, the remainder either as vertical columns behind them
    /// or as a partial horizontal column topped up with vertical items.
    pub fn all_horizontal(&self) -> Candidate {
        let full = self.full_sheet();
        let mut lane = Lane::new(self.horizontal, full);
        let per_column = lane.per_column();
        if per_column == 0 {
            return Candidate::empty(LayoutKind::AllHorizontal);
        }
        let n_columns = usize::min(self.quantity / per_column, lane.max_columns());
        lane.fill(n_columns * per_column);

        let remaining = self.quantity - lane.len();
        if remaining == 0 {
            return Candidate::from_lanes(LayoutKind::AllHorizontal, [&lane]);
        }
        let x0 = lane.extent();

        let mut tail = Lane::new(self.vertical, Region { x_min: x0, ..full });
        tail.fill(remaining);
        let columns_only = Candidate::from_lanes(LayoutKind::AllHorizontal, [&lane, &tail]);

        let mut partial = lane.clone();
        let k = partial.fill(usize::min(remaining, per_column));
        if k == 0 {
            return columns_only;
        }
        let column_end = x0 + self.long();
        let stacked = k as f64 * self.short();
        let infill_region = Region {
            x_min: x0,
            x_max: column_end,
            y_min: stacked,
            height: self.sheet_height - stacked,
        };
        let mut infill = Lane::new(self.vertical, infill_region);
        let left = remaining - k - infill.fill(remaining - k);
        let mut tail = Lane::new(
            self.vertical,
            Region {
                x_min: column_end,
                ..full
            },
        );
        tail.fill(left);
        let with_infill =
            Candidate::from_lanes(LayoutKind::AllHorizontal, [&partial, &infill, &tail]);

        trace!(
            "[SBP] all-horizontal: {} (columns only) vs {} (partial column)",
            columns_only.count(),
            with_infill.count()
        );
        columns_only.best(with_infill)
    }

    /// Vertical columns, with horizontal items in the band left below the full rows.
    /// Trailing vertical columns move into that band while this improves the layout.
    pub fn all_vertical(&self) -> Candidate {
        let mut lane = Lane::new(self.vertical, self.full_sheet());
        let per_column = lane.per_column();
        if per_column == 0 {
            return Candidate::empty(LayoutKind::AllVertical);
        }
        lane.fill(self.quantity);
        let plain = Candidate::from_lanes(LayoutKind::AllVertical, [&lane]);

        let rows_end = per_column as f64 * self.long();
        let band = Region {
            x_min: 0.0,
            x_max: lane.extent(),
            y_min: rows_end,
            height: self.sheet_height - rows_end,
        };
        let mut infill = Lane::new(self.horizontal, band);
        if infill.per_column() == 0 {
            return plain;
        }
        infill.fill(self.quantity - lane.len());
        let mut current = Candidate::from_lanes(LayoutKind::AllVertical, [&lane, &infill]);

        loop {
            let mut trial_lane = lane.clone();
            let k = trial_lane.retract_last_column();
            if k == 0 {
                break;
            }
            let mut trial_infill = infill.clone();
            trial_infill.restrict_x_max(trial_lane.extent());
            if trial_infill.fill(k) < k {
                break;
            }
            let trial = Candidate::from_lanes(LayoutKind::AllVertical, [&trial_lane, &trial_infill]);
            if !trial.is_better_than(&current) {
                break;
            }
            trace!("[SBP] all-vertical: moved {k} items into the band");
            (lane, infill, current) = (trial_lane, trial_infill, trial);
        }

        plain.best(current)
    }

    /// Vertical lane in the top band and horizontal lane in the bottom band, each step
    /// extending the lane that keeps the overall extent smallest.
    /// `None` when both orientations cannot be stacked in the sheet height.
    pub fn mixed(&self) -> Result<Option<Candidate>> {
        let Some((rows_v, rows_h)) = self.height_split() else {
            return Ok(None);
        };
        let split_y = rows_v as f64 * self.long();
        let mut vertical = Lane::new(
            self.vertical,
            Region {
                x_min: 0.0,
                x_max: self.sheet_width,
                y_min: 0.0,
                height: split_y,
            },
        );
        let mut horizontal = Lane::new(
            self.horizontal,
            Region {
                x_min: 0.0,
                x_max: self.sheet_width,
                y_min: split_y,
                height: rows_h as f64 * self.short(),
            },
        );

        let mut placed = 0;
        while placed < self.quantity {
            let Some(target) = next_lane(&vertical, &horizontal)? else {
                break;
            };
            match target {
                Orientation::Vertical => vertical.advance(),
                Orientation::Horizontal => horizontal.advance(),
            };
            placed += 1;
        }

        if placed == self.quantity {
            self.trade_columns(&mut vertical, &mut horizontal);
        }
        Ok(Some(Candidate::from_lanes(
            LayoutKind::Mixed,
            [&vertical, &horizontal],
        )))
    }

    /// Split of the sheet height into `(vertical rows, horizontal rows)`, both at least one,
    /// leaving the least unused height. Ties favour more vertical rows.
    fn height_split(&self) -> Option<(usize, usize)> {
        if FPA(self.long() + self.short()) > FPA(self.sheet_height) {
            return None;
        }
        let max_rows_v = count_fitting(self.sheet_height, self.long());
        (1..=max_rows_v)
            .filter_map(|rows_v| {
                let left = self.sheet_height - rows_v as f64 * self.long();
                let rows_h = count_fitting(left, self.short());
                let unused = left - rows_h as f64 * self.short();
                (rows_h >= 1).then_some((rows_v, rows_h, unused))
            })
            .min_by_key(|&(rows_v, _, unused)| (OrderedFloat(unused), Reverse(rows_v)))
            .map(|(rows_v, rows_h, _)| (rows_v, rows_h))
    }

    /// Moves the last column of the lane reaching furthest into the other lane,
    /// as long as this shrinks the max-X extent by more than the threshold.
    fn trade_columns(&self, vertical: &mut Lane, horizontal: &mut Lane) {
        for _ in 0..self.quantity {
            let trade = match FPA(vertical.extent()).partial_cmp(&FPA(horizontal.extent())) {
                Some(Ordering::Greater) => self.try_trade(vertical, horizontal),
                Some(Ordering::Less) => self
                    .try_trade(horizontal, vertical)
                    .map(|(h, v)| (v, h)),
                _ => None,
            };
            let Some((v, h)) = trade else {
                return;
            };
            trace!(
                "[SBP] mixed: column traded, extent {} -> {}",
                f64::max(vertical.extent(), horizontal.extent()),
                f64::max(v.extent(), h.extent())
            );
            (*vertical, *horizontal) = (v, h);
        }
    }

    /// Retracts the last column of `trailing` into `receiving`.
    /// Returns the updated `(trailing, receiving)` if the trade is accepted.
    fn try_trade(&self, trailing: &Lane, receiving: &Lane) -> Option<(Lane, Lane)> {
        let max_x = trailing.extent();
        let column_width = receiving.footprint().width;
        let receiving_was_flush = matches!(receiving.frontier(), Frontier::Flush(_));

        let mut t = trailing.clone();
        let k = t.retract_last_column();
        if k == 0 {
            return None;
        }
        let mut r = receiving.clone();
        if r.fill(k) < k {
            return None;
        }

        let gain = max_x - f64::max(t.extent(), r.extent());
        let threshold = self.config.trade_threshold.unwrap_or(0.5 * column_width);
        //two items that share a single fresh column are worth any positive gain
        let two_for_one = k == 2
            && receiving_was_flush
            && FPA(r.extent() - receiving.extent()) == FPA(column_width)
            && FPA(gain) > FPA(0.0);

        (FPA(gain) > FPA(threshold) || two_for_one).then_some((t, r))
    }
}

/// Lane that receives the next item of the mixed layout, `None` when both are full.
///
/// A lane qualifies if its next slot does not start beyond the other lane's extent.
/// Since a lane's slot never lies beyond its own extent, at least one of the two always qualifies.
fn next_lane(vertical: &Lane, horizontal: &Lane) -> Result<Option<Orientation>> {
    let (sv, sh) = match (vertical.peek(), horizontal.peek()) {
        (None, None) => return Ok(None),
        (Some(_), None) => return Ok(Some(Orientation::Vertical)),
        (None, Some(_)) => return Ok(Some(Orientation::Horizontal)),
        (Some(sv), Some(sh)) => (sv, sh),
    };
    let vertical_ok = FPA(sv.x) <= FPA(horizontal.extent());
    let horizontal_ok = FPA(sh.x) <= FPA(vertical.extent());

    match (vertical_ok, horizontal_ok) {
        (true, false) => Ok(Some(Orientation::Vertical)),
        (false, true) => Ok(Some(Orientation::Horizontal)),
        (true, true) => {
            let after_v = f64::max(vertical.extent_after_advance(), horizontal.extent());
            let after_h = f64::max(horizontal.extent_after_advance(), vertical.extent());
            let v_key = (FPA(after_v), FPA(sv.x));
            let h_key = (FPA(after_h), FPA(sh.x));
            match v_key <= h_key {
                true => Ok(Some(Orientation::Vertical)),
                false => Ok(Some(Orientation::Horizontal)),
            }
        }
        (false, false) => {
            error!(
                "[SBP] mixed layout stalled: vertical slot at x {}, horizontal slot at x {}, extents {} and {}",
                sv.x,
                sh.x,
                vertical.extent(),
                horizontal.extent()
            );
            bail!("mixed layout stalled with room left in both lanes")
        }
    }
}

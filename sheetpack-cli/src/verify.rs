use anyhow::{Result, bail, ensure};
use itertools::Itertools;
use log::{debug, error};

use crate::runner::PlacedItem;

/// Checks a finished layout: every rectangle lies on the sheet, has the size of its item
/// (in either orientation) and no two rectangles overlap.
pub fn verify_placements(
    placed: &[PlacedItem],
    sizes: &[(i32, i32)],
    bin_width: i32,
    bin_height: i32,
) -> Result<()> {
    for PlacedItem { item, rect } in placed {
        ensure!(*item < sizes.len(), "unknown item index: {item}");
        let (w, h) = sizes[*item];
        ensure!(
            rect.matches_size(w, h),
            "item {item} ({w}x{h}) placed as {rect}"
        );
        let in_bounds =
            rect.x >= 0 && rect.y >= 0 && rect.right() <= bin_width && rect.bottom() <= bin_height;
        if !in_bounds {
            error!("[VERIFY] item {item} at {rect} exceeds the {bin_width}x{bin_height} sheet");
            bail!("item {item} placed out of bounds");
        }
    }

    let overlapping = placed
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a.rect.intersects(&b.rect))
        .collect_vec();
    if !overlapping.is_empty() {
        for (a, b) in &overlapping {
            error!("[VERIFY] items {} {} and {} {} overlap", a.item, a.rect, b.item, b.rect);
        }
        bail!("{} overlapping pairs", overlapping.len());
    }

    debug!("[VERIFY] {} placements are valid", placed.len());
    Ok(())
}

use crate::geometry::Rect;
use crate::packers::SkylineSegment;
use itertools::Itertools;
use log::error;
//Various checks to verify the correctness of a packer's state
//Used in debug_assert!() blocks

pub fn rects_are_disjoint(rects: &[Rect]) -> bool {
    match rects
        .iter()
        .tuple_combinations()
        .find(|(a, b)| a.intersects(b))
    {
        Some((a, b)) => {
            error!("overlapping rectangles: {a} and {b}");
            false
        }
        None => true,
    }
}

pub fn rects_within_bin(rects: &[Rect], bin_width: i32, bin_height: i32) -> bool {
    let bin = Rect::new(0, 0, bin_width, bin_height);
    match rects.iter().find(|r| !bin.contains(r)) {
        Some(r) => {
            error!("{r} exceeds the bin of {bin_width}x{bin_height}");
            false
        }
        None => true,
    }
}

/// Placed and free area together cover the bin exactly.
pub fn area_is_conserved(used: &[Rect], free: &[Rect], bin_width: i32, bin_height: i32) -> bool {
    let used_area: i64 = used.iter().map(Rect::area).sum();
    let free_area: i64 = free.iter().map(Rect::area).sum();
    let bin_area = bin_width as i64 * bin_height as i64;
    if used_area + free_area != bin_area {
        error!("used ({used_area}) + free ({free_area}) != bin area ({bin_area})");
        return false;
    }
    true
}

/// No free rectangle lies entirely inside another one.
pub fn free_list_is_pruned(free: &[Rect]) -> bool {
    free.iter()
        .tuple_combinations()
        .all(|(a, b)| !a.is_contained_in(b) && !b.is_contained_in(a))
}

/// Segments are sorted, contiguous and span `[0, bin_width)`. Adjacent segments differ in height.
pub fn skyline_is_valid(skyline: &[SkylineSegment], bin_width: i32, bin_height: i32) -> bool {
    let starts_at_origin = skyline.first().is_some_and(|s| s.x == 0);
    let contiguous = skyline
        .iter()
        .tuple_windows()
        .all(|(a, b)| a.x + a.width == b.x && a.y != b.y);
    let spans_bin = skyline.last().is_some_and(|s| s.x + s.width == bin_width);
    let in_bounds = skyline
        .iter()
        .all(|s| s.width > 0 && s.y >= 0 && s.y <= bin_height);

    starts_at_origin && contiguous && spans_bin && in_bounds
}

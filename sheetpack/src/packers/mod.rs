mod guillotine;
mod maxrects;
mod shelf;
mod single;
mod skyline;

#[doc(inline)]
pub use guillotine::{FreeRectChoice, GuillotineBinPack, SplitRule};
#[doc(inline)]
pub use maxrects::{MaxRectsBinPack, MaxRectsHeuristic};
#[doc(inline)]
pub use shelf::{Shelf, ShelfBinPack, ShelfHeuristic};
#[doc(inline)]
pub use single::{LayoutKind, LayoutSummary, SingleBinPack};
#[doc(inline)]
pub use skyline::{SkylineBinPack, SkylineHeuristic, SkylineSegment};

use crate::geometry::Rect;

/// Read-only view shared by all packers, used for diagnostics and verification.
pub trait Packer {
    /// Width and height of the sheet
    fn bin_size(&self) -> (i32, i32);

    /// All rectangles placed so far, in placement order
    fn used_rectangles(&self) -> &[Rect];

    /// Snapshot of the free space as tracked by the packer.
    /// Overlapping for MaxRects, disjoint for the others.
    fn free_rectangles(&self) -> Vec<Rect>;

    /// Fraction of the sheet area covered by placed rectangles
    fn occupancy(&self) -> f64 {
        let (width, height) = self.bin_size();
        let used_area: i64 = self.used_rectangles().iter().map(Rect::area).sum();
        used_area as f64 / (width as f64 * height as f64)
    }
}

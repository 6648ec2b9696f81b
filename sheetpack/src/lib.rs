//! Rectangle packing engines for fixed-size sheets.
//!
//! Every packer owns its free-space bookkeeping and places items one call at a time:
//! [`MaxRectsBinPack`](packers::MaxRectsBinPack), [`GuillotineBinPack`](packers::GuillotineBinPack),
//! [`SkylineBinPack`](packers::SkylineBinPack), [`ShelfBinPack`](packers::ShelfBinPack)
//! and the uniform-item layout engine [`SingleBinPack`](packers::SingleBinPack).

/// Geometric primitives
pub mod geometry;

/// Placement strategies and their free-space representations
pub mod packers;

/// Helper functions which do not belong to any specific module
pub mod util;

/// Set of functions used throughout assure the correctness of the library.
pub mod assertions;

mod config;
mod fpa;

#[doc(inline)]
pub use config::SingleBinConfig;
#[doc(inline)]
pub use fpa::FPA;

use anyhow::{Result, ensure};

/// Central guard for every size handed to a packer (bins and items alike).
/// Non-positive dimensions are invalid input, not a capacity failure.
pub fn ensure_positive_size(width: i32, height: i32) -> Result<()> {
    ensure!(
        width > 0 && height > 0,
        "invalid size, width: {width}, height: {height} (both must be > 0)"
    );
    Ok(())
}

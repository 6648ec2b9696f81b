use serde::{Deserialize, Serialize};

///Configuration of the [`SingleBinPack`](crate::packers::SingleBinPack) layout engine
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct SingleBinConfig {
    ///Minimum reduction of the max-X extent before the optimization pass moves a trailing column to the other lane.
    ///Defaults to half the column width of the receiving lane when undefined.
    #[serde(default)]
    pub trade_threshold: Option<f64>,
}

use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::runner::RunReport;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RunOutput {
    pub config: RunConfig,
    #[serde(flatten)]
    pub report: RunReport,
}

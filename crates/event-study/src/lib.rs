#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/event-study/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cumulative;
pub mod deltas;
pub mod error;
pub mod frame;
pub mod merge;
pub mod pipeline;
pub mod registry;
pub mod subperiod;
pub mod summary;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export core types
pub use config::{EventStudyConfig, WindowConfig};
pub use error::{EventStudyError, Result};
pub use pipeline::{EventStudy, EventStudyOutput};
pub use registry::{SourceFrames, TableInfo, TableRegistry};
pub use traits::{ConfigurableTable, SummaryTable, TableSource};
pub use types::{
    AnnualRecord, ClassifiedRecord, DailyReturnRecord, EventDay, EventKey, NewsClass, SubPeriod,
    SubPeriodReturn,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

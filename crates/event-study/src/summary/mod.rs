//! Summary tables - grouped descriptive statistics over pipeline outputs
//!
//! Each table is a pure polars reduction of one stage output: the classified
//! annual view, the sub-period hand-off table or the full event window.

pub mod curves;
pub mod lag;
pub mod news_counts;
pub mod separation;

pub use curves::ReturnCurves;
pub use lag::{LagDeltaMedians, LagPercentiles, LagPercentilesConfig};
pub use news_counts::NewsCounts;
pub use separation::CarSeparation;

//! Ground truth from a labeling job.
//!
//! - Source: resolves the job's manifest, decodes its records and fetches
//!   annotation payloads
//! - Index: query → documents and document → truth lookups built from them

mod index;
mod source;

pub use index::{GroundTruthIndex, IndexStats, QueryStats};
pub use source::GroundTruthSource;

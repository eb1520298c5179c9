pub mod prediction_map;
pub mod score_rank;
pub mod score_ranks;

pub use prediction_map::PredictionMap;
pub use score_rank::{score_rank, score_rank_excluding};
pub use score_ranks::score_ranks;

use super::error::Result;
use super::taxdb::TaxonomyIndex;
use super::types::{ClassificationRecord, GroundTruthRecord, RankResult};

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod predictor;
pub mod sources;
pub mod stats;

pub use engine::{Matchup, ScoringEngine, SportProfile};
pub use error::{PredictError, PredictResult};
pub use predictor::{BatchOutcome, MatchupRequest, Predictor};

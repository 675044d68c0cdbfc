//! Collaborators the predictor reads from: game logs, injuries, pitchers,
//! ballparks and weather. Each sits behind a trait so tests can swap in
//! in-process fakes.

pub mod cache;
pub mod espn;
pub mod files;
pub mod parks;
pub mod provider;
pub mod weather;

pub use cache::CachedInjuries;
pub use espn::EspnInjuries;
pub use files::{JsonGameLogSource, JsonPitcherSource};
pub use parks::ParkFactorTable;
pub use provider::{InjuryFeed, InjurySource, PitcherSource, StatsSource, WeatherSource};
pub use weather::WttrWeather;

//! Domain types shared across the engine.

pub mod alert;
pub mod bar;
pub mod feature;
pub mod label;
pub mod position;
pub mod prediction;
pub mod trade;

pub use alert::{AlertEvent, Severity};
pub use bar::{is_strictly_ordered, Bar};
pub use feature::FeatureVector;
pub use label::Label;
pub use position::{Position, PositionSide};
pub use prediction::PredictionRecord;
pub use trade::Trade;

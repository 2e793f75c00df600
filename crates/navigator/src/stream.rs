pub mod accumulator;
pub mod ndjson;

pub use accumulator::{SnapshotSink, StreamingAnswerAccumulator, TurnState, DEFAULT_PACING};
pub use ndjson::{decode_events, NdjsonDecoder};

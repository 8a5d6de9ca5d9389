//! Audio subsystem: the playback element contract and its `rodio` backend.
//!
//! `RodioElement` owns a dedicated audio thread. Commands travel over an
//! `mpsc` channel, notifications come back as `MediaEvent`s, and the latest
//! position/duration/volume snapshot is shared through an `ElementHandle`.

mod element;
mod sink;
mod thread;
mod types;

pub use element::RodioElement;
pub use types::*;

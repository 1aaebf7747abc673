//! Response decoding
//!
//! Turns the raw body of a prediction call into a [`PredictionResult`].
//! The output kind is chosen by which data field the service filled in,
//! checked in this order: regions, frames, concepts, text, image, audio.
//! Decoding never filters; thresholds are applied remotely.

mod decoder;

#[cfg(test)]
mod tests;

pub use decoder::decode;

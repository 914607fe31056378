//! Decode and render collaborators around the headless core

mod decoder;
mod encoder;

pub use decoder::{decode, decode_bytes, DecodedImage};
pub use encoder::write_png;

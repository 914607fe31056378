//! Image file discovery

mod scanner;

pub use scanner::{generate_image_id, scan, DiscoveredFile};

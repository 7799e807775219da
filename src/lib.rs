//! # mcapshrink
//!
//! Rewrites an MCAP recording, losslessly compressing every ROS1
//! `sensor_msgs/Image` message into a `foxglove_msgs/ShrunkImage` and
//! copying every other message through byte-for-byte, in input order.
//!
//! 8-bit grayscale and color images become lossless WebP; 16-bit grayscale
//! becomes 16-bit grayscale PNG; encodings with no compressor pass through
//! with their raw pixels and an empty format tag. The schema/channel
//! catalog is rewritten lazily with create-once semantics, so the output
//! contains exactly one schema per distinct input schema name.
//!
//! ## Usage
//!
//! ```no_run
//! use std::io::BufWriter;
//!
//! let input = std::fs::read("input.mcap")?;
//! let profile = mcapshrink::container::read_profile(&input)?;
//!
//! let file = std::fs::File::create("output.mcap")?;
//! let writer = mcap::WriteOptions::new()
//!     .profile(profile)
//!     .create(BufWriter::new(file))?;
//! let mut sink = mcapshrink::container::McapSink::new(writer);
//!
//! let stats = mcapshrink::transcode(&input, &mut sink)?;
//! sink.finish()?;
//! println!("{} images shrunk", stats.images_shrunk);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod error;
mod lossless;

pub mod catalog;
pub mod container;
pub mod pipeline;
pub mod record;
pub mod shrink;
pub mod wire;

// Re-exports
pub use catalog::{Catalog, ChannelDesc, ContainerSink, SchemaDesc};
pub use error::ShrinkError;
pub use pipeline::{TranscodeStats, transcode};
pub use shrink::{Diagnostics, shrink_image};

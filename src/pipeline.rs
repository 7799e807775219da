//! Ordered streaming transcode loop.
//!
//! One message is fully processed (resolved, re-encoded or copied, appended)
//! before the next is read; output order equals input order, which is the
//! pipeline's primary observable property.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use mcap::MessageStream;

use crate::catalog::{Catalog, ChannelDesc, ContainerSink, SOURCE_IMAGE_SCHEMA, SchemaDesc};
use crate::error::ShrinkError;
use crate::record;
use crate::shrink::{Diagnostics, shrink_image};
use crate::wire::Cursor;

/// Counters reported after a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TranscodeStats {
    /// Messages appended; equals the input message count.
    pub messages: u64,
    /// `sensor_msgs/Image` messages re-encoded with a compressed payload.
    pub images_shrunk: u64,
    /// `sensor_msgs/Image` messages whose encoding had no compressor and
    /// were re-encoded with their raw pixels.
    pub images_passed_through: u64,
}

/// Transcodes every message of the MCAP file in `input` into `sink`,
/// in input order.
///
/// Messages on `sensor_msgs/Image` channels are decoded, compressed, and
/// re-encoded as `foxglove_msgs/ShrunkImage`; everything else is copied
/// byte-for-byte. The first failure aborts the run.
pub fn transcode(input: &[u8], sink: &mut dyn ContainerSink) -> Result<TranscodeStats, ShrinkError> {
    let mut catalog = Catalog::new();
    let mut diagnostics = Diagnostics::new();
    let mut stats = TranscodeStats::default();

    // mcap::Channel no longer carries its own input id, so channels are
    // told apart by the identity of the shared Arc the reader hands back
    // for every message on that channel.
    let mut channel_ids: HashMap<*const mcap::Channel<'_>, u16> = HashMap::new();

    for message in MessageStream::new(input)? {
        let message = message?;
        let channel = &message.channel;
        let schema = channel.schema.as_deref();

        let channel_ptr = Arc::as_ptr(channel);
        let next_id = channel_ids.len() as u16;
        let id = *channel_ids.entry(channel_ptr).or_insert(next_id);

        let desc = ChannelDesc {
            id,
            topic: &channel.topic,
            message_encoding: &channel.message_encoding,
            schema: schema.map(|s| SchemaDesc {
                name: &s.name,
                encoding: &s.encoding,
                data: &s.data,
            }),
        };
        let output_channel = catalog.resolve_channel(sink, &desc)?;

        let is_image = schema.is_some_and(|s| s.name == SOURCE_IMAGE_SCHEMA);
        let payload: Cow<'_, [u8]> = if is_image {
            let image = record::read_image(&mut Cursor::new(&message.data))?;
            let shrunk = shrink_image(&image, &mut diagnostics)?;
            if shrunk.format.is_empty() {
                stats.images_passed_through += 1;
            } else {
                stats.images_shrunk += 1;
            }
            Cow::Owned(record::encode_shrunk_image(&shrunk))
        } else {
            Cow::Borrowed(message.data.as_ref())
        };

        sink.write_message(
            output_channel,
            message.sequence,
            message.log_time,
            message.publish_time,
            &payload,
        )?;
        stats.messages += 1;
    }

    log::info!(
        "transcoded {} messages: {} images shrunk, {} passed through",
        stats.messages,
        stats.images_shrunk,
        stats.images_passed_through
    );
    Ok(stats)
}

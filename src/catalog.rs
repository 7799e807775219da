//! Streaming schema/channel remapping with create-once semantics.
//!
//! Output identifiers are assigned lazily, on the first message that needs
//! them, and reused for every later message referencing the same input
//! schema name or channel id. Entries are never revisited within a run.

use std::collections::HashMap;

use crate::error::ShrinkError;

/// Schema name whose messages get re-encoded.
pub const SOURCE_IMAGE_SCHEMA: &str = "sensor_msgs/Image";

/// Schema encoding kind the substitution applies to.
pub const ROS1_SCHEMA_ENCODING: &str = "ros1msg";

/// Schema name registered in place of [`SOURCE_IMAGE_SCHEMA`].
pub const SHRUNK_IMAGE_SCHEMA: &str = "foxglove_msgs/ShrunkImage";

/// Message definition registered for `foxglove_msgs/ShrunkImage`.
pub const SHRUNK_IMAGE_MSGDEF: &str = "\
Header header
uint32 height
uint32 width
string encoding
uint8 is_bigendian
uint32 step
string format
uint8[] data

================================================================================
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id";

/// Write half of the container capability.
///
/// Registrations return fresh output ids; message appends must land in the
/// output in call order.
pub trait ContainerSink {
    fn add_schema(&mut self, name: &str, encoding: &str, data: &[u8])
    -> Result<u16, ShrinkError>;

    fn add_channel(
        &mut self,
        schema_id: u16,
        topic: &str,
        message_encoding: &str,
    ) -> Result<u16, ShrinkError>;

    fn write_message(
        &mut self,
        channel_id: u16,
        sequence: u32,
        log_time: u64,
        publish_time: u64,
        data: &[u8],
    ) -> Result<(), ShrinkError>;
}

/// One input channel, as seen by the remapper.
#[derive(Clone, Copy, Debug)]
pub struct ChannelDesc<'a> {
    pub id: u16,
    pub topic: &'a str,
    pub message_encoding: &'a str,
    pub schema: Option<SchemaDesc<'a>>,
}

/// One input schema, as seen by the remapper.
#[derive(Clone, Copy, Debug)]
pub struct SchemaDesc<'a> {
    pub name: &'a str,
    pub encoding: &'a str,
    pub data: &'a [u8],
}

/// Lazily-built, deduplicated mapping from input schema names and channel
/// ids to output ids.
///
/// Schema identity is keyed by the declared type name alone, not by a
/// content hash of the definition: two input schemas sharing a name merge
/// into one output schema even if their definitions differ.
#[derive(Debug, Default)]
pub struct Catalog {
    schemas: HashMap<String, u16>,
    channels: HashMap<u16, u16>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output channel id for `channel`, registering its schema and the
    /// channel itself with the sink on first sight.
    ///
    /// Idempotent per input channel id: later calls return the cached id
    /// without touching the sink. Must be called before the corresponding
    /// message is appended.
    pub fn resolve_channel(
        &mut self,
        sink: &mut dyn ContainerSink,
        channel: &ChannelDesc<'_>,
    ) -> Result<u16, ShrinkError> {
        if let Some(&id) = self.channels.get(&channel.id) {
            return Ok(id);
        }

        let schema_id = match &channel.schema {
            Some(schema) => self.resolve_schema(sink, schema)?,
            // MCAP's sentinel for channels without a schema.
            None => 0,
        };

        let output_id = sink.add_channel(schema_id, channel.topic, channel.message_encoding)?;
        log::debug!(
            "registered channel {} for {} (input channel {})",
            output_id,
            channel.topic,
            channel.id
        );
        self.channels.insert(channel.id, output_id);
        Ok(output_id)
    }

    fn resolve_schema(
        &mut self,
        sink: &mut dyn ContainerSink,
        schema: &SchemaDesc<'_>,
    ) -> Result<u16, ShrinkError> {
        if let Some(&id) = self.schemas.get(schema.name) {
            return Ok(id);
        }

        let substitute =
            schema.encoding == ROS1_SCHEMA_ENCODING && schema.name == SOURCE_IMAGE_SCHEMA;
        let output_id = if substitute {
            sink.add_schema(
                SHRUNK_IMAGE_SCHEMA,
                ROS1_SCHEMA_ENCODING,
                SHRUNK_IMAGE_MSGDEF.as_bytes(),
            )?
        } else {
            sink.add_schema(schema.name, schema.encoding, schema.data)?
        };

        log::debug!("registered schema {} for {}", output_id, schema.name);
        self.schemas.insert(schema.name.to_string(), output_id);
        Ok(output_id)
    }
}

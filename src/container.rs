//! MCAP container adapters: input profile probe and the writer sink.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::io::{Seek, Write};
use std::sync::Arc;

use crate::catalog::ContainerSink;
use crate::error::ShrinkError;
use crate::wire::Cursor;

/// Leading magic bytes of every MCAP file.
const MCAP_MAGIC: &[u8] = b"\x89MCAP0\r\n";

/// Opcode of the Header record that immediately follows the magic.
const OP_HEADER: u8 = 0x01;

/// Profile string declared by the file's leading Header record.
///
/// The message iterator does not surface the file header, so this probes the
/// fixed layout directly: magic, then opcode byte, record length, and a
/// record body starting with the length-prefixed profile string, which is
/// the same little-endian u32-prefixed encoding the wire cursor reads.
pub fn read_profile(input: &[u8]) -> Result<String, ShrinkError> {
    let rest = input
        .strip_prefix(MCAP_MAGIC)
        .ok_or(ShrinkError::BadContainer("missing magic bytes"))?;

    let mut cur = Cursor::new(rest);
    if cur.read_u8()? != OP_HEADER {
        return Err(ShrinkError::BadContainer("first record is not a Header"));
    }
    let _record_len = cur.read_u64()?;
    cur.read_string()
}

/// Adapts [`mcap::Writer`] to [`ContainerSink`].
///
/// `mcap::Writer::add_channel` now takes a fully-formed `Channel` (with its
/// schema attached) rather than separate schema-id/topic/encoding arguments,
/// and registers the schema itself. This keeps the ids `ContainerSink`
/// hands back to [`crate::catalog::Catalog`] as plain local handles, resolved
/// to the actual `mcap::Schema` only once a channel is registered.
pub struct McapSink<W: Write + Seek> {
    writer: mcap::Writer<'static, W>,
    schemas: HashMap<u16, Arc<mcap::Schema<'static>>>,
    next_schema_id: u16,
}

impl<W: Write + Seek> McapSink<W> {
    pub fn new(writer: mcap::Writer<'static, W>) -> Self {
        Self {
            writer,
            schemas: HashMap::new(),
            next_schema_id: 1,
        }
    }

    pub fn finish(&mut self) -> mcap::McapResult<()> {
        self.writer.finish()
    }
}

impl<W: Write + Seek> ContainerSink for McapSink<W> {
    fn add_schema(
        &mut self,
        name: &str,
        encoding: &str,
        data: &[u8],
    ) -> Result<u16, ShrinkError> {
        let id = self.next_schema_id;
        self.next_schema_id += 1;
        self.schemas.insert(
            id,
            Arc::new(mcap::Schema {
                name: name.to_string(),
                encoding: encoding.to_string(),
                data: Cow::Owned(data.to_vec()),
            }),
        );
        Ok(id)
    }

    fn add_channel(
        &mut self,
        schema_id: u16,
        topic: &str,
        message_encoding: &str,
    ) -> Result<u16, ShrinkError> {
        let schema = if schema_id == 0 {
            None
        } else {
            self.schemas.get(&schema_id).cloned()
        };
        let channel = mcap::Channel {
            topic: topic.to_string(),
            schema,
            message_encoding: message_encoding.to_string(),
            metadata: BTreeMap::new(),
        };
        Ok(self.writer.add_channel(&channel)?)
    }

    fn write_message(
        &mut self,
        channel_id: u16,
        sequence: u32,
        log_time: u64,
        publish_time: u64,
        data: &[u8],
    ) -> Result<(), ShrinkError> {
        let header = mcap::records::MessageHeader {
            channel_id,
            sequence,
            log_time,
            publish_time,
        };
        Ok(self.writer.write_to_known_channel(&header, data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire;

    #[test]
    fn profile_of_a_written_file_reads_back() {
        let mut buf = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buf);
            let mut writer = mcap::WriteOptions::new()
                .profile("ros1")
                .create(cursor)
                .unwrap();
            mcap::Writer::finish(&mut writer).unwrap();
        }
        assert_eq!(read_profile(&buf).unwrap(), "ros1");
    }

    #[test]
    fn non_mcap_input_is_rejected() {
        assert!(matches!(
            read_profile(b"not an mcap file"),
            Err(ShrinkError::BadContainer(_))
        ));
        assert!(matches!(
            read_profile(&[]),
            Err(ShrinkError::BadContainer(_))
        ));
    }

    #[test]
    fn truncated_header_record_is_rejected() {
        // Magic plus opcode, but the record itself is cut short.
        let mut buf = MCAP_MAGIC.to_vec();
        wire::put_u8(&mut buf, OP_HEADER);
        wire::put_u32(&mut buf, 0);
        assert!(matches!(
            read_profile(&buf),
            Err(ShrinkError::TruncatedRecord { .. })
        ));
    }
}

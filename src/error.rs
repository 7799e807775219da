/// Errors from transcoding an MCAP recording.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShrinkError {
    #[error("record truncated: need {needed} more bytes, {available} available")]
    TruncatedRecord { needed: usize, available: usize },

    #[error(
        "invalid geometry for \"{encoding}\" image: \
         {width}x{height} with step {step}, but only {available} pixel bytes"
    )]
    ImageGeometry {
        encoding: String,
        width: u32,
        height: u32,
        step: u32,
        available: usize,
    },

    #[error("{format} encoder failed: {reason}")]
    Encode { format: &'static str, reason: String },

    #[error("not an MCAP file: {0}")]
    BadContainer(&'static str),

    #[error("container error: {0}")]
    Container(#[from] mcap::McapError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

use std::fmt::{Display, Formatter};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FeedError, FeedResult};

/// Tag byte of a codec descriptor frame.
pub const CODEC_TAG: u8 = 9;

/// Default tag used when encoding media fragments.
pub const FRAGMENT_TAG: u8 = 0;

/// One frame delivered by the transport, classified by its leading tag byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Codec(CodecDescriptor),
    /// Raw bytes handed to the sink verbatim, tag byte included. Must be
    /// non-empty and must not start with [`CODEC_TAG`].
    Fragment(Bytes),
}

impl Frame {
    pub fn parse(data: Bytes) -> FeedResult<Self> {
        match data.first() {
            None => Err(FeedError::EmptyFrame),
            Some(&CODEC_TAG) => Ok(Frame::Codec(CodecDescriptor::from_utf8_lossy(&data[1..]))),
            Some(_) => Ok(Frame::Fragment(data)),
        }
    }

    /// Wire representation. Fragments are already tagged and returned as is.
    pub fn encode(&self) -> Bytes {
        match self {
            Frame::Codec(descriptor) => {
                let codecs = descriptor.codecs().as_bytes();
                let mut buf = BytesMut::with_capacity(codecs.len() + 1);
                buf.put_u8(CODEC_TAG);
                buf.put_slice(codecs);
                buf.freeze()
            }
            Frame::Fragment(data) => {
                debug_assert!(
                    data.first().is_some_and(|&tag| tag != CODEC_TAG),
                    "fragment must start with a non-codec tag"
                );
                data.clone()
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Codec(_) => "codec",
            Frame::Fragment(_) => "fragment",
        }
    }
}

/// Codec string announced by the server, e.g. `avc1.64001f`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CodecDescriptor {
    codecs: String,
}

impl CodecDescriptor {
    pub fn new(codecs: impl Into<String>) -> Self {
        Self {
            codecs: codecs.into(),
        }
    }

    /// Invalid sequences become U+FFFD instead of failing the session.
    pub fn from_utf8_lossy(data: &[u8]) -> Self {
        Self::new(String::from_utf8_lossy(data).into_owned())
    }

    pub fn codecs(&self) -> &str {
        &self.codecs
    }

    /// Container mime type used to initialize the sink.
    pub fn mime_type(&self) -> String {
        format!("video/mp4; codecs=\"{}\"", self.codecs)
    }
}

impl Display for CodecDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.codecs)
    }
}

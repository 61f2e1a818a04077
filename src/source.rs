use std::io::Read;

/// The byte-source adapter for the input pipeline.
///
/// A [`Source`] collects the complete byte stream before decoding begins, so
/// parsing never suspends on I/O. Bytes are delivered in source order and end
/// of input is final. Contiguous buffers and byte iterators convert
/// infallibly via [`From`]; readers go through [`Source::from_reader`].
#[derive(Clone, Debug, Default)]
pub struct Source {
    bytes: Vec<u8>,
}

impl Source {
    /// Drain a [`std::io::Read`] implementation into a source.
    pub fn from_reader(mut reader: impl Read) -> std::io::Result<Source> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Source { bytes })
    }

    /// Collect a byte iterator into a source.
    pub fn from_iter(iter: impl IntoIterator<Item = u8>) -> Source {
        Source {
            bytes: iter.into_iter().collect(),
        }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Source {
        Source {
            bytes: bytes.to_vec(),
        }
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Source {
        Source { bytes }
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Source {
        Source {
            bytes: text.as_bytes().to_vec(),
        }
    }
}

impl From<String> for Source {
    fn from(text: String) -> Source {
        Source {
            bytes: text.into_bytes(),
        }
    }
}

impl<const N: usize> From<&[u8; N]> for Source {
    fn from(bytes: &[u8; N]) -> Source {
        Source {
            bytes: bytes.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_is_drained_in_order() {
        let source = Source::from_reader(&b"a: 1\n"[..]).unwrap();
        assert_eq!(source.into_bytes(), b"a: 1\n");
    }

    #[test]
    fn iterator_collects() {
        let source = Source::from_iter("x".bytes().chain("y".bytes()));
        assert_eq!(source.into_bytes(), b"xy");
    }
}

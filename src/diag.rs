//! Recoverable anomalies found while decoding.
//!
//! Decoders never fail on corrupt data. Instead they note what was wrong in a `Diagnostics`
//! accumulator and carry on with whatever could be salvaged.

use std::fmt;

/// Maximum amount of leading bytes kept in a diagnostic.
const LEADING_BYTES: usize = 8;

/// Location and excerpt of the bytes a diagnostic refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteInfo {
    /// Offset of the first byte, relative to the start of the input given to the parser.
    pub offset: usize,
    /// Up to 8 of the leading bytes.
    pub leading: Vec<u8>,
    /// Total length of the offending byte range.
    pub total_len: usize,
}

/// A single recoverable anomaly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub info: Option<ByteInfo>,
}
impl Diagnostic {
    /// Whether the message starts with the given text.
    pub fn is(&self, prefix: &str) -> bool {
        self.message.starts_with(prefix)
    }
}
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(info) = &self.info {
            if !info.leading.is_empty() {
                f.write_str(" [")?;
                for (i, byte) in info.leading.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{:02x}", byte)?;
                }
                if info.total_len > LEADING_BYTES {
                    write!(f, " ... (total {} bytes)", info.total_len)?;
                }
                f.write_str("]")?;
            }
            write!(f, " at 0x{:06x}", info.offset)?;
        }
        Ok(())
    }
}

/// Accumulates diagnostics for a single parse.
///
/// Byte offsets are computed from the address of the offending slice, so every slice given to
/// `warn_at` must be a view into the buffer the accumulator was created for.
#[derive(Debug)]
pub struct Diagnostics {
    origin: usize,
    len: usize,
    list: Vec<Diagnostic>,
}
impl Diagnostics {
    /// Create an accumulator for the given input buffer.
    pub fn new(input: &[u8]) -> Diagnostics {
        Diagnostics {
            origin: input.as_ptr() as usize,
            len: input.len(),
            list: Vec::new(),
        }
    }

    /// Record a diagnostic without location.
    pub fn warn<M: Into<String>>(&mut self, message: M) {
        self.push(Diagnostic {
            message: message.into(),
            info: None,
        });
    }

    /// Record a diagnostic pointing at the given bytes.
    pub fn warn_at<M: Into<String>>(&mut self, message: M, bytes: &[u8]) {
        let offset = (bytes.as_ptr() as usize)
            .checked_sub(self.origin)
            .filter(|&off| off <= self.len)
            .unwrap_or(0);
        let leading = bytes[..bytes.len().min(LEADING_BYTES)].to_vec();
        self.push(Diagnostic {
            message: message.into(),
            info: Some(ByteInfo {
                offset,
                leading,
                total_len: bytes.len(),
            }),
        });
    }

    fn push(&mut self, diag: Diagnostic) {
        log::debug!("{}", diag);
        self.list.push(diag);
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.list
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.list
    }
}

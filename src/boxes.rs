use std::fmt;

/// Four-character box type code as found in the stream.
///
/// Unknown codes are kept verbatim; the tree always reflects the true file
/// structure.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else {
            None
        }
    }

    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

/// Decoded box header.
#[derive(Debug, Clone)]
pub struct BoxHeader {
    /// Total size including the header, or 0 = extends to the parent's end.
    pub size: u64,
    /// 4CC, possibly `uuid`.
    pub typ: FourCC,
    /// 16-byte extended type for `uuid` boxes; kept opaque.
    pub extended_type: Option<[u8; 16]>,
    /// 8, 16, 24, or 32 depending on large-size and extended-type presence.
    pub header_size: u64,
    /// Absolute buffer offset of the header start.
    pub start: u64,
}

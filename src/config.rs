//! Sniffer configuration

use crate::builtin::DEFAULT_READ_LIMIT;
use crate::charset::CharsetTable;

/// Options for building a [`Sniffer`](crate::Sniffer)
#[derive(Debug, Clone)]
pub struct SnifferConfig {
    /// Maximum number of bytes detectors may inspect (0 = unlimited)
    pub read_limit: u32,
    /// Encoding sniffers keyed by type family
    pub charsets: CharsetTable,
}

impl Default for SnifferConfig {
    fn default() -> Self {
        Self {
            read_limit: DEFAULT_READ_LIMIT, // 3 KB
            charsets: CharsetTable::with_builtin(),
        }
    }
}

impl SnifferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read limit
    pub fn with_read_limit(mut self, limit: u32) -> Self {
        self.read_limit = limit;
        self
    }

    /// Lets detectors inspect the whole input
    pub fn unlimited(mut self) -> Self {
        self.read_limit = 0;
        self
    }

    /// Replaces the charset dispatch table
    pub fn with_charsets(mut self, charsets: CharsetTable) -> Self {
        self.charsets = charsets;
        self
    }

    /// Disables charset detection
    pub fn without_charsets(mut self) -> Self {
        self.charsets = CharsetTable::new();
        self
    }
}

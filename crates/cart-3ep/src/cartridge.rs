//! Cartridge backing buffers: the ROM image and the RAM scratch area.

/// Size of one ROM page in bytes.
pub const ROM_PAGE_SIZE: usize = 1024;

/// Size of one RAM page in bytes.
pub const RAM_PAGE_SIZE: usize = 512;

/// Number of selectable RAM pages.
pub const RAM_PAGE_COUNT: usize = 64;

/// Total cartridge RAM in bytes (64 pages × 512 bytes).
pub const RAM_SIZE: usize = RAM_PAGE_COUNT * RAM_PAGE_SIZE;

/// An immutable cartridge ROM image.
///
/// The image is validated once at construction; the serving loop indexes
/// into it without further checks.
pub struct CartridgeImage {
    data: Vec<u8>,
}

impl CartridgeImage {
    /// Wrap a ROM image.
    ///
    /// # Errors
    ///
    /// Returns an error unless the image size is a positive multiple of
    /// the ROM page size.
    pub fn new(data: Vec<u8>) -> Result<Self, String> {
        if data.is_empty() || data.len() % ROM_PAGE_SIZE != 0 {
            return Err(format!(
                "image size {} is not a positive multiple of {ROM_PAGE_SIZE}",
                data.len()
            ));
        }
        Ok(Self { data })
    }

    /// Number of 1 KiB pages in the image. Always at least 1.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.data.len() / ROM_PAGE_SIZE
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// The cartridge RAM scratch buffer, zero-initialized.
pub struct CartridgeRam {
    data: Vec<u8>,
}

impl CartridgeRam {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0; RAM_SIZE],
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Default for CartridgeRam {
    fn default() -> Self {
        Self::new()
    }
}

use std::fmt::{Display, Formatter};

/// Reference to raster data held by a cell.
///
/// Cursors never decode pixels; callers open the referenced raster through a
/// raster-specific interface.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RasterRef {
    pub uri: String,
    /// Grid shape as `(cols, rows)`, when the backend reports it.
    pub size: Option<(usize, usize)>,
    pub band_count: Option<usize>,
}

impl RasterRef {
    pub fn new(uri: impl Into<String>) -> Self {
        RasterRef {
            uri: uri.into(),
            size: None,
            band_count: None,
        }
    }

    pub fn with_shape(mut self, size: (usize, usize), band_count: usize) -> Self {
        self.size = Some(size);
        self.band_count = Some(band_count);
        self
    }
}

impl Display for RasterRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

use crate::cursor::{ColumnDescriptor, CursorPosition, RowCursor, RowPosition};
use crate::decode::RawValue;
use crate::errors::{CursorError, Result};
use crate::options::{AccessPolicy, TraverseType};
use crate::types::RasterRef;

/// Placeholder cursor for raster layers.
///
/// Raster layers have no tabular view: the cursor has no columns and no
/// rows. The raster itself is reachable through [`Self::raster`].
#[derive(Debug, Clone)]
pub struct LegacyRasterDataSet {
    raster: RasterRef,
    position: RowPosition,
}

impl LegacyRasterDataSet {
    pub fn new(raster: RasterRef) -> Self {
        LegacyRasterDataSet {
            raster,
            position: RowPosition::new(0),
        }
    }

    pub fn raster(&self) -> &RasterRef {
        &self.raster
    }
}

impl RowCursor for LegacyRasterDataSet {
    fn traverse_type(&self) -> TraverseType {
        TraverseType::ForwardOnly
    }

    fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::Read
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &[]
    }

    fn size(&self) -> Option<usize> {
        Some(0)
    }

    fn position(&self) -> CursorPosition {
        self.position.position()
    }

    fn move_next(&mut self) -> Result<bool> {
        Ok(self.position.move_next())
    }

    fn move_before_first(&mut self) -> Result<()> {
        self.position.move_before_first();
        Ok(())
    }

    fn raw_value(&self, i: usize) -> Result<RawValue> {
        Err(CursorError::InvalidColumnIndex {
            index: i,
            method_name: "raw_value",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cursor() {
        let mut ds = LegacyRasterDataSet::new(RasterRef::new("/data/dem.tif"));
        assert_eq!(ds.column_count(), 0);
        assert!(ds.is_empty());
        assert!(!ds.move_next().unwrap());
        assert!(ds.is_after_end());
        assert!(matches!(
            ds.get_int32(0),
            Err(CursorError::CursorState { .. })
        ));
        ds.move_before_first().unwrap();
        assert!(!ds.move_first().unwrap());
        assert!(matches!(
            ds.move_previous(),
            Err(CursorError::Capability { .. })
        ));
        assert_eq!(ds.raster(), &RasterRef::new("/data/dem.tif"));
    }
}

use crate::types::{Value, ValueKind};

#[cfg(feature = "ndarray")]
use ndarray::ArrayD;

/// A dimensioned collection of nullable values, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    dimensions: Vec<usize>,
    element_kind: ValueKind,
    data: Vec<Option<Value>>,
}

impl Array {
    /// Construct an array from its `dimensions` and row-major `data`.
    ///
    /// # Panic
    /// Will panic if the product of `dimensions` does not match `data.len()`.
    pub fn new(dimensions: Vec<usize>, element_kind: ValueKind, data: Vec<Option<Value>>) -> Self {
        assert_eq!(
            dimensions.iter().product::<usize>(),
            data.len(),
            "dimensions {:?} do not match length {}",
            dimensions,
            data.len()
        );
        Array {
            dimensions,
            element_kind,
            data,
        }
    }

    /// A one-dimensional array.
    pub fn from_values(element_kind: ValueKind, data: Vec<Option<Value>>) -> Self {
        Array::new(vec![data.len()], element_kind, data)
    }

    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    pub fn element_kind(&self) -> ValueKind {
        self.element_kind
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.data
    }

    /// Element at the multi-index `index`; `None` when out of bounds or null.
    pub fn get(&self, index: &[usize]) -> Option<&Value> {
        if index.len() != self.dimensions.len() {
            return None;
        }
        let mut offset = 0;
        for (i, dim) in index.iter().zip(&self.dimensions) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        self.data.get(offset).and_then(Option::as_ref)
    }

    #[cfg(feature = "ndarray")]
    /// Convert `self` into an [`ndarray::ArrayD`].
    pub fn to_ndarray(self) -> crate::errors::Result<ArrayD<Option<Value>>> {
        Ok(ArrayD::from_shape_vec(self.dimensions, self.data)?)
    }
}

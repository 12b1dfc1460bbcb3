//! Object store access port trait.

use bytes::Bytes;

use crate::domain::error::PricedashError;

/// Read-only view of a bucket of column-oriented data files.
pub trait StorePort {
    /// Every object key under `prefix`, in no particular order.
    fn list(&self, prefix: &str) -> Result<Vec<String>, PricedashError>;

    /// Fails with [`PricedashError::NotFound`] when `key` does not exist.
    fn get(&self, key: &str) -> Result<Bytes, PricedashError>;
}

impl<T: StorePort + ?Sized> StorePort for Box<T> {
    fn list(&self, prefix: &str) -> Result<Vec<String>, PricedashError> {
        (**self).list(prefix)
    }

    fn get(&self, key: &str) -> Result<Bytes, PricedashError> {
        (**self).get(key)
    }
}

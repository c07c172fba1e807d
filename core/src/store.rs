//! Value stores: the owned storage behind each declared argument.
//!
//! A store is either a single optional value ([`Scalar`]) or an ordered,
//! growing sequence ([`List`]). The registry holds them type-erased behind
//! [`ValueStore`] and recovers the concrete type through the typed handle
//! the caller received at declaration time.

use std::any::Any;

use crate::error::ValueError;
use crate::types::{RawValue, TypeDescriptor, ValueSource};

/// Type-erased operations the parser needs from a store.
pub(crate) trait ValueStore {
    /// Binds one command-line token: replaces a scalar, appends to a list.
    fn bind(&mut self, raw: &RawValue<'_>) -> Result<(), ValueError>;

    /// Returns the store to its declaration-time state.
    fn reset(&mut self, default: Option<&str>, max_len: usize);

    /// Number of values currently held.
    fn len(&self) -> usize;

    fn as_any(&self) -> &dyn Any;
}

/// Storage for a single-valued argument. Empty until something is bound.
pub(crate) struct Scalar<T> {
    value: Option<T>,
    ty: TypeDescriptor<T>,
}

impl<T: 'static> Scalar<T> {
    /// Creates the store, parsing `default` into it when present.
    pub(crate) fn new(
        ty: TypeDescriptor<T>,
        default: Option<&str>,
        max_len: usize,
    ) -> Result<Self, ValueError> {
        let value = match default {
            Some(text) => Some(ty.parse(&default_raw(text, max_len))?),
            None => None,
        };
        Ok(Self { value, ty })
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl<T: 'static> ValueStore for Scalar<T> {
    fn bind(&mut self, raw: &RawValue<'_>) -> Result<(), ValueError> {
        self.value = Some(self.ty.parse(raw)?);
        Ok(())
    }

    fn reset(&mut self, default: Option<&str>, max_len: usize) {
        self.value = default.and_then(|text| self.ty.parse(&default_raw(text, max_len)).ok());
    }

    fn len(&self) -> usize {
        usize::from(self.value.is_some())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Storage for a list argument, in command-line order.
pub(crate) struct List<T> {
    values: Vec<T>,
    ty: TypeDescriptor<T>,
}

impl<T: 'static> List<T> {
    pub(crate) fn with_capacity(ty: TypeDescriptor<T>, capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            ty,
        }
    }

    pub(crate) fn values(&self) -> &[T] {
        &self.values
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }
}

impl<T: 'static> ValueStore for List<T> {
    fn bind(&mut self, raw: &RawValue<'_>) -> Result<(), ValueError> {
        let value = self.ty.parse(raw)?;
        self.values.push(value);
        Ok(())
    }

    fn reset(&mut self, _default: Option<&str>, _max_len: usize) {
        // clear() keeps the allocation; capacity never shrinks
        self.values.clear();
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn default_raw(text: &str, max_len: usize) -> RawValue<'_> {
    RawValue {
        text,
        default: Some(text),
        source: ValueSource::Default,
        max_len,
    }
}

//! Filter registry: name → primitive plus partition policy.
//!
//! A registry is filled once during setup and then shared read-only
//! (typically behind an `Arc`) by every executor and harness. Lookups borrow
//! the stored spec and never allocate.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::builtin::BuiltinFilter;
use crate::error::{Error, PrimitiveError, Result};
use crate::image::Image;

/// A filter operation applied to one band (or the whole image).
///
/// The band is an owned copy, so implementations may consume or mutate it.
pub trait Primitive: Send + Sync {
    fn apply(&self, band: Image) -> std::result::Result<Image, PrimitiveError>;
}

impl<F> Primitive for F
where
    F: Fn(Image) -> std::result::Result<Image, PrimitiveError> + Send + Sync,
{
    fn apply(&self, band: Image) -> std::result::Result<Image, PrimitiveError> {
        self(band)
    }
}

/// Channel count of the merged output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannels {
    SameAsInput,
    Fixed(usize),
}

impl OutputChannels {
    pub fn resolve(self, input_channels: usize) -> usize {
        match self {
            OutputChannels::SameAsInput => input_channels,
            OutputChannels::Fixed(n) => n,
        }
    }
}

/// Registered filter: primitive plus the metadata the executor partitions by.
#[derive(Clone)]
pub struct FilterSpec {
    name: String,
    primitive: Arc<dyn Primitive>,
    overlap_radius: usize,
    partitionable: bool,
    output_channels: OutputChannels,
}

impl FilterSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primitive(&self) -> &dyn Primitive {
        self.primitive.as_ref()
    }

    /// Rows of context the primitive needs above and below each output row.
    pub fn overlap_radius(&self) -> usize {
        self.overlap_radius
    }

    pub fn partitionable(&self) -> bool {
        self.partitionable
    }

    pub fn output_channels(&self) -> OutputChannels {
        self.output_channels
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSpec")
            .field("name", &self.name)
            .field("overlap_radius", &self.overlap_radius)
            .field("partitionable", &self.partitionable)
            .field("output_channels", &self.output_channels)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct FilterRegistry {
    specs: HashMap<String, FilterSpec>,
    order: Vec<String>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the default parameterization of every builtin filter.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for filter in BuiltinFilter::defaults() {
            registry.insert(filter.spec());
        }
        registry
    }

    /// Add a filter. Fails with [`Error::DuplicateFilter`] if `name` exists.
    pub fn register<P>(
        &mut self,
        name: impl Into<String>,
        primitive: P,
        overlap_radius: usize,
        partitionable: bool,
        output_channels: OutputChannels,
    ) -> Result<()>
    where
        P: Primitive + 'static,
    {
        let name = name.into();
        if self.specs.contains_key(&name) {
            return Err(Error::DuplicateFilter(name));
        }
        self.insert(FilterSpec {
            name,
            primitive: Arc::new(primitive),
            overlap_radius,
            partitionable,
            output_channels,
        });
        Ok(())
    }

    /// Add one builtin filter under its canonical name.
    pub fn register_builtin(&mut self, filter: BuiltinFilter) -> Result<()> {
        let spec = filter.spec();
        if self.specs.contains_key(spec.name()) {
            return Err(Error::DuplicateFilter(spec.name));
        }
        self.insert(spec);
        Ok(())
    }

    fn insert(&mut self, spec: FilterSpec) {
        self.order.push(spec.name.clone());
        self.specs.insert(spec.name.clone(), spec);
    }

    pub fn lookup(&self, name: &str) -> Result<&FilterSpec> {
        self.specs
            .get(name)
            .ok_or_else(|| Error::UnknownFilter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub(crate) fn spec_from_parts(
    name: &str,
    primitive: Arc<dyn Primitive>,
    overlap_radius: usize,
    partitionable: bool,
    output_channels: OutputChannels,
) -> FilterSpec {
    FilterSpec {
        name: name.to_string(),
        primitive,
        overlap_radius,
        partitionable,
        output_channels,
    }
}

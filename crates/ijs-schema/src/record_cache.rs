//! # Record-Shape Cache
//!
//! Maps each compiled object schema to the one [`RecordShape`] its records
//! use. The cache is owned by the engine rather than the schema node, so
//! compiled nodes stay immutable.
//!
//! ## Invariant
//!
//! For a given [`SchemaId`] the cache hands out the same `Arc` forever.
//! Validation of realized records compares shapes by pointer, so two
//! threads racing on first use must never publish two different shapes.
//! The shape is built outside the lock and published with
//! `entry().or_insert`: whichever thread publishes first wins, and the
//! loser's candidate is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::immutable::RecordShape;
use crate::node::{ObjectSchema, SchemaId};

#[derive(Debug, Default)]
pub(crate) struct RecordShapeCache {
    shapes: RwLock<HashMap<SchemaId, Arc<RecordShape>>>,
}

impl RecordShapeCache {
    /// Shape for `object`, built on first use.
    pub(crate) fn shape_for(&self, object: &ObjectSchema, title: Option<&str>) -> Arc<RecordShape> {
        if let Some(shape) = self.shapes.read().get(&object.id()) {
            return Arc::clone(shape);
        }

        let candidate = Arc::new(RecordShape::new(
            title,
            object.properties().keys().map(str::to_string).collect(),
        ));

        let mut shapes = self.shapes.write();
        let shape = shapes.entry(object.id()).or_insert_with(|| {
            tracing::debug!(
                schema_id = object.id().get(),
                shape = candidate.name(),
                fields = candidate.len(),
                "published record shape"
            );
            candidate
        });
        Arc::clone(shape)
    }

    pub(crate) fn len(&self) -> usize {
        self.shapes.read().len()
    }
}

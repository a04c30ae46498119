//! Shared core of every resource object

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::context::{GraphicsContext, RetiredObjects};
use super::device::GpuHandle;
use super::types::ObjectKind;

/// Backend name plus lifetime bookkeeping
///
/// `release` may run once; dropping a still created object releases it.
#[derive(Debug)]
pub struct GpuObject {
    handle: GpuHandle,
    kind: ObjectKind,
    created: AtomicBool,
    retired: Arc<RetiredObjects>,
}

impl GpuObject {
    pub(crate) fn new(context: &GraphicsContext, kind: ObjectKind, handle: GpuHandle) -> Self {
        Self {
            handle,
            kind,
            created: AtomicBool::new(true),
            retired: context.retired(),
        }
    }

    /// Backend name
    ///
    /// # Panics
    ///
    /// Panics if the object was released.
    pub fn handle(&self) -> GpuHandle {
        assert!(self.is_created(), "{:?} {:?} used after release", self.kind, self.handle);
        self.handle
    }

    /// Object kind
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Whether the object has not been released
    pub fn is_created(&self) -> bool {
        self.created.load(Ordering::Acquire)
    }

    /// Hand the name back for deletion
    ///
    /// # Panics
    ///
    /// Panics if the object was already released.
    pub fn release(&self) {
        let was_created = self.created.swap(false, Ordering::AcqRel);
        assert!(was_created, "{:?} {:?} released twice", self.kind, self.handle);
        self.retired.retire(self.kind, self.handle);
    }
}

impl Drop for GpuObject {
    fn drop(&mut self) {
        if self.is_created() {
            self.release();
        }
    }
}

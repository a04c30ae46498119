//! Graphics context
//!
//! Owns the device and the retirement queue of every resource object created through
//! it. Resource objects never talk to the device when they are released or dropped;
//! they push their name onto the queue and the context deletes it on the next
//! [`GraphicsContext::collect_garbage`]. Deleted names are kept until
//! [`GraphicsContext::take_deleted`] so state caches can drop them.

use std::sync::{Arc, Mutex, PoisonError};

use super::device::{GpuHandle, GraphicsDevice};
use super::types::ObjectKind;

/// Names handed back by released resource objects, waiting for deletion
#[derive(Debug, Default)]
pub struct RetiredObjects {
    queue: Mutex<Vec<(ObjectKind, GpuHandle)>>,
}

impl RetiredObjects {
    pub(crate) fn retire(&self, kind: ObjectKind, handle: GpuHandle) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, handle));
    }

    fn drain(&self) -> Vec<(ObjectKind, GpuHandle)> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of names waiting for deletion
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// The device plus resource bookkeeping
pub struct GraphicsContext {
    device: Box<dyn GraphicsDevice>,
    retired: Arc<RetiredObjects>,
    deleted: Vec<GpuHandle>,
}

impl GraphicsContext {
    /// Wrap a device
    pub fn new(device: Box<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            retired: Arc::new(RetiredObjects::default()),
            deleted: Vec::new(),
        }
    }

    /// The device
    pub fn device(&mut self) -> &mut dyn GraphicsDevice {
        self.device.as_mut()
    }

    pub(crate) fn retired(&self) -> Arc<RetiredObjects> {
        Arc::clone(&self.retired)
    }

    /// Number of released objects not yet deleted on the device
    pub fn pending_deletions(&self) -> usize {
        self.retired.pending()
    }

    /// Delete every retired object on the device
    ///
    /// Returns the number of deleted objects.
    pub fn collect_garbage(&mut self) -> usize {
        let retired = self.retired.drain();
        for &(kind, handle) in &retired {
            self.device.delete_object(kind, handle);
            self.deleted.push(handle);
        }
        if !retired.is_empty() {
            log::debug!("Deleted {} retired graphics objects", retired.len());
        }
        retired.len()
    }

    /// Names deleted since the last call
    pub fn take_deleted(&mut self) -> Vec<GpuHandle> {
        std::mem::take(&mut self.deleted)
    }
}

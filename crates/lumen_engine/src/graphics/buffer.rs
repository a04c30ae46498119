//! Buffer objects

use super::context::GraphicsContext;
use super::device::GpuHandle;
use super::object::GpuObject;
use super::types::{BufferAccess, BufferTarget, ObjectKind};

/// Creation options of a [`Buffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferConfiguration {
    /// What the buffer is used as
    pub target: BufferTarget,
    /// Access rights of the storage
    pub access: BufferAccess,
    /// Size in bytes
    pub size: usize,
}

/// Buffer object with immutable storage size
#[derive(Debug)]
pub struct Buffer {
    object: GpuObject,
    configuration: BufferConfiguration,
}

impl Buffer {
    /// Create a buffer, optionally filled with `data`
    ///
    /// # Panics
    ///
    /// Panics if `data` is larger than the configured size.
    pub fn create(context: &mut GraphicsContext, configuration: BufferConfiguration, data: Option<&[u8]>) -> Self {
        if let Some(data) = data {
            assert!(
                data.len() <= configuration.size,
                "{} bytes of initial data do not fit a buffer of {} bytes",
                data.len(),
                configuration.size
            );
        }
        let handle = context.device().create_buffer(configuration.target, configuration.access, configuration.size, data);
        Self {
            object: GpuObject::new(context, ObjectKind::Buffer, handle),
            configuration,
        }
    }

    /// Overwrite `data.len()` bytes starting at `offset`
    ///
    /// # Panics
    ///
    /// Panics if the buffer lacks [`BufferAccess::DYNAMIC_STORAGE`] or the write
    /// would run past the end.
    pub fn set_data(&self, context: &mut GraphicsContext, offset: usize, data: &[u8]) {
        assert!(
            self.configuration.access.contains(BufferAccess::DYNAMIC_STORAGE),
            "buffer {:?} was not created with dynamic storage",
            self.object.handle()
        );
        assert!(
            offset + data.len() <= self.configuration.size,
            "write of {} bytes at {offset} overflows buffer of {} bytes",
            data.len(),
            self.configuration.size
        );
        context.device().buffer_sub_data(self.handle(), offset, data);
    }

    /// Backend name
    pub fn handle(&self) -> GpuHandle {
        self.object.handle()
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.configuration.size
    }

    /// Target the buffer was created for
    pub fn target(&self) -> BufferTarget {
        self.configuration.target
    }

    /// Whether the buffer has not been released
    pub fn is_created(&self) -> bool {
        self.object.is_created()
    }

    /// Release the backend object
    pub fn release(&self) {
        self.object.release();
    }
}

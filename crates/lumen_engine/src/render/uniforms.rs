//! Uniform block layouts and the per-frame uniform ring

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::graphics::types::{BufferAccess, BufferTarget};
use crate::graphics::{Buffer, BufferConfiguration, GraphicsContext};

/// Offset alignment of every slice in the ring
pub const UNIFORM_ALIGNMENT: usize = 256;

/// Camera data of the geometry pass
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneBlock {
    /// Projection times view, column major
    pub view_projection: [[f32; 4]; 4],
    /// World space camera position, w unused
    pub camera_position: [f32; 4],
}

/// Per-draw model data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelBlock {
    /// Model matrix
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix
    pub normal_matrix: [[f32; 4]; 4],
}

/// Material factors plus which texture slots are bound
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialBlock {
    /// Base color factor
    pub base_color: [f32; 4],
    /// Emissive color factor, w unused
    pub emissive_color: [f32; 4],
    /// Metallic factor
    pub metallic: f32,
    /// Roughness factor
    pub roughness: f32,
    /// 1 if occlusion lives in the roughness/metallic texture
    pub packed_occlusion: u32,
    /// Bit `i` set if texture slot `i` is bound
    pub texture_mask: u32,
}

/// Lighting pass inputs
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingBlock {
    /// Inverse of the geometry pass view projection
    pub inverse_view_projection: [[f32; 4]; 4],
    /// World space camera position, w unused
    pub camera_position: [f32; 4],
    /// Mip level sampled from the environment
    pub environment_mip_level: f32,
    /// 1 if an environment texture is bound
    pub has_environment: u32,
    /// Seconds since the pipeline was created
    pub time: f32,
    /// Padding to 16 bytes
    pub padding: u32,
}

/// Location of one pushed block in the ring buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlice {
    /// Byte offset in the ring buffer
    pub offset: usize,
    /// Size of the block in bytes
    pub size: usize,
}

const fn align_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) / alignment * alignment
}

/// Number of primitives a frame can draw with a ring of `capacity` bytes
///
/// Every block takes one [`UNIFORM_ALIGNMENT`] slot. A frame needs a scene block and a
/// lighting block, plus a model block and a material block per primitive.
pub const fn primitives_per_frame(capacity: usize) -> usize {
    (capacity / UNIFORM_ALIGNMENT).saturating_sub(2) / 2
}

/// Staging area for every uniform block of a frame
///
/// Blocks are appended on the CPU at aligned offsets while commands are recorded and
/// the whole frame goes to the GPU buffer in a single upload before execution. The ring
/// never grows; see [`primitives_per_frame`] for what a capacity buys.
#[derive(Debug)]
pub struct UniformRing {
    buffer: Arc<Buffer>,
    staging: Vec<u8>,
    cursor: usize,
    used: usize,
}

impl UniformRing {
    /// Create a ring of `capacity` bytes
    pub fn create(context: &mut GraphicsContext, capacity: usize) -> Self {
        let buffer = Buffer::create(
            context,
            BufferConfiguration {
                target: BufferTarget::Uniform,
                access: BufferAccess::DYNAMIC_STORAGE,
                size: capacity,
            },
            None,
        );
        Self {
            buffer: Arc::new(buffer),
            staging: vec![0; capacity],
            cursor: 0,
            used: 0,
        }
    }

    /// Append a block and return where it will live on the GPU
    ///
    /// # Panics
    ///
    /// Panics if the frame's blocks do not fit the ring.
    pub fn push<T: Pod>(&mut self, block: &T) -> UniformSlice {
        let bytes = bytemuck::bytes_of(block);
        let offset = self.cursor;
        let end = offset + bytes.len();
        if end > self.staging.len() {
            log::error!(
                "Frame needs more than {} primitives; raise render.uniform_buffer_size",
                primitives_per_frame(self.staging.len())
            );
            panic!(
                "uniform ring of {} bytes exhausted; increase the uniform buffer size",
                self.staging.len()
            );
        }

        self.staging[offset..end].copy_from_slice(bytes);
        self.used = end;
        self.cursor = align_up(end, UNIFORM_ALIGNMENT);
        UniformSlice { offset, size: bytes.len() }
    }

    /// Write the frame's blocks to the GPU buffer and start over
    pub fn upload(&mut self, context: &mut GraphicsContext) {
        if self.used > 0 {
            self.buffer.set_data(context, 0, &self.staging[..self.used]);
        }
        self.cursor = 0;
        self.used = 0;
    }

    /// The GPU buffer
    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Bytes pushed since the last upload, including alignment gaps
    pub fn used(&self) -> usize {
        self.used
    }

    /// Capacity in bytes
    pub fn capacity(&self) -> usize {
        self.staging.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::headless::{DeviceCall, HeadlessDevice};

    #[test]
    fn test_block_sizes_are_std140_friendly() {
        assert_eq!(std::mem::size_of::<SceneBlock>(), 80);
        assert_eq!(std::mem::size_of::<ModelBlock>(), 128);
        assert_eq!(std::mem::size_of::<MaterialBlock>(), 48);
        assert_eq!(std::mem::size_of::<LightingBlock>(), 96);
    }

    #[test]
    fn test_push_aligns_offsets() {
        let mut context = GraphicsContext::new(Box::new(HeadlessDevice::new()));
        let mut ring = UniformRing::create(&mut context, 4096);

        let first = ring.push(&MaterialBlock::zeroed());
        let second = ring.push(&ModelBlock::zeroed());

        assert_eq!(first, UniformSlice { offset: 0, size: 48 });
        assert_eq!(second, UniformSlice { offset: 256, size: 128 });
        assert_eq!(ring.used(), 384);
    }

    #[test]
    fn test_upload_writes_once_and_resets() {
        let device = HeadlessDevice::new();
        let recorder = device.recorder();
        let mut context = GraphicsContext::new(Box::new(device));
        let mut ring = UniformRing::create(&mut context, 4096);

        ring.push(&SceneBlock::zeroed());
        ring.push(&SceneBlock::zeroed());
        ring.upload(&mut context);
        ring.upload(&mut context);

        let uploads: Vec<_> = recorder
            .calls()
            .into_iter()
            .filter(|c| matches!(c, DeviceCall::BufferSubData { .. }))
            .collect();
        assert_eq!(
            uploads,
            vec![DeviceCall::BufferSubData { buffer: ring.buffer().handle(), offset: 0, len: 256 + 80 }]
        );
        assert_eq!(ring.push(&SceneBlock::zeroed()).offset, 0);
    }

    #[test]
    fn test_ring_holds_the_advertised_primitive_count() {
        assert_eq!(primitives_per_frame(1 << 20), 2047);
        assert_eq!(primitives_per_frame(256), 0);

        let mut context = GraphicsContext::new(Box::new(HeadlessDevice::new()));
        let mut ring = UniformRing::create(&mut context, 4096);
        let primitives = primitives_per_frame(ring.capacity());
        assert_eq!(primitives, 7);

        ring.push(&SceneBlock::zeroed());
        for _ in 0..primitives {
            ring.push(&ModelBlock::zeroed());
            ring.push(&MaterialBlock::zeroed());
        }
        ring.push(&LightingBlock::zeroed());
        assert!(ring.used() <= ring.capacity());
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn test_overflow_panics() {
        let mut context = GraphicsContext::new(Box::new(HeadlessDevice::new()));
        let mut ring = UniformRing::create(&mut context, 300);
        ring.push(&ModelBlock::zeroed());
        ring.push(&ModelBlock::zeroed());
    }
}

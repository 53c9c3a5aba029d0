use std::cell::Cell;
use std::mem;
use std::rc::Rc;

use bytemuck::Pod;

use crate::device::{BufferId, BufferTarget, BufferUsage, GlDevice};
use crate::error::{GfxError, Result};

/// Vertex data in a GPU array buffer.
pub struct VertexBuffer {
    device: Rc<dyn GlDevice>,
    id: BufferId,
    usage: BufferUsage,
    size: Cell<usize>,
}

impl VertexBuffer {
    /// Uploads `data` as raw bytes. `T` is any plain-old-data vertex type
    /// (`#[derive(Pod, Zeroable)]` structs, `f32` slices, ...).
    pub fn new<T: Pod>(device: Rc<dyn GlDevice>, data: &[T], usage: BufferUsage) -> Result<Self> {
        let id = device.create_buffer().map_err(GfxError::Device)?;
        let buffer = Self { device, id, usage, size: Cell::new(0) };
        buffer.set_data(data);
        log::debug!("created vertex buffer {} ({} bytes)", id.get(), buffer.size());
        Ok(buffer)
    }

    /// Replaces the whole contents, reallocating storage.
    pub fn set_data<T: Pod>(&self, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.bind();
        self.device.buffer_data(BufferTarget::Array, bytes, self.usage);
        self.size.set(bytes.len());
    }

    pub fn bind(&self) {
        self.device.bind_buffer(BufferTarget::Array, Some(self.id));
    }

    pub fn unbind(&self) {
        self.device.bind_buffer(BufferTarget::Array, None);
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.size.get()
    }

    pub fn handle(&self) -> u32 {
        self.id.get()
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        self.device.delete_buffer(self.id);
    }
}

/// `u32` indices in a GPU element buffer.
pub struct IndexBuffer {
    device: Rc<dyn GlDevice>,
    id: BufferId,
    count: u32,
}

impl IndexBuffer {
    pub fn new(device: Rc<dyn GlDevice>, indices: &[u32]) -> Result<Self> {
        let count = u32::try_from(indices.len())
            .map_err(|_| GfxError::Device(format!("{} indices exceed u32", indices.len())))?;
        let id = device.create_buffer().map_err(GfxError::Device)?;

        device.bind_buffer(BufferTarget::ElementArray, Some(id));
        device.buffer_data(
            BufferTarget::ElementArray,
            bytemuck::cast_slice(indices),
            BufferUsage::StaticDraw,
        );

        log::debug!("created index buffer {} ({count} indices)", id.get());
        Ok(Self { device, id, count })
    }

    pub fn bind(&self) {
        self.device.bind_buffer(BufferTarget::ElementArray, Some(self.id));
    }

    pub fn unbind(&self) {
        self.device.bind_buffer(BufferTarget::ElementArray, None);
    }

    /// Number of indices, for draw calls.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.count as usize * mem::size_of::<u32>()
    }

    pub fn handle(&self) -> u32 {
        self.id.get()
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        self.device.delete_buffer(self.id);
    }
}

use std::cell::Cell;
use std::rc::Rc;

use crate::device::{GlDevice, VertexArrayId};
use crate::error::{GfxError, Result};

use super::buffers::VertexBuffer;
use super::layout::VertexBufferLayout;

/// Vertex array object. Attribute indices run on across
/// [`add_buffer`](Self::add_buffer) calls, so several buffers can feed one
/// array.
pub struct VertexArray {
    device: Rc<dyn GlDevice>,
    id: VertexArrayId,
    next_attrib: Cell<u32>,
}

impl VertexArray {
    pub fn new(device: Rc<dyn GlDevice>) -> Result<Self> {
        let id = device.create_vertex_array().map_err(GfxError::Device)?;
        Ok(Self { device, id, next_attrib: Cell::new(0) })
    }

    /// Records `buffer`'s attributes, as described by `layout`, in this array.
    /// Leaves the array and the buffer bound.
    pub fn add_buffer(&self, buffer: &VertexBuffer, layout: &VertexBufferLayout) {
        self.bind();
        buffer.bind();

        let mut offset = 0;
        for element in layout.elements() {
            let index = self.next_attrib.get();
            self.device.enable_vertex_attrib_array(index);
            self.device.vertex_attrib_pointer(
                index,
                element.count,
                element.ty,
                element.normalized,
                layout.stride(),
                offset,
            );
            offset += element.size();
            self.next_attrib.set(index + 1);
        }
    }

    pub fn bind(&self) {
        self.device.bind_vertex_array(Some(self.id));
    }

    pub fn unbind(&self) {
        self.device.bind_vertex_array(None);
    }

    /// Number of attributes recorded so far.
    pub fn attribute_count(&self) -> u32 {
        self.next_attrib.get()
    }

    pub fn handle(&self) -> u32 {
        self.id.get()
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.device.delete_vertex_array(self.id);
    }
}

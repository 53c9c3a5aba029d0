//! Vertex, index and vertex array objects.

mod buffers;
mod layout;
mod vertex_array;

pub use buffers::{IndexBuffer, VertexBuffer};
pub use layout::{VertexBufferLayout, VertexComponent, VertexElement};
pub use vertex_array::VertexArray;

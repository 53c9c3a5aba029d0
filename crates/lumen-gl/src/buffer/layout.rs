use crate::device::AttribType;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for u32 {}
    impl Sealed for u8 {}
}

/// Scalar types a vertex attribute can be made of.
pub trait VertexComponent: sealed::Sealed {
    const TYPE: AttribType;
    /// Whether integer data is mapped to `[0, 1]` when read as float.
    const NORMALIZED: bool;
}

impl VertexComponent for f32 {
    const TYPE: AttribType = AttribType::Float;
    const NORMALIZED: bool = false;
}

impl VertexComponent for u32 {
    const TYPE: AttribType = AttribType::UnsignedInt;
    const NORMALIZED: bool = false;
}

/// Bytes are colors in practice, so they read back normalized.
impl VertexComponent for u8 {
    const TYPE: AttribType = AttribType::UnsignedByte;
    const NORMALIZED: bool = true;
}

/// One attribute: `count` components of `ty`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexElement {
    pub ty: AttribType,
    pub count: u32,
    pub normalized: bool,
}

impl VertexElement {
    /// Size in bytes.
    pub fn size(&self) -> u32 {
        self.count * self.ty.size()
    }
}

/// Interleaved attribute layout of one vertex buffer, in attribute order.
///
/// ```ignore
/// let mut layout = VertexBufferLayout::new();
/// layout.push::<f32>(3).push::<f32>(2).push::<u8>(4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VertexBufferLayout {
    elements: Vec<VertexElement>,
    stride: u32,
}

impl VertexBufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: VertexComponent>(&mut self, count: u32) -> &mut Self {
        let element = VertexElement { ty: T::TYPE, count, normalized: T::NORMALIZED };
        self.stride += element.size();
        self.elements.push(element);
        self
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Bytes per vertex.
    pub fn stride(&self) -> u32 {
        self.stride
    }
}

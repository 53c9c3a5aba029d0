/// A value written to a program uniform.
///
/// Matrices are column-major, matching GLSL. Conversions exist for the plain
/// array types so call sites read `program.set_uniform("u_time", 0.5)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue<'a> {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
    /// Sampler unit tables and other `int[]` uniforms.
    IntArray(&'a [i32]),
}

impl From<bool> for UniformValue<'_> {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for UniformValue<'_> {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for UniformValue<'_> {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<[f32; 2]> for UniformValue<'_> {
    fn from(v: [f32; 2]) -> Self {
        Self::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue<'_> {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue<'_> {
    fn from(v: [f32; 4]) -> Self {
        Self::Vec4(v)
    }
}

/// Columns of a 3x3 matrix.
impl From<[[f32; 3]; 3]> for UniformValue<'_> {
    fn from(cols: [[f32; 3]; 3]) -> Self {
        Self::Mat3(bytemuck::cast(cols))
    }
}

/// Columns of a 4x4 matrix.
impl From<[[f32; 4]; 4]> for UniformValue<'_> {
    fn from(cols: [[f32; 4]; 4]) -> Self {
        Self::Mat4(bytemuck::cast(cols))
    }
}

impl<'a> From<&'a [i32]> for UniformValue<'a> {
    fn from(v: &'a [i32]) -> Self {
        Self::IntArray(v)
    }
}

use crate::shader::UniformValue;

use super::types::{
    AttribType, BufferId, BufferTarget, BufferUsage, PixelFormat, PixelType, ProgramId, ShaderId,
    ShaderStage, TextureId, TextureParameter, TextureTarget, UniformLocation, VertexArrayId,
};

/// The set of driver calls the resource wrappers are built on.
///
/// Method names and semantics follow the GL entry points they wrap. All calls
/// must be made on the thread that owns the context; implementations do no
/// locking and expect to be shared as `Rc<dyn GlDevice>`.
///
/// Creation calls return `Err(message)` when the driver hands back no object.
pub trait GlDevice {
    // ── shaders & programs ───────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String>;
    fn shader_source(&self, shader: ShaderId, source: &str);
    fn compile_shader(&self, shader: ShaderId);
    fn shader_compile_status(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> Result<ProgramId, String>;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, program: ProgramId);
    fn program_link_status(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn delete_program(&self, program: ProgramId);
    fn use_program(&self, program: Option<ProgramId>);

    // ── uniforms ─────────────────────────────────────────────────────────

    /// `None` when the uniform is absent or was optimized out.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    /// Writes into the currently bound program.
    fn set_uniform(&self, location: UniformLocation, value: &UniformValue<'_>);
    /// Components the driver writes when reading back one uniform element at
    /// `location` (4 for a `vec4`, 16 for a `mat4`, 1 per array element of
    /// an `int[]`). `None` when no active uniform lives there.
    fn uniform_components(&self, program: ProgramId, location: UniformLocation) -> Option<u32>;
    /// Reads the element at `location`. Implementations must not write when
    /// `out` is shorter than [`uniform_components`](Self::uniform_components).
    fn get_uniform_f32(&self, program: ProgramId, location: UniformLocation, out: &mut [f32]);
    fn get_uniform_i32(&self, program: ProgramId, location: UniformLocation, out: &mut [i32]);

    // ── textures ─────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<TextureId, String>;
    fn delete_texture(&self, texture: TextureId);
    /// Selects texture unit `unit` (0-based) for subsequent binds. Units
    /// past the driver limit are ignored with a warning.
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: TextureTarget, texture: Option<TextureId>);
    /// `pixels` shorter than [`PixelFormat::data_len`] must be refused.
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: TextureTarget,
        internal_format: PixelFormat,
        width: u32,
        height: u32,
        format: PixelFormat,
        ty: PixelType,
        pixels: Option<&[u8]>,
    );
    /// Same length rule as [`tex_image_2d`](Self::tex_image_2d).
    #[allow(clippy::too_many_arguments)]
    fn tex_sub_image_2d(
        &self,
        target: TextureTarget,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        format: PixelFormat,
        ty: PixelType,
        pixels: &[u8],
    );
    fn generate_mipmap(&self, target: TextureTarget);
    fn tex_parameter(&self, target: TextureTarget, param: TextureParameter);
    /// Driver limit for anisotropic filtering; `0.0` when unsupported.
    fn max_anisotropy(&self) -> f32;

    // ── buffers & vertex arrays ──────────────────────────────────────────

    fn create_buffer(&self) -> Result<BufferId, String>;
    fn delete_buffer(&self, buffer: BufferId);
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    fn create_vertex_array(&self) -> Result<VertexArrayId, String>;
    fn delete_vertex_array(&self, vao: VertexArrayId);
    fn bind_vertex_array(&self, vao: Option<VertexArrayId>);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: u32,
        ty: AttribType,
        normalized: bool,
        stride: u32,
        offset: u32,
    );
}

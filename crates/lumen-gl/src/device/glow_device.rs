use std::ffi::c_void;

use anyhow::Result;
use glow::HasContext;

use crate::shader::UniformValue;

use super::driver::GlDevice;
use super::types::{
    AttribType, BufferId, BufferTarget, BufferUsage, CubeFace, FilterMode, PixelFormat, PixelType,
    ProgramId, ShaderId, ShaderStage, TextureId, TextureParameter, TextureTarget, UniformLocation,
    VertexArrayId, WrapMode,
};

// EXT_texture_filter_anisotropic (core in 4.6); not all glow versions export these.
const TEXTURE_MAX_ANISOTROPY: u32 = 0x84FE;
const MAX_TEXTURE_MAX_ANISOTROPY: u32 = 0x84FF;

// Non-square and double-precision uniform types, by enum value.
const FLOAT_MAT2X3: u32 = 0x8B65;
const FLOAT_MAT2X4: u32 = 0x8B66;
const FLOAT_MAT3X2: u32 = 0x8B67;
const FLOAT_MAT3X4: u32 = 0x8B68;
const FLOAT_MAT4X2: u32 = 0x8B69;
const FLOAT_MAT4X3: u32 = 0x8B6A;
const DOUBLE_VEC2: u32 = 0x8FFC;
const DOUBLE_VEC3: u32 = 0x8FFD;
const DOUBLE_VEC4: u32 = 0x8FFE;
const DOUBLE_MAT2: u32 = 0x8F46;
const DOUBLE_MAT3: u32 = 0x8F47;
const DOUBLE_MAT4: u32 = 0x8F48;
const DOUBLE_MAT2X3: u32 = 0x8F49;
const DOUBLE_MAT2X4: u32 = 0x8F4A;
const DOUBLE_MAT3X2: u32 = 0x8F4B;
const DOUBLE_MAT3X4: u32 = 0x8F4C;
const DOUBLE_MAT4X2: u32 = 0x8F4D;
const DOUBLE_MAT4X3: u32 = 0x8F4E;

/// [`GlDevice`] backed by a `glow` context.
///
/// The context must be current on the thread that creates and uses the
/// device, for the device's whole lifetime. That is the caller's contract,
/// which is why construction is `unsafe`.
pub struct GlowDevice {
    gl: glow::Context,
    max_anisotropy: f32,
    max_texture_units: u32,
}

impl GlowDevice {
    /// Wraps a context after checking it is at least GL 3.3 / GLES 3.0.
    ///
    /// # Safety
    /// `gl` must be current on the calling thread and stay current while the
    /// device (or any resource created through it) is alive.
    pub unsafe fn new(gl: glow::Context) -> Result<Self> {
        let version = gl.version();
        let supported = if version.is_embedded {
            version.major >= 3
        } else {
            (version.major, version.minor) >= (3, 3)
        };
        anyhow::ensure!(
            supported,
            "OpenGL 3.3 / GLES 3.0 required, context reports {}.{} ({})",
            version.major,
            version.minor,
            version.vendor_info
        );

        let extensions = gl.supported_extensions();
        let anisotropic = extensions.contains("GL_EXT_texture_filter_anisotropic")
            || extensions.contains("GL_ARB_texture_filter_anisotropic")
            || (!version.is_embedded && (version.major, version.minor) >= (4, 6));

        let max_anisotropy = if anisotropic {
            unsafe { gl.get_parameter_f32(MAX_TEXTURE_MAX_ANISOTROPY) }
        } else {
            0.0
        };

        let max_texture_units =
            unsafe { gl.get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS) }.max(0) as u32;

        // Decoded RGB rows are tightly packed.
        unsafe { gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1) };

        log::info!(
            "GL {}.{}{} ({}), {} texture units, max anisotropy {}",
            version.major,
            version.minor,
            if version.is_embedded { " ES" } else { "" },
            version.vendor_info,
            max_texture_units,
            max_anisotropy
        );

        Ok(Self { gl, max_anisotropy, max_texture_units })
    }

    /// Loads GL entry points through `loader` and wraps the result.
    ///
    /// # Safety
    /// Same contract as [`GlowDevice::new`]; `loader` must resolve symbols
    /// for the context that is current on this thread.
    pub unsafe fn from_loader_function<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&str) -> *const c_void,
    {
        let gl = unsafe { glow::Context::from_loader_function(loader) };
        unsafe { Self::new(gl) }
    }

    /// Raw context for draw calls and state the wrappers do not cover.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Whether `pixels` covers a `width` x `height` upload; logs when not.
    fn covers(pixels: &[u8], format: PixelFormat, ty: PixelType, width: u32, height: u32) -> bool {
        let needed = format.data_len(ty, width, height);
        if pixels.len() < needed {
            log::error!(
                "refusing {width}x{height} texture upload: {} bytes given, {needed} needed",
                pixels.len()
            );
            return false;
        }
        true
    }
}

// ── conversions ──────────────────────────────────────────────────────────

fn shader_kind(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
    }
}

fn texture_target(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2D => glow::TEXTURE_2D,
        TextureTarget::CubeMap => glow::TEXTURE_CUBE_MAP,
        TextureTarget::CubeFace(face) => match face {
            CubeFace::PositiveX => glow::TEXTURE_CUBE_MAP_POSITIVE_X,
            CubeFace::NegativeX => glow::TEXTURE_CUBE_MAP_NEGATIVE_X,
            CubeFace::PositiveY => glow::TEXTURE_CUBE_MAP_POSITIVE_Y,
            CubeFace::NegativeY => glow::TEXTURE_CUBE_MAP_NEGATIVE_Y,
            CubeFace::PositiveZ => glow::TEXTURE_CUBE_MAP_POSITIVE_Z,
            CubeFace::NegativeZ => glow::TEXTURE_CUBE_MAP_NEGATIVE_Z,
        },
    }
}

fn pixel_format(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Red => glow::RED,
        PixelFormat::Rg => glow::RG,
        PixelFormat::Rgb => glow::RGB,
        PixelFormat::Rgba => glow::RGBA,
        PixelFormat::Srgb => glow::SRGB8,
        PixelFormat::SrgbAlpha => glow::SRGB8_ALPHA8,
        PixelFormat::Depth => glow::DEPTH_COMPONENT,
    }
}

fn pixel_type(ty: PixelType) -> u32 {
    match ty {
        PixelType::UnsignedByte => glow::UNSIGNED_BYTE,
        PixelType::UnsignedShort => glow::UNSIGNED_SHORT,
        PixelType::Float => glow::FLOAT,
    }
}

fn wrap_mode(mode: WrapMode) -> i32 {
    (match mode {
        WrapMode::Repeat => glow::REPEAT,
        WrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
        WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        WrapMode::ClampToBorder => glow::CLAMP_TO_BORDER,
    }) as i32
}

fn filter_mode(mode: FilterMode) -> i32 {
    (match mode {
        FilterMode::Nearest => glow::NEAREST,
        FilterMode::Linear => glow::LINEAR,
        FilterMode::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        FilterMode::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        FilterMode::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        FilterMode::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
        BufferUsage::StreamDraw => glow::STREAM_DRAW,
    }
}

fn attrib_type(ty: AttribType) -> u32 {
    match ty {
        AttribType::Float => glow::FLOAT,
        AttribType::UnsignedInt => glow::UNSIGNED_INT,
        AttribType::UnsignedByte => glow::UNSIGNED_BYTE,
    }
}

/// Components written by `glGetUniform*` for one element of `utype`.
/// Samplers, images and atomic counters read back as one integer.
fn uniform_type_components(utype: u32) -> u32 {
    match utype {
        glow::FLOAT_VEC2 | glow::INT_VEC2 | glow::UNSIGNED_INT_VEC2 | glow::BOOL_VEC2
        | DOUBLE_VEC2 => 2,
        glow::FLOAT_VEC3 | glow::INT_VEC3 | glow::UNSIGNED_INT_VEC3 | glow::BOOL_VEC3
        | DOUBLE_VEC3 => 3,
        glow::FLOAT_VEC4 | glow::INT_VEC4 | glow::UNSIGNED_INT_VEC4 | glow::BOOL_VEC4
        | DOUBLE_VEC4 | glow::FLOAT_MAT2 | DOUBLE_MAT2 => 4,
        FLOAT_MAT2X3 | FLOAT_MAT3X2 | DOUBLE_MAT2X3 | DOUBLE_MAT3X2 => 6,
        FLOAT_MAT2X4 | FLOAT_MAT4X2 | DOUBLE_MAT2X4 | DOUBLE_MAT4X2 => 8,
        glow::FLOAT_MAT3 | DOUBLE_MAT3 => 9,
        FLOAT_MAT3X4 | FLOAT_MAT4X3 | DOUBLE_MAT3X4 | DOUBLE_MAT4X3 => 12,
        glow::FLOAT_MAT4 | DOUBLE_MAT4 => 16,
        _ => 1,
    }
}

/// `GL_TEXTURE0 + unit`, or `None` past the driver's unit count.
fn texture_unit(unit: u32, max_units: u32) -> Option<u32> {
    if unit >= max_units {
        return None;
    }
    glow::TEXTURE0.checked_add(unit)
}

// SAFETY (all blocks below): `GlowDevice::new` requires the context to be
// current on this thread for the device's lifetime, and every object name
// passed in was produced by this device.
impl GlDevice for GlowDevice {
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        unsafe { self.gl.create_shader(shader_kind(stage)) }.map(|s| ShaderId(s.0))
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        unsafe { self.gl.shader_source(glow::NativeShader(shader.0), source) }
    }

    fn compile_shader(&self, shader: ShaderId) {
        unsafe { self.gl.compile_shader(glow::NativeShader(shader.0)) }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        unsafe { self.gl.get_shader_compile_status(glow::NativeShader(shader.0)) }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        unsafe { self.gl.get_shader_info_log(glow::NativeShader(shader.0)) }
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.0)) }
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        unsafe { self.gl.create_program() }.map(|p| ProgramId(p.0))
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl
                .attach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn link_program(&self, program: ProgramId) {
        unsafe { self.gl.link_program(glow::NativeProgram(program.0)) }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        unsafe { self.gl.get_program_link_status(glow::NativeProgram(program.0)) }
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        unsafe { self.gl.get_program_info_log(glow::NativeProgram(program.0)) }
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe { self.gl.get_uniform_location(glow::NativeProgram(program.0), name) }
            .map(|loc| UniformLocation(loc.0))
    }

    fn set_uniform(&self, location: UniformLocation, value: &UniformValue<'_>) {
        let loc = glow::NativeUniformLocation(location.0);
        let loc = Some(&loc);
        unsafe {
            match *value {
                UniformValue::Bool(v) => self.gl.uniform_1_i32(loc, v as i32),
                UniformValue::Int(v) => self.gl.uniform_1_i32(loc, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(loc, v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32_slice(loc, &v),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32_slice(loc, &v),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32_slice(loc, &v),
                UniformValue::Mat3(m) => self.gl.uniform_matrix_3_f32_slice(loc, false, &m),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(loc, false, &m),
                UniformValue::IntArray(v) => self.gl.uniform_1_i32_slice(loc, v),
            }
        }
    }

    fn uniform_components(&self, program: ProgramId, location: UniformLocation) -> Option<u32> {
        let native = glow::NativeProgram(program.0);
        unsafe {
            for index in 0..self.gl.get_active_uniforms(native) {
                let Some(active) = self.gl.get_active_uniform(native, index) else { continue };
                let base = active.name.strip_suffix("[0]").unwrap_or(&active.name);
                // Array elements each have their own location.
                for element in 0..active.size.max(1) {
                    let name = if active.size > 1 {
                        format!("{base}[{element}]")
                    } else {
                        active.name.clone()
                    };
                    let found = self.gl.get_uniform_location(native, &name);
                    if found.is_some_and(|loc| loc.0 == location.0) {
                        return Some(uniform_type_components(active.utype));
                    }
                }
            }
        }
        None
    }

    fn get_uniform_f32(&self, program: ProgramId, location: UniformLocation, out: &mut [f32]) {
        match self.uniform_components(program, location) {
            Some(n) if out.len() >= n as usize => {
                let loc = glow::NativeUniformLocation(location.0);
                unsafe { self.gl.get_uniform_f32(glow::NativeProgram(program.0), &loc, out) }
            }
            n => log::error!(
                "refusing uniform readback: {} slots given, {n:?} components at location {}",
                out.len(),
                location.0
            ),
        }
    }

    fn get_uniform_i32(&self, program: ProgramId, location: UniformLocation, out: &mut [i32]) {
        match self.uniform_components(program, location) {
            Some(n) if out.len() >= n as usize => {
                let loc = glow::NativeUniformLocation(location.0);
                unsafe { self.gl.get_uniform_i32(glow::NativeProgram(program.0), &loc, out) }
            }
            n => log::error!(
                "refusing uniform readback: {} slots given, {n:?} components at location {}",
                out.len(),
                location.0
            ),
        }
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        unsafe { self.gl.create_texture() }.map(|t| TextureId(t.0))
    }

    fn delete_texture(&self, texture: TextureId) {
        unsafe { self.gl.delete_texture(glow::NativeTexture(texture.0)) }
    }

    fn active_texture(&self, unit: u32) {
        match texture_unit(unit, self.max_texture_units) {
            Some(unit) => unsafe { self.gl.active_texture(unit) },
            None => log::warn!(
                "texture unit {unit} out of range (driver has {})",
                self.max_texture_units
            ),
        }
    }

    fn bind_texture(&self, target: TextureTarget, texture: Option<TextureId>) {
        unsafe {
            self.gl
                .bind_texture(texture_target(target), texture.map(|t| glow::NativeTexture(t.0)))
        }
    }

    fn tex_image_2d(
        &self,
        target: TextureTarget,
        internal_format: PixelFormat,
        width: u32,
        height: u32,
        format: PixelFormat,
        ty: PixelType,
        pixels: Option<&[u8]>,
    ) {
        if pixels.is_some_and(|p| !Self::covers(p, format, ty, width, height)) {
            return;
        }
        unsafe {
            self.gl.tex_image_2d(
                texture_target(target),
                0,
                pixel_format(internal_format) as i32,
                width as i32,
                height as i32,
                0,
                pixel_format(format),
                pixel_type(ty),
                pixels,
            )
        }
    }

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
    ) {
        if !Self::covers(pixels, format, ty, width, height) {
            return;
        }
        unsafe {
            self.gl.tex_sub_image_2d(
                texture_target(target),
                0,
                x as i32,
                y as i32,
                width as i32,
                height as i32,
                pixel_format(format),
                pixel_type(ty),
                glow::PixelUnpackData::Slice(pixels),
            )
        }
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        unsafe { self.gl.generate_mipmap(texture_target(target)) }
    }

    fn tex_parameter(&self, target: TextureTarget, param: TextureParameter) {
        let target = texture_target(target);
        unsafe {
            match param {
                TextureParameter::WrapS(m) => {
                    self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap_mode(m))
                }
                TextureParameter::WrapT(m) => {
                    self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap_mode(m))
                }
                TextureParameter::WrapR(m) => {
                    self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, wrap_mode(m))
                }
                TextureParameter::MinFilter(f) => {
                    self.gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, filter_mode(f))
                }
                TextureParameter::MagFilter(f) => {
                    self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, filter_mode(f))
                }
                TextureParameter::MaxAnisotropy(v) => {
                    self.gl.tex_parameter_f32(target, TEXTURE_MAX_ANISOTROPY, v)
                }
            }
        }
    }

    fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        unsafe { self.gl.create_buffer() }.map(|b| BufferId(b.0))
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe {
            self.gl
                .bind_buffer(buffer_target(target), buffer.map(|b| glow::NativeBuffer(b.0)))
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target(target), data, buffer_usage(usage))
        }
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        unsafe { self.gl.create_vertex_array() }.map(|v| VertexArrayId(v.0))
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vao.0)) }
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        unsafe {
            self.gl
                .bind_vertex_array(vao.map(|v| glow::NativeVertexArray(v.0)))
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: u32,
        size: u32,
        ty: AttribType,
        normalized: bool,
        stride: u32,
        offset: u32,
    ) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                index,
                size as i32,
                attrib_type(ty),
                normalized,
                stride as i32,
                offset as i32,
            )
        }
    }
}

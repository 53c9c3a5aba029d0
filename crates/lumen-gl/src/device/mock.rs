//! In-memory [`GlDevice`] for unit tests.
//!
//! Objects are plain map entries, so tests can inspect live-object counts,
//! driver query counts, and uploaded texture images without a context.
//!
//! "Compilation" accepts a stage when it defines `void main` and its braces
//! and parentheses balance. Linking fails when a stage failed, when vertex or
//! fragment is missing, or when armed with [`MockDevice::fail_next_link`].
//! Uniforms are whatever `uniform <type> <name>;` lines the stages declare;
//! array elements get consecutive locations as in GL. Readbacks and pixel
//! uploads with buffers shorter than the driver would touch panic, so a
//! wrapper that forgets to check fails its tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::shader::UniformValue;

use super::driver::GlDevice;
use super::types::{
    AttribType, BufferId, BufferTarget, BufferUsage, PixelFormat, PixelType, ProgramId, ShaderId,
    ShaderStage, TextureId, TextureParameter, TextureTarget, UniformLocation, VertexArrayId,
};

#[derive(Debug, Clone)]
struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: Option<bool>,
    log: String,
}

#[derive(Debug, Clone, Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: HashMap<String, u32>,
    components: HashMap<u32, u32>,
    values: HashMap<u32, Stored>,
}

#[derive(Debug, Clone)]
enum Stored {
    Float(Vec<f32>),
    Int(Vec<i32>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockImage {
    pub width: u32,
    pub height: u32,
    pub internal_format: PixelFormat,
    pub has_data: bool,
}

#[derive(Debug, Clone, Default)]
struct MockTexture {
    images: HashMap<TextureTarget, MockImage>,
    params: Vec<TextureParameter>,
    mipmaps: u32,
    sub_uploads: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockAttrib {
    pub index: u32,
    pub size: u32,
    pub ty: AttribType,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
    pub enabled: bool,
}

#[derive(Default)]
struct MockState {
    next_name: u32,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    textures: HashMap<u32, MockTexture>,
    buffers: HashMap<u32, Vec<u8>>,
    vertex_arrays: HashMap<u32, Vec<MockAttrib>>,

    current_program: Option<u32>,
    active_unit: u32,
    texture_bindings: HashMap<(u32, TextureTarget), u32>,
    buffer_bindings: HashMap<BufferTarget, u32>,
    bound_vertex_array: Option<u32>,

    location_queries: usize,
    uniform_writes: usize,
    fail_next_link: Option<String>,
    max_anisotropy: f32,
}

impl MockState {
    fn alloc(&mut self) -> NonZeroU32 {
        self.next_name += 1;
        NonZeroU32::new(self.next_name).expect("names start at 1")
    }

    fn bound_texture_mut(&mut self, target: TextureTarget) -> Option<&mut MockTexture> {
        let name = *self.texture_bindings.get(&(self.active_unit, bind_point(target)))?;
        self.textures.get_mut(&name)
    }
}

fn bind_point(target: TextureTarget) -> TextureTarget {
    match target {
        TextureTarget::CubeFace(_) => TextureTarget::CubeMap,
        t => t,
    }
}

fn check_source(source: &str) -> Result<(), String> {
    if !source.contains("void main") {
        return Err("0:0: error: 'main' : function not defined".to_string());
    }
    let mut depth = [0i32; 2];
    for (line_no, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' => depth[0] += 1,
                '}' => depth[0] -= 1,
                '(' => depth[1] += 1,
                ')' => depth[1] -= 1,
                _ => {}
            }
            if depth.iter().any(|d| *d < 0) {
                return Err(format!("0:{}: error: syntax error, unexpected '{c}'", line_no + 1));
            }
        }
    }
    if depth != [0, 0] {
        return Err("0:0: error: syntax error, unexpected end of file".to_string());
    }
    Ok(())
}

/// `(type, name, element count)` per declaration.
fn declared_uniforms(source: &str) -> impl Iterator<Item = (&str, &str, u32)> {
    source.lines().filter_map(|line| {
        let decl = line.trim().strip_prefix("uniform ")?.split(';').next()?;
        let mut words = decl.split_whitespace();
        let ty = words.next()?;
        let name = words.last()?;
        match name.split_once('[') {
            Some((base, len)) => Some((ty, base, len.trim_end_matches(']').parse().ok()?)),
            None => Some((ty, name, 1)),
        }
    })
}

fn type_components(ty: &str) -> u32 {
    match ty {
        "mat2" => 4,
        "mat3" => 9,
        "mat4" => 16,
        t if t.ends_with("vec2") => 2,
        t if t.ends_with("vec3") => 3,
        t if t.ends_with("vec4") => 4,
        _ => 1,
    }
}

type UniformTable = (HashMap<String, u32>, HashMap<u32, u32>);

fn uniform_table<'s>(sources: impl Iterator<Item = &'s str>) -> UniformTable {
    let mut locations = HashMap::new();
    let mut components = HashMap::new();
    let mut next = 0;
    for source in sources {
        for (ty, base, count) in declared_uniforms(source) {
            if locations.contains_key(base) {
                continue;
            }
            locations.insert(base.to_string(), next);
            if count > 1 {
                for i in 0..count {
                    locations.insert(format!("{base}[{i}]"), next + i);
                }
            }
            for i in 0..count {
                components.insert(next + i, type_components(ty));
            }
            next += count;
        }
    }
    (locations, components)
}

#[derive(Default)]
pub(crate) struct MockDevice {
    state: RefCell<MockState>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_anisotropy(max: f32) -> Self {
        let dev = Self::default();
        dev.state.borrow_mut().max_anisotropy = max;
        dev
    }

    // ── failure injection ────────────────────────────────────────────────

    pub fn fail_next_link(&self, log: &str) {
        self.state.borrow_mut().fail_next_link = Some(log.to_string());
    }

    // ── inspection ───────────────────────────────────────────────────────────

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn location_queries(&self) -> usize {
        self.state.borrow().location_queries
    }

    pub fn uniform_writes(&self) -> usize {
        self.state.borrow().uniform_writes
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    pub fn bound_texture(&self, unit: u32, target: TextureTarget) -> Option<u32> {
        self.state.borrow().texture_bindings.get(&(unit, target)).copied()
    }

    pub fn texture_image(&self, texture: u32, target: TextureTarget) -> Option<MockImage> {
        self.state.borrow().textures.get(&texture)?.images.get(&target).copied()
    }

    pub fn texture_params(&self, texture: u32) -> Vec<TextureParameter> {
        self.state
            .borrow()
            .textures
            .get(&texture)
            .map(|t| t.params.clone())
            .unwrap_or_default()
    }

    pub fn mipmap_generations(&self, texture: u32) -> u32 {
        self.state.borrow().textures.get(&texture).map_or(0, |t| t.mipmaps)
    }

    pub fn sub_uploads(&self, texture: u32) -> u32 {
        self.state.borrow().textures.get(&texture).map_or(0, |t| t.sub_uploads)
    }

    pub fn buffer_len(&self, buffer: u32) -> Option<usize> {
        self.state.borrow().buffers.get(&buffer).map(Vec::len)
    }

    pub fn vertex_attribs(&self, vao: u32) -> Vec<MockAttrib> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vao)
            .cloned()
            .unwrap_or_default()
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<u32> {
        self.state.borrow().buffer_bindings.get(&target).copied()
    }
}

impl GlDevice for MockDevice {
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        let mut st = self.state.borrow_mut();
        let name = st.alloc();
        st.shaders.insert(
            name.get(),
            MockShader { stage, source: String::new(), compiled: None, log: String::new() },
        );
        Ok(ShaderId(name))
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader.get()) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader.get()) {
            match check_source(&s.source) {
                Ok(()) => {
                    s.compiled = Some(true);
                    s.log.clear();
                }
                Err(log) => {
                    s.compiled = Some(false);
                    s.log = log;
                }
            }
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader.get())
            .is_some_and(|s| s.compiled == Some(true))
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader.get())
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.state.borrow_mut().shaders.remove(&shader.get());
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let mut st = self.state.borrow_mut();
        let name = st.alloc();
        st.programs.insert(name.get(), MockProgram::default());
        Ok(ProgramId(name))
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program.get()) {
            p.attached.push(shader.get());
        }
    }

    fn link_program(&self, program: ProgramId) {
        let mut st = self.state.borrow_mut();
        let forced = st.fail_next_link.take();
        let Some(p) = st.programs.get(&program.get()) else { return };

        let stages: Vec<&MockShader> =
            p.attached.iter().filter_map(|name| st.shaders.get(name)).collect();
        let has = |stage| stages.iter().any(|s| s.stage == stage);

        let outcome = if let Some(log) = forced {
            Err(log)
        } else if stages.iter().any(|s| s.compiled != Some(true)) {
            Err("error: attached shader is not compiled".to_string())
        } else if !has(ShaderStage::Vertex) || !has(ShaderStage::Fragment) {
            Err("error: program lacks a vertex or fragment stage".to_string())
        } else {
            Ok(uniform_table(stages.iter().map(|s| s.source.as_str())))
        };

        let Some(p) = st.programs.get_mut(&program.get()) else { return };
        match outcome {
            Ok((uniforms, components)) => {
                p.linked = true;
                p.log.clear();
                p.uniforms = uniforms;
                p.components = components;
                p.values.clear();
            }
            Err(log) => {
                p.linked = false;
                p.log = log;
            }
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program.get())
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.state
            .borrow()
            .programs
            .get(&program.get())
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramId) {
        let mut st = self.state.borrow_mut();
        st.programs.remove(&program.get());
        if st.current_program == Some(program.get()) {
            st.current_program = None;
        }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.state.borrow_mut().current_program = program.map(ProgramId::get);
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let mut st = self.state.borrow_mut();
        st.location_queries += 1;
        let p = st.programs.get(&program.get())?;
        p.uniforms.get(name).copied().map(UniformLocation)
    }

    fn set_uniform(&self, location: UniformLocation, value: &UniformValue<'_>) {
        let mut st = self.state.borrow_mut();
        st.uniform_writes += 1;
        let Some(current) = st.current_program else { return };
        let Some(p) = st.programs.get_mut(&current) else { return };
        if let UniformValue::IntArray(v) = *value {
            for (element, x) in (location.0..).zip(v) {
                p.values.insert(element, Stored::Int(vec![*x]));
            }
            return;
        }
        let stored = match *value {
            UniformValue::Bool(v) => Stored::Int(vec![v as i32]),
            UniformValue::Int(v) => Stored::Int(vec![v]),
            UniformValue::Float(v) => Stored::Float(vec![v]),
            UniformValue::Vec2(v) => Stored::Float(v.to_vec()),
            UniformValue::Vec3(v) => Stored::Float(v.to_vec()),
            UniformValue::Vec4(v) => Stored::Float(v.to_vec()),
            UniformValue::Mat3(m) => Stored::Float(m.to_vec()),
            UniformValue::Mat4(m) => Stored::Float(m.to_vec()),
            UniformValue::IntArray(_) => return,
        };
        p.values.insert(location.0, stored);
    }

    fn uniform_components(&self, program: ProgramId, location: UniformLocation) -> Option<u32> {
        let st = self.state.borrow();
        st.programs.get(&program.get())?.components.get(&location.0).copied()
    }

    fn get_uniform_f32(&self, program: ProgramId, location: UniformLocation, out: &mut [f32]) {
        let st = self.state.borrow();
        let Some(p) = st.programs.get(&program.get()) else { return };
        let Some(&n) = p.components.get(&location.0) else { return };
        assert!(out.len() >= n as usize, "readback of {n} components into {}", out.len());
        let out = &mut out[..n as usize];
        match p.values.get(&location.0) {
            Some(Stored::Float(v)) => out.iter_mut().zip(v).for_each(|(o, v)| *o = *v),
            Some(Stored::Int(v)) => out.iter_mut().zip(v).for_each(|(o, v)| *o = *v as f32),
            None => out.fill(0.0),
        }
    }

    fn get_uniform_i32(&self, program: ProgramId, location: UniformLocation, out: &mut [i32]) {
        let st = self.state.borrow();
        let Some(p) = st.programs.get(&program.get()) else { return };
        let Some(&n) = p.components.get(&location.0) else { return };
        assert!(out.len() >= n as usize, "readback of {n} components into {}", out.len());
        let out = &mut out[..n as usize];
        match p.values.get(&location.0) {
            Some(Stored::Int(v)) => out.iter_mut().zip(v).for_each(|(o, v)| *o = *v),
            Some(Stored::Float(v)) => out.iter_mut().zip(v).for_each(|(o, v)| *o = *v as i32),
            None => out.fill(0),
        }
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        let mut st = self.state.borrow_mut();
        let name = st.alloc();
        st.textures.insert(name.get(), MockTexture::default());
        Ok(TextureId(name))
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut st = self.state.borrow_mut();
        st.textures.remove(&texture.get());
        st.texture_bindings.retain(|_, name| *name != texture.get());
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn bind_texture(&self, target: TextureTarget, texture: Option<TextureId>) {
        let mut st = self.state.borrow_mut();
        let key = (st.active_unit, bind_point(target));
        match texture {
            Some(t) => st.texture_bindings.insert(key, t.get()),
            None => st.texture_bindings.remove(&key),
        };
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
        if let Some(p) = pixels {
            let needed = format.data_len(ty, width, height);
            assert!(p.len() >= needed, "upload reads {needed} bytes from {}", p.len());
        }
        let mut st = self.state.borrow_mut();
        if let Some(t) = st.bound_texture_mut(target) {
            t.images.insert(
                target,
                MockImage { width, height, internal_format, has_data: pixels.is_some() },
            );
        }
    }

    fn tex_sub_image_2d(
        &self,
        target: TextureTarget,
        _x: u32,
        _y: u32,
        width: u32,
        height: u32,
        format: PixelFormat,
        ty: PixelType,
        pixels: &[u8],
    ) {
        let needed = format.data_len(ty, width, height);
        assert!(pixels.len() >= needed, "upload reads {needed} bytes from {}", pixels.len());
        if let Some(t) = self.state.borrow_mut().bound_texture_mut(target) {
            t.sub_uploads += 1;
        }
    }

    fn generate_mipmap(&self, target: TextureTarget) {
        if let Some(t) = self.state.borrow_mut().bound_texture_mut(target) {
            t.mipmaps += 1;
        }
    }

    fn tex_parameter(&self, target: TextureTarget, param: TextureParameter) {
        if let Some(t) = self.state.borrow_mut().bound_texture_mut(target) {
            t.params.push(param);
        }
    }

    fn max_anisotropy(&self) -> f32 {
        self.state.borrow().max_anisotropy
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        let mut st = self.state.borrow_mut();
        let name = st.alloc();
        st.buffers.insert(name.get(), Vec::new());
        Ok(BufferId(name))
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut st = self.state.borrow_mut();
        st.buffers.remove(&buffer.get());
        st.buffer_bindings.retain(|_, name| *name != buffer.get());
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        let mut st = self.state.borrow_mut();
        match buffer {
            Some(b) => st.buffer_bindings.insert(target, b.get()),
            None => st.buffer_bindings.remove(&target),
        };
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        let mut st = self.state.borrow_mut();
        let Some(name) = st.buffer_bindings.get(&target).copied() else { return };
        if let Some(buf) = st.buffers.get_mut(&name) {
            *buf = data.to_vec();
        }
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        let mut st = self.state.borrow_mut();
        let name = st.alloc();
        st.vertex_arrays.insert(name.get(), Vec::new());
        Ok(VertexArrayId(name))
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        let mut st = self.state.borrow_mut();
        st.vertex_arrays.remove(&vao.get());
        if st.bound_vertex_array == Some(vao.get()) {
            st.bound_vertex_array = None;
        }
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        self.state.borrow_mut().bound_vertex_array = vao.map(VertexArrayId::get);
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut st = self.state.borrow_mut();
        let Some(vao) = st.bound_vertex_array else { return };
        if let Some(attribs) = st.vertex_arrays.get_mut(&vao) {
            match attribs.iter_mut().find(|a| a.index == index) {
                Some(a) => a.enabled = true,
                None => attribs.push(MockAttrib {
                    index,
                    size: 0,
                    ty: AttribType::Float,
                    normalized: false,
                    stride: 0,
                    offset: 0,
                    enabled: true,
                }),
            }
        }
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
        let mut st = self.state.borrow_mut();
        let Some(vao) = st.bound_vertex_array else { return };
        if let Some(attribs) = st.vertex_arrays.get_mut(&vao) {
            let attr = MockAttrib { index, size, ty, normalized, stride, offset, enabled: false };
            match attribs.iter_mut().find(|a| a.index == index) {
                Some(a) => *a = MockAttrib { enabled: a.enabled, ..attr },
                None => attribs.push(attr),
            }
        }
    }
}

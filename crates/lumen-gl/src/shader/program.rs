use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::device::{GlDevice, ProgramId, ShaderId, UniformLocation};
use crate::error::{GfxError, Result};

use super::source::{ShaderPaths, ShaderSources};
use super::uniform::UniformValue;

/// Shared handle handed out by [`ShaderRegistry`](crate::registry::ShaderRegistry).
pub type SharedShader = Rc<ShaderProgram>;

/// Stage objects created during one compile. Deleted on drop, whatever the
/// outcome of the link.
struct StageObjects<'d> {
    device: &'d dyn GlDevice,
    shaders: Vec<ShaderId>,
}

impl Drop for StageObjects<'_> {
    fn drop(&mut self) {
        for shader in self.shaders.drain(..) {
            self.device.delete_shader(shader);
        }
    }
}

/// Compiles every stage in `sources` and links them into a new program.
///
/// The first stage that fails to compile aborts with [`GfxError::Compile`];
/// a failed link deletes the program and returns [`GfxError::Link`]. A
/// returned name is always a fully linked program.
pub fn compile(device: &dyn GlDevice, sources: &ShaderSources) -> Result<ProgramId> {
    let mut stages = StageObjects { device, shaders: Vec::with_capacity(3) };

    for (stage, source) in sources.stages() {
        let shader = device.create_shader(stage).map_err(GfxError::Device)?;
        stages.shaders.push(shader);
        device.shader_source(shader, source);
        device.compile_shader(shader);
        if !device.shader_compile_status(shader) {
            return Err(GfxError::Compile { stage, log: device.shader_info_log(shader) });
        }
    }

    let program = device.create_program().map_err(GfxError::Device)?;
    for &shader in &stages.shaders {
        device.attach_shader(program, shader);
    }
    device.link_program(program);

    if !device.program_link_status(program) {
        let log = device.program_info_log(program);
        device.delete_program(program);
        return Err(GfxError::Link { log });
    }

    Ok(program)
}

/// A linked GPU program with a uniform-location cache.
///
/// Methods take `&self` so the program can be shared through
/// [`SharedShader`]; the handle and cache use interior mutability. Not
/// `Clone`: duplicating would mean a second, independent GPU program.
pub struct ShaderProgram {
    device: Rc<dyn GlDevice>,
    program: Cell<Option<ProgramId>>,
    paths: Option<ShaderPaths>,
    /// Misses are cached as `None` so an absent uniform costs one query.
    uniform_cache: RefCell<HashMap<String, Option<UniformLocation>>>,
}

impl ShaderProgram {
    /// Reads, compiles and links the files in `paths`. The paths are kept
    /// for [`reload`](Self::reload).
    pub fn from_files(device: Rc<dyn GlDevice>, paths: ShaderPaths) -> Result<Self> {
        let sources = ShaderSources::read(&paths)?;
        let program = compile(&*device, &sources)?;
        log::info!("compiled program {} from {}", program.get(), paths);
        Ok(Self::with_program(device, program, Some(paths)))
    }

    /// Compiles in-memory sources. Such a program cannot be reloaded.
    pub fn from_sources(device: Rc<dyn GlDevice>, sources: &ShaderSources) -> Result<Self> {
        let program = compile(&*device, sources)?;
        log::debug!("compiled program {} from memory", program.get());
        Ok(Self::with_program(device, program, None))
    }

    fn with_program(device: Rc<dyn GlDevice>, program: ProgramId, paths: Option<ShaderPaths>) -> Self {
        Self {
            device,
            program: Cell::new(Some(program)),
            paths,
            uniform_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Raw driver name, `0` once destroyed.
    pub fn handle(&self) -> u32 {
        self.program.get().map_or(0, ProgramId::get)
    }

    pub fn is_valid(&self) -> bool {
        self.program.get().is_some()
    }

    /// Source paths, `None` for programs built from memory.
    pub fn paths(&self) -> Option<&ShaderPaths> {
        self.paths.as_ref()
    }

    /// Makes this the current program. Logs an error and does nothing if
    /// the program has been destroyed.
    pub fn use_program(&self) {
        match self.program.get() {
            Some(program) => self.device.use_program(Some(program)),
            None => log::error!("attempted to use an invalid shader program"),
        }
    }

    /// Resolves `name` through the cache, querying the driver on first use.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        let program = self.program.get()?;

        if let Some(cached) = self.uniform_cache.borrow().get(name) {
            return *cached;
        }

        let location = self.device.uniform_location(program, name);
        if location.is_none() {
            log::warn!("uniform '{name}' not found in program {}", program.get());
        }
        self.uniform_cache.borrow_mut().insert(name.to_string(), location);
        location
    }

    /// Writes `value` to uniform `name` of the current program.
    ///
    /// The program must be current ([`use_program`](Self::use_program)).
    /// Absent uniforms are skipped; the miss is logged once per cache
    /// lifetime.
    pub fn set_uniform<'a>(&self, name: &str, value: impl Into<UniformValue<'a>>) {
        if !self.is_valid() {
            log::warn!("set_uniform('{name}') on an invalid shader program");
            return;
        }
        if let Some(location) = self.uniform_location(name) {
            self.device.set_uniform(location, &value.into());
        }
    }

    /// Reads the current value of `name` back from the driver. Array elements
    /// are read one at a time by their own name (`u_lights[2]`).
    ///
    /// Returns `false`, leaving `out` untouched, when the uniform is absent or
    /// `out` is shorter than one element of its type.
    pub fn read_uniform_f32(&self, name: &str, out: &mut [f32]) -> bool {
        match self.readback_target(name, out.len()) {
            Some((program, location)) => {
                self.device.get_uniform_f32(program, location, out);
                true
            }
            None => false,
        }
    }

    /// Integer counterpart of [`read_uniform_f32`](Self::read_uniform_f32).
    pub fn read_uniform_i32(&self, name: &str, out: &mut [i32]) -> bool {
        match self.readback_target(name, out.len()) {
            Some((program, location)) => {
                self.device.get_uniform_i32(program, location, out);
                true
            }
            None => false,
        }
    }

    fn readback_target(&self, name: &str, len: usize) -> Option<(ProgramId, UniformLocation)> {
        let program = self.program.get()?;
        let location = self.uniform_location(name)?;
        match self.device.uniform_components(program, location) {
            Some(n) if len >= n as usize => Some((program, location)),
            Some(n) => {
                log::warn!("uniform '{name}' has {n} components, buffer holds {len}");
                None
            }
            None => {
                log::warn!("uniform '{name}' has no readable type");
                None
            }
        }
    }

    pub fn clear_uniform_cache(&self) {
        self.uniform_cache.borrow_mut().clear();
    }

    /// Rebuilds the program from its source files.
    ///
    /// A new program is compiled and linked first; only when that succeeds
    /// is the live handle swapped, the old program deleted and the uniform
    /// cache cleared. On failure the previous program stays in use and the
    /// error is returned. Callers re-bind with [`use_program`](Self::use_program)
    /// after a successful reload.
    pub fn reload(&self) -> Result<()> {
        let Some(paths) = &self.paths else {
            return Err(GfxError::Unsupported("program was built from in-memory sources"));
        };

        let fresh = ShaderSources::read(paths).and_then(|sources| compile(&*self.device, &sources));

        match fresh {
            Ok(program) => {
                if let Some(old) = self.program.replace(Some(program)) {
                    self.device.delete_program(old);
                }
                self.clear_uniform_cache();
                log::info!("reloaded program {} from {}", program.get(), paths);
                Ok(())
            }
            Err(err) => {
                log::error!("reload of {paths} failed, keeping previous program: {err}");
                Err(err)
            }
        }
    }

    /// Releases the GPU program now, leaving this object invalid. Useful
    /// when the context goes away before every shared handle is dropped.
    pub fn destroy(&self) {
        if let Some(program) = self.program.take() {
            self.device.delete_program(program);
        }
        self.clear_uniform_cache();
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if let Some(program) = self.program.take() {
            self.device.delete_program(program);
        }
    }
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle())
            .field("paths", &self.paths)
            .field("cached_uniforms", &self.uniform_cache.borrow().len())
            .finish()
    }
}

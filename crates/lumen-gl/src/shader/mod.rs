//! Shader programs.
//!
//! - `compile` turns stage sources into a linked program name
//! - `ShaderProgram` owns that name, caches uniform locations and reloads
//!   from disk in place
//!
//! Uniform writes go to the current program, so call `use_program` first.

mod program;
mod source;
mod uniform;

pub use program::{compile, ShaderProgram, SharedShader};
pub use source::{ShaderPaths, ShaderSources};
pub use uniform::UniformValue;

//! Shared fixtures for unit tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::device::GlDevice;
use crate::device::mock::MockDevice;
use crate::shader::ShaderPaths;

pub(crate) const VERTEX: &str = "#version 330 core
layout(location = 0) in vec3 a_pos;
uniform mat4 u_mvp;
void main() {
    gl_Position = u_mvp * vec4(a_pos, 1.0);
}
";

pub(crate) const FRAGMENT: &str = "#version 330 core
out vec4 frag_color;
uniform float u_time;
uniform vec4 u_tint;
uniform int u_units[2];
void main() {
    frag_color = u_tint * u_time;
}
";

/// Declares one extra uniform so tests can tell a reload happened.
pub(crate) const FRAGMENT_V2: &str = "#version 330 core
out vec4 frag_color;
uniform float u_time;
uniform vec4 u_tint;
uniform float u_exposure;
void main() {
    frag_color = u_tint * u_time * u_exposure;
}
";

pub(crate) const BROKEN_FRAGMENT: &str = "#version 330 core
out vec4 frag_color;
void main() {
    frag_color = vec4(1.0;
}
";

pub(crate) const GEOMETRY: &str = "#version 330 core
layout(triangles) in;
layout(triangle_strip, max_vertices = 3) out;
void main() {
    EmitVertex();
    EndPrimitive();
}
";

/// Mock device plus the same device as a trait object.
pub(crate) fn mock_device() -> (Rc<MockDevice>, Rc<dyn GlDevice>) {
    let mock = Rc::new(MockDevice::new());
    let device: Rc<dyn GlDevice> = mock.clone();
    (mock, device)
}

/// Writes `<stem>.vs` (always [`VERTEX`]) and `<stem>.fs` into `dir`.
pub(crate) fn write_program(dir: &Path, stem: &str, fragment: &str) -> ShaderPaths {
    let vs = dir.join(format!("{stem}.vs"));
    let fs_path = dir.join(format!("{stem}.fs"));
    fs::write(&vs, VERTEX).unwrap();
    fs::write(&fs_path, fragment).unwrap();
    ShaderPaths::new(vs, fs_path)
}

/// Writes a solid-color PNG with 1 to 4 channels.
pub(crate) fn write_png(dir: &Path, name: &str, width: u32, height: u32, channels: u8) -> PathBuf {
    let path = dir.join(name);
    match channels {
        1 => image::GrayImage::from_pixel(width, height, image::Luma([200])).save(&path),
        2 => image::GrayAlphaImage::from_pixel(width, height, image::LumaA([200, 255])).save(&path),
        3 => image::RgbImage::from_pixel(width, height, image::Rgb([255, 0, 0])).save(&path),
        _ => image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255])).save(&path),
    }
    .unwrap();
    path
}

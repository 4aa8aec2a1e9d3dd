//! Building blocks for a spinning-cube GPU demo.
//!
//! The crate exposes the procedural geometry generator, the accumulating
//! transform builder, and the shader loading/compilation/linking plumbing
//! as reusable pieces.  Windowing and the GPU surface live in the binary,
//! so everything here stays testable in headless environments.

pub mod app;
pub mod assets;
pub mod error;
pub mod geometry;
pub mod render;
pub mod scene;
pub mod shader;
pub mod spin;
pub mod transform;

pub use app::{projection_matrix, FrameTimer, WindowViewport};
pub use assets::ResourceStore;
pub use error::{Error, Result};
pub use geometry::{generate_cube, generate_square, MeshBuffers, QuadBuffers};
pub use render::{FrameParams, Renderer};
pub use scene::{CameraSettings, CubeSettings, SceneSettings, ShaderNames};
pub use shader::{compile, CompiledShader, ShaderProgram, ShaderStage};
pub use spin::Spin;
pub use transform::Transformations;

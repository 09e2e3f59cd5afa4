//! Keel GFX - redundant state elimination
//!
//! A [`Context`] mirrors the state its [`Driver`] was last told about and
//! filters requested state down to the transitions that actually change
//! something:
//! - Texture, sampler and image units (single and batched)
//! - Raster blocks and render flags
//! - Vertex declaration, attributes, vertex and feedback streams
//! - Program, program parameters and subroutines
//! - Viewport, derived scissor and render targets
//!
//! ```ignore
//! let mut ctx = Context::new(RecordingDriver::default(), ContextConfig::default())?;
//! ctx.checked_sampler(Some(&linear), 0);
//! ctx.checked_texture(Some(&albedo), 0);
//! ctx.checked_texture(Some(&albedo), 0); // no driver call
//! ```

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod mirror;
pub mod parameter;
pub mod state;

pub use config::{ContextConfig, VertexPath};
pub use context::Context;
pub use driver::{Driver, DriverCall, DriverSnapshot, NullDriver, RecordingDriver};
pub use error::InitError;
pub use mirror::{Mirror, MAX_RWTEXTURE_IMAGES, MAX_TEXTURE_IMAGES};
pub use parameter::{ParameterData, ParameterFn, ParameterKind, ParameterScope, ProgramParameter};
pub use state::{
    FeedbackState, ProgramState, RasterState, VertexState, ViewPort, ViewPortMrt, MAX_FEEDBACK_STREAMS,
    MAX_UNIFORM_BUFFERS, MAX_VIEWPORTS,
};

pub use keel_core;

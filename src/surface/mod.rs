//! Live edge registry and frame-coalesced redraws for one mounted surface.

mod engine;
mod scheduler;
mod types;

pub use engine::{EdgeError, HookError, MountHook, Surface, SurfaceHost, SurfaceOptions};
pub use scheduler::{FrameRequester, FrameScheduler, ManualFrames, ScheduleState};
pub use types::{
    ConnectDeclaration, DrawReport, EdgeDefinition, EdgeKind, EdgeParams, OneOrMany, RenderedEdge,
    edge_key,
};

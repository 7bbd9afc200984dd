//! Render-submission interface.
//!
//! The simulation never touches the GPU. Each frame it hands a [`FrameView`]
//! and a list of [`DrawItem`]s to whatever implements [`RenderSink`].

use glam::{Mat4, Vec3};

/// Per-frame camera and lighting state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub camera_position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    pub light_position: Vec3,
    pub light_color: Vec3,
}

/// What to draw. Mesh and texture selection belong to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drawable {
    SpaceBox,
    Craft,
    Asteroid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub drawable: Drawable,
    /// World transform, scale included.
    pub model: Mat4,
    pub visible: bool,
    /// Lit by ambient light only (the sky box).
    pub force_ambient: bool,
}

impl DrawItem {
    pub fn new(drawable: Drawable, model: Mat4) -> Self {
        Self {
            drawable,
            model,
            visible: true,
            force_ambient: false,
        }
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_force_ambient(mut self, force_ambient: bool) -> Self {
        self.force_ambient = force_ambient;
        self
    }
}

/// Consumer of a frame's draw submissions. Fire-and-forget.
pub trait RenderSink {
    fn begin_frame(&mut self, frame: &FrameView);

    fn draw(&mut self, item: &DrawItem);
}

/// Sink that keeps the last submitted frame, for tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frame: Option<FrameView>,
    pub items: Vec<DrawItem>,
}

impl RenderSink for RecordingSink {
    fn begin_frame(&mut self, frame: &FrameView) {
        self.frame = Some(*frame);
        self.items.clear();
    }

    fn draw(&mut self, item: &DrawItem) {
        self.items.push(*item);
    }
}

impl RecordingSink {
    pub fn count(&self, drawable: Drawable) -> usize {
        self.items.iter().filter(|i| i.drawable == drawable).count()
    }
}

//! Headless render sink that tallies what each frame would draw.

use engine_core::Vec3;
use renderer::{CameraUniform, DrawItem, Drawable, FrameView, RenderSink};

/// Counts draw submissions and logs a summary every `log_every` frames.
#[derive(Debug)]
pub struct StatsSink {
    log_every: u64,
    frames: u64,
    uniform: CameraUniform,
    asteroids: usize,
    crafts: usize,
    hidden: usize,
    /// Largest asteroid count seen in one frame.
    peak_asteroids: usize,
}

impl StatsSink {
    pub fn new(log_every: u64) -> Self {
        Self {
            log_every: log_every.max(1),
            frames: 0,
            uniform: CameraUniform::new(),
            asteroids: 0,
            crafts: 0,
            hidden: 0,
            peak_asteroids: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn peak_asteroids(&self) -> usize {
        self.peak_asteroids
    }

    /// Asteroids drawn in the last completed frame.
    pub fn asteroids(&self) -> usize {
        self.asteroids
    }

    pub fn camera_position(&self) -> Vec3 {
        let [x, y, z, _] = self.uniform.position;
        Vec3::new(x, y, z)
    }

    /// Fold the last submitted frame into the totals. Call once after the
    /// final frame; `begin_frame` does this for every earlier one.
    pub fn finish(&mut self) {
        self.finish_frame();
    }

    fn finish_frame(&mut self) {
        if self.frames == 0 {
            return;
        }
        self.peak_asteroids = self.peak_asteroids.max(self.asteroids);
        if self.frames % self.log_every == 0 {
            log::debug!(
                "frame {}: {} asteroids, {} craft ({} hidden), camera at {:.1}",
                self.frames,
                self.asteroids,
                self.crafts,
                self.hidden,
                self.camera_position()
            );
        }
    }
}

impl RenderSink for StatsSink {
    fn begin_frame(&mut self, frame: &FrameView) {
        self.finish_frame();
        self.frames += 1;
        self.uniform.update(frame);
        self.asteroids = 0;
        self.crafts = 0;
        self.hidden = 0;
    }

    fn draw(&mut self, item: &DrawItem) {
        if !item.visible {
            self.hidden += 1;
        }
        match item.drawable {
            Drawable::Asteroid => self.asteroids += 1,
            Drawable::Craft => self.crafts += 1,
            Drawable::SpaceBox => {}
        }
    }
}

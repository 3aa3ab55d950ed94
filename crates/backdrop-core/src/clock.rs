use instant::Instant;

/// Wall-clock epoch for the animation loop. Frames read absolute elapsed
/// time from it, never a delta.
#[derive(Copy, Clone, Debug)]
pub struct FrameClock {
    epoch: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed_secs(&self) -> f32 {
        self.epoch.elapsed().as_secs_f32()
    }
}

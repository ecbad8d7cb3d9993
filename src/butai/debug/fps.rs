use std::time::Duration;

/// Counts frames and reports the rate once per `report_every` of frame time.
pub struct Counter {
    elapsed: Duration,
    report_every: Duration,
    counter: u32,
}

impl Counter {
    pub fn new(report_every: Duration) -> Self {
        Self {
            elapsed: Duration::from_secs(0),
            report_every,
            counter: 0,
        }
    }

    pub fn tick(&mut self, frame_time: Duration) -> Option<f64> {
        self.elapsed += frame_time;
        self.counter += 1;
        if self.elapsed >= self.report_every && self.elapsed > Duration::from_secs(0) {
            let fps = f64::from(self.counter) / self.elapsed.as_secs_f64();
            self.elapsed = Duration::from_secs(0);
            self.counter = 0;
            Some(fps)
        } else {
            None
        }
    }
}

/// Rolling frame statistics of the render window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub last_fps: f32,
    pub avg_fps: f32,
    pub best_fps: f32,
    pub worst_fps: f32,
    pub best_frame_time: f32,
    pub worst_frame_time: f32,
    pub frame_count: u64,
    pub total_time: f32,
    pub batch_count: usize,
}

impl Default for FrameStats {
    fn default() -> Self {
        FrameStats {
            last_fps: 0.0,
            avg_fps: 0.0,
            best_fps: 0.0,
            worst_fps: 999.0,
            best_frame_time: 999_999.0,
            worst_frame_time: 0.0,
            frame_count: 0,
            total_time: 0.0,
            batch_count: 0,
        }
    }
}

pub struct StatsTracker {
    stats: FrameStats,
    counter: Counter,
}

impl StatsTracker {
    pub fn new() -> Self {
        StatsTracker {
            stats: FrameStats::default(),
            counter: Counter::new(Duration::from_secs(1)),
        }
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn set_batch_count(&mut self, batches: usize) {
        self.stats.batch_count = batches;
    }

    /// Folds one frame of `dt` seconds in. Returns the fresh rate when a report window closes.
    pub fn record(&mut self, dt: f32) -> Option<f32> {
        let s = &mut self.stats;
        s.frame_count += 1;
        s.total_time += dt;
        let ms = dt * 1000.0;
        s.best_frame_time = s.best_frame_time.min(ms);
        s.worst_frame_time = s.worst_frame_time.max(ms);
        if s.total_time > 0.0 {
            s.avg_fps = s.frame_count as f32 / s.total_time;
        }

        let fps = self
            .counter
            .tick(Duration::from_secs_f32(dt.max(0.0)))? as f32;
        let s = &mut self.stats;
        s.last_fps = fps;
        s.best_fps = s.best_fps.max(fps);
        s.worst_fps = s.worst_fps.min(fps);
        Some(fps)
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

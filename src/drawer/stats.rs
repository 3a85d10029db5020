use std::collections::VecDeque;

pub const DEFAULT_STATS_WINDOW: usize = 75;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderSnapshot {
    pub avg_ms: f64,
    pub worst_ms: f64,
    pub p95_ms: f64,
    pub frame_samples: usize,
    pub frames_total: u64,
    pub last_shape_count: usize,
}

/// Rolling window of frame durations measured by the presenter.
#[derive(Debug, Clone)]
pub struct RenderStats {
    window_size: usize,
    frame_ms_window: VecDeque<f64>,
    frames_total: u64,
    last_shape_count: usize,
}

impl Default for RenderStats {
    fn default() -> Self {
        Self::new(DEFAULT_STATS_WINDOW)
    }
}

impl RenderStats {
    pub fn new(rolling_window: usize) -> Self {
        Self {
            window_size: rolling_window.max(1),
            frame_ms_window: VecDeque::with_capacity(rolling_window.max(1)),
            frames_total: 0,
            last_shape_count: 0,
        }
    }

    pub fn finish_frame(&mut self, frame_ms: f64, shapes: usize) {
        self.frame_ms_window.push_back(frame_ms);
        while self.frame_ms_window.len() > self.window_size {
            let _ = self.frame_ms_window.pop_front();
        }
        self.frames_total = self.frames_total.saturating_add(1);
        self.last_shape_count = shapes;
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            avg_ms: avg(&self.frame_ms_window),
            worst_ms: max(&self.frame_ms_window),
            p95_ms: p95(&self.frame_ms_window),
            frame_samples: self.frame_ms_window.len(),
            frames_total: self.frames_total,
            last_shape_count: self.last_shape_count,
        }
    }

    /// Window caption showing the average frame time and shape count.
    pub fn title(&self, prefix: &str) -> String {
        let shapes = self.last_shape_count;
        format!(
            "{prefix} - Render Time = {:.2}ms ({shapes} {})",
            avg(&self.frame_ms_window),
            if shapes == 1 { "shape" } else { "shapes" }
        )
    }
}

fn avg(window: &VecDeque<f64>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

fn max(window: &VecDeque<f64>) -> f64 {
    window.iter().copied().fold(0.0, f64::max)
}

fn p95(window: &VecDeque<f64>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let mut values: Vec<f64> = window.iter().copied().collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((values.len() as f64 * 0.95).ceil() as usize).saturating_sub(1);
    values[idx.min(values.len() - 1)]
}

//! Batch progress aggregation
//!
//! Each item reports its own percentage. The overall figure is the
//! unweighted mean of the item percentages, recomputed and reported on
//! every individual tick.

use std::sync::Mutex;

/// Percentage of `sent` out of `total`, 0-100. An empty upload counts as done.
pub fn percent(sent: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        (sent as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// Aggregates per-item percentages into one overall percentage
pub struct BatchProgress<F>
where
    F: Fn(f64) + Send + Sync,
{
    items: Mutex<Vec<f64>>,
    on_progress: F,
}

impl<F> BatchProgress<F>
where
    F: Fn(f64) + Send + Sync,
{
    pub fn new(item_count: usize, on_progress: F) -> Self {
        Self {
            items: Mutex::new(vec![0.0; item_count]),
            on_progress,
        }
    }

    /// Record progress for one item and report the new overall percentage
    pub fn update(&self, index: usize, item_percent: f64) {
        let overall = {
            let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(slot) = items.get_mut(index) {
                *slot = item_percent.clamp(0.0, 100.0);
            }
            mean(&items)
        };
        (self.on_progress)(overall);
    }

    /// Current overall percentage
    pub fn overall(&self) -> f64 {
        mean(&self.items.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 100.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

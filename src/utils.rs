use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct ProgressCounter {
    label: &'static str,
    interval: u64,
    count: AtomicU64,
}

impl ProgressCounter {
    pub fn new(label: &'static str, interval: u64) -> Self {
        let counter = Self {
            label,
            interval: interval.max(1),
            count: AtomicU64::new(0),
        };
        counter.print(0);
        counter
    }

    pub fn inc(&self, delta: u64) {
        let prev = self.count.fetch_add(delta, Ordering::SeqCst);
        let current = prev + delta;
        // Print if we crossed an interval boundary
        if prev / self.interval < current / self.interval {
            self.print(current);
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        self.print(self.count());
        eprintln!();
    }

    fn print(&self, current: u64) {
        eprint!("\r{}: {}", self.label, current);
        let _ = std::io::stderr().flush();
    }
}

/// `res_partner` -> `res.partner`
pub fn model_name(model: &str) -> String {
    model.replace('_', ".")
}

/// Split a comma-separated field list, dropping blanks.
pub fn split_fields(fields: Option<&str>) -> Vec<String> {
    fields
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

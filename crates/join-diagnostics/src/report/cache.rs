use parking_lot::RwLock;
use std::sync::Arc;

use super::JoinReport;

/// Single-slot holder for the most recent report.
///
/// Last writer wins. Nothing in the analysis reads this slot; it exists for
/// callers that want to show or re-export the previous result.
#[derive(Debug, Default)]
pub struct LastReport {
    slot: RwLock<Option<Arc<JoinReport>>>,
}

impl LastReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored report and return a shared handle to it.
    pub fn store(&self, report: JoinReport) -> Arc<JoinReport> {
        let report = Arc::new(report);
        *self.slot.write() = Some(Arc::clone(&report));
        report
    }

    pub fn get(&self) -> Option<Arc<JoinReport>> {
        self.slot.read().clone()
    }

    /// Remove and return the stored report.
    pub fn take(&self) -> Option<Arc<JoinReport>> {
        self.slot.write().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisOptions;
    use crate::engine::analyze;
    use crate::keys::KeySpec;
    use crate::table::{Column, Table};

    fn report_for(ids: Vec<Option<i64>>) -> JoinReport {
        let x = Table::new(vec![Column::integer("id", ids)]).unwrap();
        analyze(&x, &x, &KeySpec::shared(["id"]), &AnalysisOptions::default()).unwrap()
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = LastReport::new();
        assert!(cache.get().is_none());

        cache.store(report_for(vec![Some(1)]));
        cache.store(report_for(vec![Some(1), Some(2)]));
        assert_eq!(cache.get().unwrap().x_summary.row_count, 2);

        assert!(cache.take().is_some());
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(LastReport::new());
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.store(report_for((0..n).map(Some).collect()));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let rows = cache.get().unwrap().x_summary.row_count;
        assert!((1..=4).contains(&rows));
    }
}

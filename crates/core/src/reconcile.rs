//! Works out which stored records an incremental run must delete and which
//! documents it must (re)index.

use crate::scanner::DiscoveredDocument;
use std::collections::HashSet;
use storage::StoredRecord;
use tracing::debug;

/// Current modification time of a path, `None` once it is gone.
pub trait FileProbe {
    fn modified(&self, path: &str) -> Option<f64>;
}

impl<F> FileProbe for F
where
    F: Fn(&str) -> Option<f64>,
{
    fn modified(&self, path: &str) -> Option<f64> {
        self(path)
    }
}

/// Deletes are applied before adds, so a path in both lists is replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationPlan {
    pub deletes: Vec<String>,
    pub adds: Vec<String>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.adds.is_empty()
    }
}

pub fn reconcile(
    prior: &[StoredRecord],
    current: &[DiscoveredDocument],
    probe: &dyn FileProbe,
) -> ReconciliationPlan {
    let mut plan = ReconciliationPlan::default();
    let mut stale: HashSet<&str> = HashSet::new();

    for record in prior {
        match probe.modified(&record.path) {
            None => {
                debug!(path = %record.path, "removed since last run");
                plan.deletes.push(record.path.clone());
            }
            Some(t) if t > record.modification_time => {
                debug!(path = %record.path, "modified since last run");
                plan.deletes.push(record.path.clone());
                stale.insert(&record.path);
            }
            Some(_) => {}
        }
    }

    let known: HashSet<&str> = prior.iter().map(|r| r.path.as_str()).collect();
    plan.adds = current
        .iter()
        .filter(|d| stale.contains(d.path.as_str()) || !known.contains(d.path.as_str()))
        .map(|d| d.path.clone())
        .collect();
    plan
}

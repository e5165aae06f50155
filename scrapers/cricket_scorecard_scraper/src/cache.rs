use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

use crate::{error::ExtractionError, types::Report};

pub type CachedExtraction = Result<Report, ExtractionError>;

/// Content-addressed key for one extraction input.
pub fn cache_key(raw_html: &str, title_hint: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title_hint.unwrap_or_default().as_bytes());
    hasher.update([0u8]);
    hasher.update(raw_html.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Remembers extraction outcomes, failures included, by input content.
///
/// Extraction is a pure function of its input, so a hit is always identical to re-running it.
/// Oldest entries are evicted first once `capacity` is reached.
#[derive(Debug, Default)]
pub struct ExtractionCache {
    capacity: usize,
    entries: HashMap<String, CachedExtraction>,
    order: VecDeque<String>,
}

impl ExtractionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CachedExtraction> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, outcome: CachedExtraction) {
        if self.capacity == 0 || self.entries.contains_key(&key) {
            return;
        }
        while self.order.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, outcome);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

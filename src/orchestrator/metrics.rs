use serde::Serialize;
use std::collections::HashMap;

/// Success/failure counts per provider name
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metrics {
    success_counts: HashMap<String, u64>,
    failure_counts: HashMap<String, u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, provider: &str) {
        *self.success_counts.entry(provider.to_string()).or_insert(0) += 1;
    }

    pub fn record_failure(&mut self, provider: &str) {
        *self.failure_counts.entry(provider.to_string()).or_insert(0) += 1;
    }

    pub fn success_count(&self, provider: &str) -> u64 {
        self.success_counts.get(provider).copied().unwrap_or(0)
    }

    pub fn failure_count(&self, provider: &str) -> u64 {
        self.failure_counts.get(provider).copied().unwrap_or(0)
    }

    pub fn success_rate(&self, provider: &str) -> f32 {
        let success = self.success_count(provider) as f32;
        let total = success + self.failure_count(provider) as f32;

        if total == 0.0 {
            0.0
        } else {
            success / total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_rate() {
        let mut metrics = Metrics::new();
        metrics.record_success("groq");
        metrics.record_success("groq");
        metrics.record_success("groq");
        metrics.record_failure("groq");

        assert_eq!(metrics.success_count("groq"), 3);
        assert_eq!(metrics.failure_count("groq"), 1);
        assert!((metrics.success_rate("groq") - 0.75).abs() < f32::EPSILON);
        assert_eq!(metrics.success_rate("gemini"), 0.0);
    }
}

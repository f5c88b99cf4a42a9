//! Batch translation driver
//!
//! Translates a document line by line through the configured translation
//! service. Only one batch may run at a time; progress is published through
//! shared counters so the API can report it while the batch is in flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::{DomainError, TranslationService};

/// Shared progress counters for the batch currently in flight
#[derive(Debug, Default)]
pub struct BatchProgress {
    total: AtomicUsize,
    completed: AtomicUsize,
}

/// Point-in-time view of batch progress
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub completed: usize,
    pub percent: u32,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.completed.store(0, Ordering::SeqCst);
    }

    fn tick(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let total = self.total.load(Ordering::SeqCst);
        let completed = self.completed.load(Ordering::SeqCst);
        let percent = if total == 0 {
            0
        } else {
            (completed * 100 / total) as u32
        };

        ProgressSnapshot {
            total,
            completed,
            percent,
        }
    }
}

/// Drives one batch at a time through the translation service
#[derive(Debug)]
pub struct BatchTranslator {
    service: Arc<dyn TranslationService>,
    progress: Arc<BatchProgress>,
    pacing: Duration,
    running: Mutex<()>,
}

impl BatchTranslator {
    pub fn new(
        service: Arc<dyn TranslationService>,
        progress: Arc<BatchProgress>,
        pacing: Duration,
    ) -> Self {
        Self {
            service,
            progress,
            pacing,
            running: Mutex::new(()),
        }
    }

    /// Translate every line of `lines` in order. A line that fails after all
    /// fallbacks keeps its slot with a failure placeholder, so the output
    /// always has the same line count as the input. Returns `Conflict` if a
    /// batch is already running.
    pub async fn run(
        &self,
        model_id: &str,
        system_prompt: &str,
        lines: Vec<String>,
    ) -> Result<Vec<String>, DomainError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| DomainError::conflict("A batch translation is already running"))?;

        self.progress.begin(lines.len());
        tracing::info!(model_id, lines = lines.len(), "starting batch translation");

        let mut output = Vec::with_capacity(lines.len());
        let last = lines.len().saturating_sub(1);

        for (index, line) in lines.into_iter().enumerate() {
            // Blank lines keep document structure without burning a call
            if line.trim().is_empty() {
                output.push(line);
            } else {
                match self.service.translate(model_id, system_prompt, &line).await {
                    Ok(text) => output.push(text),
                    Err(error) => {
                        tracing::warn!(model_id, line = index, %error, "batch line failed");
                        output.push(format!("[translation failed: {error}]"));
                    }
                }

                // pace requests to stay under provider rate limits
                if index < last && !self.pacing.is_zero() {
                    tokio::time::sleep(self.pacing).await;
                }
            }

            self.progress.tick();
        }

        tracing::info!(model_id, lines = output.len(), "batch translation finished");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::translation::mock::MockTranslationService;

    fn batch(service: MockTranslationService) -> (BatchTranslator, Arc<BatchProgress>) {
        let progress = Arc::new(BatchProgress::new());
        let translator =
            BatchTranslator::new(Arc::new(service), Arc::clone(&progress), Duration::ZERO);
        (translator, progress)
    }

    #[tokio::test]
    async fn test_batch_preserves_line_count_and_order() {
        let (translator, progress) = batch(MockTranslationService::new());

        let lines = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let output = translator.run("model", "sys", lines).await.unwrap();

        assert_eq!(
            output,
            vec!["one [translated]", "two [translated]", "three [translated]"]
        );
        assert_eq!(
            progress.snapshot(),
            ProgressSnapshot {
                total: 3,
                completed: 3,
                percent: 100
            }
        );
    }

    #[tokio::test]
    async fn test_failed_line_becomes_placeholder_and_batch_continues() {
        let (translator, progress) = batch(MockTranslationService::new().failing_on("boom"));

        let lines = vec!["fine".to_string(), "boom here".to_string(), "also fine".to_string()];
        let output = translator.run("model", "sys", lines).await.unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(output[0], "fine [translated]");
        assert!(output[1].starts_with("[translation failed:"));
        assert_eq!(output[2], "also fine [translated]");
        assert_eq!(progress.snapshot().percent, 100);
    }

    #[tokio::test]
    async fn test_blank_lines_pass_through_without_translation() {
        let (translator, progress) = batch(MockTranslationService::new());

        let lines = vec!["text".to_string(), "".to_string(), "more".to_string()];
        let output = translator.run("model", "sys", lines).await.unwrap();

        assert_eq!(output[1], "");
        assert_eq!(progress.snapshot().completed, 3);
    }

    #[tokio::test]
    async fn test_second_batch_is_rejected_while_one_runs() {
        let (translator, _progress) = batch(MockTranslationService::new());

        let _held = translator.running.try_lock().unwrap();
        let err = translator
            .run("model", "sys", vec!["line".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_empty_batch_reports_zero_percent() {
        let (translator, progress) = batch(MockTranslationService::new());

        let output = translator.run("model", "sys", Vec::new()).await.unwrap();
        assert!(output.is_empty());
        assert_eq!(progress.snapshot().percent, 0);
    }
}

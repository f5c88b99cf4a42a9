//! SQLite ratings store and statistics
//!
//! Persists per-translation quality ratings and aggregates them into the
//! seven-day statistics view: a time series, a rating distribution, per
//! language-pair and per-model averages, and a handful of plain-English
//! insights derived from the aggregates.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::domain::{DomainError, ModelRegistry};

/// Aggregation window for all statistics queries
const STATS_WINDOW_DAYS: i64 = 7;

/// Time-series bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
}

impl Granularity {
    fn strftime_format(&self) -> &'static str {
        match self {
            Self::Hour => "%Y-%m-%d %H:00",
            Self::Day => "%Y-%m-%d",
        }
    }
}

/// A rating as submitted by a caller. Carries the rated texts so a rating
/// can be audited against the translation it scored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRating {
    pub rating: u8,
    pub source_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub model_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeBucket {
    pub period: String,
    pub average: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguagePairStat {
    pub source_language: String,
    pub target_language: String,
    pub average: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelStat {
    pub model_id: String,
    pub display_name: String,
    pub average: f64,
    pub count: i64,
}

/// Seven-day statistics view
#[derive(Debug, Clone, Serialize)]
pub struct RatingStats {
    pub time_series: Vec<TimeBucket>,
    /// Counts for ratings 1 through 5, in order
    pub distribution: [i64; 5],
    pub language_pairs: Vec<LanguagePairStat>,
    pub models: Vec<ModelStat>,
    pub insights: Vec<String>,
}

/// SQLite-backed ratings repository
#[derive(Debug, Clone)]
pub struct RatingsStore {
    pool: SqlitePool,
    registry: Arc<ModelRegistry>,
}

impl RatingsStore {
    /// Connect to the database and ensure the schema exists.
    pub async fn connect(
        database_url: &str,
        registry: Arc<ModelRegistry>,
    ) -> Result<Self, DomainError> {
        // single connection: SQLite serializes writes anyway, and an
        // in-memory database only exists on the connection that created it
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .connect(database_url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to open ratings database: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS translation_ratings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                rating INTEGER NOT NULL,
                source_text TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                source_language TEXT NOT NULL,
                target_language TEXT NOT NULL,
                model_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create ratings schema: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_ratings_created_at \
             ON translation_ratings (created_at)",
        )
        .execute(&pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create ratings index: {}", e)))?;

        Ok(Self { pool, registry })
    }

    /// Cheap connectivity probe for readiness checks.
    pub async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Ratings database unreachable: {}", e)))?;
        Ok(())
    }

    /// Record one rating. Ratings outside 1..=5 are rejected.
    pub async fn submit(&self, rating: NewRating) -> Result<i64, DomainError> {
        if !(1..=5).contains(&rating.rating) {
            return Err(DomainError::validation(format!(
                "Rating must be between 1 and 5, got {}",
                rating.rating
            )));
        }

        self.insert_at(&rating, Utc::now()).await
    }

    async fn insert_at(
        &self,
        rating: &NewRating,
        created_at: DateTime<Utc>,
    ) -> Result<i64, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO translation_ratings
                (rating, source_text, translated_text, source_language,
                 target_language, model_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(i64::from(rating.rating))
        .bind(&rating.source_text)
        .bind(&rating.translated_text)
        .bind(&rating.source_language)
        .bind(&rating.target_language)
        .bind(&rating.model_id)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to store rating: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    /// Aggregate the last seven days of ratings.
    pub async fn stats(&self, granularity: Granularity) -> Result<RatingStats, DomainError> {
        let cutoff = (Utc::now() - Duration::days(STATS_WINDOW_DAYS)).to_rfc3339();

        let time_series = self.time_series(granularity, &cutoff).await?;
        let distribution = self.distribution(&cutoff).await?;
        let language_pairs = self.language_pairs(&cutoff).await?;
        let models = self.models(&cutoff).await?;
        let insights = self
            .insights(&cutoff, &time_series, &language_pairs, &models)
            .await?;

        Ok(RatingStats {
            time_series,
            distribution,
            language_pairs,
            models,
            insights,
        })
    }

    async fn time_series(
        &self,
        granularity: Granularity,
        cutoff: &str,
    ) -> Result<Vec<TimeBucket>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT strftime(?1, created_at) AS period,
                   AVG(rating) AS average,
                   COUNT(*) AS cnt
            FROM translation_ratings
            WHERE created_at >= ?2
            GROUP BY period
            ORDER BY period
            "#,
        )
        .bind(granularity.strftime_format())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load rating time series: {}", e)))?;

        Ok(rows
            .iter()
            .map(|row| TimeBucket {
                period: row.get("period"),
                average: row.get("average"),
                count: row.get("cnt"),
            })
            .collect())
    }

    async fn distribution(&self, cutoff: &str) -> Result<[i64; 5], DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT rating, COUNT(*) AS cnt
            FROM translation_ratings
            WHERE created_at >= ?1
            GROUP BY rating
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to load rating distribution: {}", e))
        })?;

        let mut distribution = [0i64; 5];
        for row in rows {
            let rating: i64 = row.get("rating");
            if (1..=5).contains(&rating) {
                distribution[(rating - 1) as usize] = row.get("cnt");
            }
        }

        Ok(distribution)
    }

    async fn language_pairs(&self, cutoff: &str) -> Result<Vec<LanguagePairStat>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT source_language, target_language,
                   AVG(rating) AS average,
                   COUNT(*) AS cnt
            FROM translation_ratings
            WHERE created_at >= ?1
            GROUP BY source_language, target_language
            ORDER BY average DESC, cnt DESC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to load language pair stats: {}", e))
        })?;

        Ok(rows
            .iter()
            .map(|row| LanguagePairStat {
                source_language: row.get("source_language"),
                target_language: row.get("target_language"),
                average: row.get("average"),
                count: row.get("cnt"),
            })
            .collect())
    }

    async fn models(&self, cutoff: &str) -> Result<Vec<ModelStat>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT model_id,
                   AVG(rating) AS average,
                   COUNT(*) AS cnt
            FROM translation_ratings
            WHERE created_at >= ?1
            GROUP BY model_id
            ORDER BY average DESC, cnt DESC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load model stats: {}", e)))?;

        Ok(rows
            .iter()
            .map(|row| {
                let model_id: String = row.get("model_id");
                ModelStat {
                    display_name: self.registry.display_name(&model_id),
                    model_id,
                    average: row.get("average"),
                    count: row.get("cnt"),
                }
            })
            .collect())
    }

    async fn insights(
        &self,
        cutoff: &str,
        time_series: &[TimeBucket],
        language_pairs: &[LanguagePairStat],
        models: &[ModelStat],
    ) -> Result<Vec<String>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT AVG(rating) AS average, COUNT(*) AS cnt
            FROM translation_ratings
            WHERE created_at >= ?1
            "#,
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load rating summary: {}", e)))?;

        let count: i64 = row.get("cnt");
        if count == 0 {
            return Ok(vec![
                "No ratings recorded in the last 7 days.".to_string(),
            ]);
        }
        let overall: f64 = row.get("average");

        let mut insights = vec![format!(
            "Overall average rating is {:.1} across {} rating{} in the last 7 days.",
            overall,
            count,
            if count == 1 { "" } else { "s" }
        )];

        // trend: first bucket of the window against the most recent one
        if let (Some(first), Some(last)) = (time_series.first(), time_series.last()) {
            if time_series.len() >= 2 {
                let delta = last.average - first.average;
                let trend = if delta > 0.0 {
                    format!("Ratings are trending up (+{:.2}) over the window.", delta)
                } else if delta < 0.0 {
                    format!("Ratings are trending down ({:.2}) over the window.", delta)
                } else {
                    "Ratings have been steady over the window.".to_string()
                };
                insights.push(trend);
            }
        }

        if let Some(pair) = language_pairs.first() {
            insights.push(format!(
                "Highest rated language pair is {} to {} with an average of {:.1}.",
                pair.source_language, pair.target_language, pair.average
            ));
        }

        if let Some(model) = models.first() {
            insights.push(format!(
                "Highest rated model is {} with an average of {:.1}.",
                model.display_name, model.average
            ));
        }

        Ok(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> RatingsStore {
        let registry = Arc::new(ModelRegistry::builtin("us-east-1", "123456789012"));
        RatingsStore::connect("sqlite::memory:", registry)
            .await
            .unwrap()
    }

    fn rating(value: u8, source: &str, target: &str, model_id: &str) -> NewRating {
        NewRating {
            rating: value,
            source_text: "Hello".to_string(),
            translated_text: "Bonjour".to_string(),
            source_language: source.to_string(),
            target_language: target.to_string(),
            model_id: model_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_out_of_range_ratings() {
        let store = store().await;

        for bad in [0u8, 6, 200] {
            let err = store
                .submit(rating(bad, "English", "French", "m"))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_submit_and_distribution() {
        let store = store().await;

        for value in [5u8, 5, 4, 2] {
            store
                .submit(rating(value, "English", "French", "m"))
                .await
                .unwrap();
        }

        let stats = store.stats(Granularity::Day).await.unwrap();
        assert_eq!(stats.distribution, [0, 1, 0, 1, 2]);
        assert_eq!(stats.time_series.len(), 1);
        assert_eq!(stats.time_series[0].count, 4);
    }

    #[tokio::test]
    async fn test_submitted_texts_are_persisted_with_the_rating() {
        let store = store().await;

        // wire shape as clients send it, both texts included
        let body: NewRating = serde_json::from_value(serde_json::json!({
            "rating": 4,
            "source_text": "Good morning",
            "translated_text": "Bonjour",
            "source_language": "English",
            "target_language": "French",
            "model_id": "anthropic.claude-3-sonnet-20240229-v1:0",
        }))
        .unwrap();

        let id = store.submit(body).await.unwrap();

        let row = sqlx::query(
            "SELECT source_text, translated_text FROM translation_ratings WHERE id = ?1",
        )
        .bind(id)
        .fetch_one(&store.pool)
        .await
        .unwrap();

        assert_eq!(row.get::<String, _>("source_text"), "Good morning");
        assert_eq!(row.get::<String, _>("translated_text"), "Bonjour");
    }

    #[tokio::test]
    async fn test_trend_compares_first_and_last_buckets() {
        let store = store().await;

        store
            .insert_at(
                &rating(2, "English", "French", "m"),
                Utc::now() - Duration::days(3),
            )
            .await
            .unwrap();
        store
            .submit(rating(5, "English", "French", "m"))
            .await
            .unwrap();

        let stats = store.stats(Granularity::Day).await.unwrap();
        assert!(stats
            .insights
            .iter()
            .any(|i| i.contains("trending up (+3.00)")));
    }

    #[tokio::test]
    async fn test_single_bucket_has_no_trend_insight() {
        let store = store().await;

        store
            .submit(rating(4, "English", "French", "m"))
            .await
            .unwrap();

        let stats = store.stats(Granularity::Day).await.unwrap();
        assert!(!stats.insights.iter().any(|i| i.contains("trending")));
        assert!(!stats.insights.iter().any(|i| i.contains("steady")));
    }

    #[tokio::test]
    async fn test_old_ratings_fall_out_of_the_window() {
        let store = store().await;

        store
            .insert_at(
                &rating(1, "English", "French", "m"),
                Utc::now() - Duration::days(STATS_WINDOW_DAYS + 1),
            )
            .await
            .unwrap();
        store
            .submit(rating(5, "English", "French", "m"))
            .await
            .unwrap();

        let stats = store.stats(Granularity::Day).await.unwrap();
        assert_eq!(stats.distribution, [0, 0, 0, 0, 1]);
    }

    #[tokio::test]
    async fn test_model_stats_resolve_display_names() {
        let store = store().await;

        store
            .submit(rating(
                5,
                "English",
                "Chinese",
                "anthropic.claude-3-sonnet-20240229-v1:0",
            ))
            .await
            .unwrap();

        let stats = store.stats(Granularity::Hour).await.unwrap();
        assert_eq!(stats.models.len(), 1);
        assert_eq!(stats.models[0].display_name, "Claude 3 Sonnet");
    }

    #[tokio::test]
    async fn test_language_pairs_rank_by_average() {
        let store = store().await;

        for value in [5u8, 5] {
            store
                .submit(rating(value, "English", "German", "m"))
                .await
                .unwrap();
        }
        store
            .submit(rating(2, "English", "French", "m"))
            .await
            .unwrap();

        let stats = store.stats(Granularity::Day).await.unwrap();
        assert_eq!(stats.language_pairs[0].target_language, "German");
        assert_eq!(stats.language_pairs[1].target_language, "French");
    }

    #[tokio::test]
    async fn test_insights_summarize_the_window() {
        let store = store().await;

        store
            .submit(rating(
                4,
                "English",
                "Spanish",
                "anthropic.claude-3-haiku-20240307-v1:0",
            ))
            .await
            .unwrap();

        let stats = store.stats(Granularity::Day).await.unwrap();
        assert!(stats.insights[0].contains("4.0"));
        assert!(stats
            .insights
            .iter()
            .any(|i| i.contains("Claude 3 Haiku")));
    }

    #[tokio::test]
    async fn test_empty_window_yields_single_insight() {
        let store = store().await;

        let stats = store.stats(Granularity::Day).await.unwrap();
        assert!(stats.time_series.is_empty());
        assert_eq!(stats.distribution, [0; 5]);
        assert_eq!(stats.insights.len(), 1);
        assert!(stats.insights[0].contains("No ratings"));
    }
}

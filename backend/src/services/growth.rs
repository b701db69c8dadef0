//! Growth record persistence and harvest estimation

use std::sync::Arc;

use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use shared::{
    derive_growth_speed, estimate_days_to_harvest, EnvironmentalRecommendation, GrowthRecord,
    HarvestEstimate, RipenessPercentages, DEFAULT_GROWTH_SPEED, TARGET_RIPE_PERCENT,
};

use crate::error::AppResult;

/// Input for appending one growth record
#[derive(Debug, Clone)]
pub struct NewGrowthRecord {
    pub recorded_at: DateTime<Utc>,
    pub ripe_percentage: f64,
    pub growth_speed_ripe: f64,
    pub temperature_c: f64,
    pub light_intensity_lux: f64,
    pub humidity_percent: f64,
}

/// Capability interface over the growth record store.
///
/// Append-only: records are never mutated or deleted, and the only read is
/// the most recent record by observation time.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append(&self, record: NewGrowthRecord) -> AppResult<GrowthRecord>;
    async fn latest(&self) -> AppResult<Option<GrowthRecord>>;
}

/// Postgres-backed growth record store
#[derive(Clone)]
pub struct PgGrowthStore {
    db: PgPool,
}

impl PgGrowthStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(sqlx::FromRow)]
struct GrowthRecordRow {
    id: Uuid,
    recorded_at: DateTime<Utc>,
    ripe_percentage: f64,
    growth_speed_ripe: f64,
    temperature_c: f64,
    light_intensity_lux: f64,
    humidity_percent: f64,
    created_at: DateTime<Utc>,
}

impl From<GrowthRecordRow> for GrowthRecord {
    fn from(row: GrowthRecordRow) -> Self {
        GrowthRecord {
            id: row.id,
            recorded_at: row.recorded_at,
            ripe_percentage: row.ripe_percentage,
            growth_speed_ripe: row.growth_speed_ripe,
            temperature_c: row.temperature_c,
            light_intensity_lux: row.light_intensity_lux,
            humidity_percent: row.humidity_percent,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl RecordStore for PgGrowthStore {
    async fn append(&self, record: NewGrowthRecord) -> AppResult<GrowthRecord> {
        let row = sqlx::query_as::<_, GrowthRecordRow>(
            r#"
            INSERT INTO growth_records
                (recorded_at, ripe_percentage, growth_speed_ripe,
                 temperature_c, light_intensity_lux, humidity_percent)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, recorded_at, ripe_percentage, growth_speed_ripe,
                      temperature_c, light_intensity_lux, humidity_percent, created_at
            "#,
        )
        .bind(record.recorded_at)
        .bind(record.ripe_percentage)
        .bind(record.growth_speed_ripe)
        .bind(record.temperature_c)
        .bind(record.light_intensity_lux)
        .bind(record.humidity_percent)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn latest(&self) -> AppResult<Option<GrowthRecord>> {
        let row = sqlx::query_as::<_, GrowthRecordRow>(
            r#"
            SELECT id, recorded_at, ripe_percentage, growth_speed_ripe,
                   temperature_c, light_intensity_lux, humidity_percent, created_at
            FROM growth_records
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }
}

/// Harvest estimation and batch record-keeping over a record store
pub struct GrowthService {
    store: Arc<dyn RecordStore>,
}

impl GrowthService {
    /// Create a service backed by Postgres
    pub fn new(db: PgPool) -> Self {
        Self {
            store: Arc::new(PgGrowthStore::new(db)),
        }
    }

    /// Create a service over any record store (used by tests)
    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Most recent growth record, if any
    pub async fn latest(&self) -> AppResult<Option<GrowthRecord>> {
        self.store.latest().await
    }

    /// Estimate days to harvest from the current ripe share.
    ///
    /// The growth speed comes from the most recent record. An empty or
    /// unreachable store, or a stored speed that is zero or non-finite,
    /// falls back to the default speed. This path never fails the request.
    pub async fn estimate(&self, ripe_percentage: f64) -> HarvestEstimate {
        let growth_speed = match self.store.latest().await {
            Ok(Some(record)) => record.growth_speed_ripe,
            Ok(None) => {
                tracing::debug!("No growth records yet, using default speed");
                DEFAULT_GROWTH_SPEED
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch latest growth record: {}, using default speed",
                    e
                );
                DEFAULT_GROWTH_SPEED
            }
        };

        let (estimated_days, growth_speed) =
            match estimate_days_to_harvest(ripe_percentage, growth_speed) {
                Some(days) => (days, growth_speed),
                None => {
                    tracing::warn!(
                        "Stored growth speed {} is unusable, using default",
                        growth_speed
                    );
                    (
                        estimate_days_to_harvest(ripe_percentage, DEFAULT_GROWTH_SPEED)
                            .unwrap_or(0.0),
                        DEFAULT_GROWTH_SPEED,
                    )
                }
            };

        HarvestEstimate {
            estimated_days_to_harvest: estimated_days,
            growth_speed_ripe: growth_speed,
            target_ripe_percent: TARGET_RIPE_PERCENT,
        }
    }

    /// Append the record for one processed batch.
    ///
    /// The stored speed is derived from the previous record when one exists.
    /// Failures are logged and swallowed: record-keeping never fails a
    /// prediction request.
    pub async fn record_batch(
        &self,
        percentages: &RipenessPercentages,
        recommendation: &EnvironmentalRecommendation,
    ) {
        let now = Utc::now();

        let growth_speed = match self.store.latest().await {
            Ok(Some(previous)) => {
                let elapsed_days = (now - previous.recorded_at).num_seconds() as f64 / 86_400.0;
                derive_growth_speed(
                    previous.ripe_percentage,
                    previous.growth_speed_ripe,
                    elapsed_days,
                    percentages.ripe,
                )
            }
            Ok(None) => DEFAULT_GROWTH_SPEED,
            Err(e) => {
                tracing::warn!("Failed to fetch previous growth record: {}", e);
                DEFAULT_GROWTH_SPEED
            }
        };

        let record = NewGrowthRecord {
            recorded_at: now,
            ripe_percentage: percentages.ripe,
            growth_speed_ripe: growth_speed,
            temperature_c: recommendation.temperature_setpoint.value,
            light_intensity_lux: recommendation.light_intensity_setpoint.value,
            humidity_percent: recommendation.humidity_setpoint.value,
        };

        if let Err(e) = self.store.append(record).await {
            tracing::warn!("Failed to append growth record: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Duration;

    use shared::Setpoint;

    use super::*;
    use crate::error::AppError;

    /// In-memory record store, append-only like the real one
    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<GrowthRecord>>,
    }

    impl MemoryStore {
        fn seeded(ripe: f64, speed: f64, age_days: i64) -> Self {
            let store = Self::default();
            let recorded_at = Utc::now() - Duration::days(age_days);
            store.records.lock().unwrap().push(GrowthRecord {
                id: Uuid::new_v4(),
                recorded_at,
                ripe_percentage: ripe,
                growth_speed_ripe: speed,
                temperature_c: 22.0,
                light_intensity_lux: 5000.0,
                humidity_percent: 80.0,
                created_at: recorded_at,
            });
            store
        }
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn append(&self, record: NewGrowthRecord) -> AppResult<GrowthRecord> {
            let stored = GrowthRecord {
                id: Uuid::new_v4(),
                recorded_at: record.recorded_at,
                ripe_percentage: record.ripe_percentage,
                growth_speed_ripe: record.growth_speed_ripe,
                temperature_c: record.temperature_c,
                light_intensity_lux: record.light_intensity_lux,
                humidity_percent: record.humidity_percent,
                created_at: Utc::now(),
            };
            self.records.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn latest(&self) -> AppResult<Option<GrowthRecord>> {
            let records = self.records.lock().unwrap();
            Ok(records.iter().max_by_key(|r| r.recorded_at).cloned())
        }
    }

    /// Record store whose reads and writes always fail
    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn append(&self, _record: NewGrowthRecord) -> AppResult<GrowthRecord> {
            Err(AppError::Storage("store offline".into()))
        }

        async fn latest(&self) -> AppResult<Option<GrowthRecord>> {
            Err(AppError::Storage("store offline".into()))
        }
    }

    fn recommendation() -> EnvironmentalRecommendation {
        EnvironmentalRecommendation {
            temperature_setpoint: Setpoint::new(22.0, "°C"),
            light_intensity_setpoint: Setpoint::new(5000.0, "lux"),
            humidity_setpoint: Setpoint::new(80.0, "%RH"),
        }
    }

    fn shares(ripe: f64) -> RipenessPercentages {
        RipenessPercentages {
            unripe: 100.0 - ripe,
            half_ripe: 0.0,
            ripe,
        }
    }

    #[tokio::test]
    async fn empty_store_estimates_with_default_speed() {
        let service = GrowthService::with_store(Arc::new(MemoryStore::default()));

        let estimate = service.estimate(50.0).await;
        assert_eq!(estimate.estimated_days_to_harvest, 4.0);
        assert_eq!(estimate.growth_speed_ripe, DEFAULT_GROWTH_SPEED);
        assert_eq!(estimate.target_ripe_percent, TARGET_RIPE_PERCENT);
    }

    #[tokio::test]
    async fn stored_speed_drives_the_estimate() {
        let service = GrowthService::with_store(Arc::new(MemoryStore::seeded(40.0, 2.0, 3)));

        let estimate = service.estimate(50.0).await;
        assert_eq!(estimate.estimated_days_to_harvest, 10.0);
        assert_eq!(estimate.growth_speed_ripe, 2.0);
    }

    #[tokio::test]
    async fn zero_stored_speed_falls_back_to_default() {
        let service = GrowthService::with_store(Arc::new(MemoryStore::seeded(40.0, 0.0, 3)));

        let estimate = service.estimate(50.0).await;
        assert_eq!(estimate.estimated_days_to_harvest, 4.0);
        assert_eq!(estimate.growth_speed_ripe, DEFAULT_GROWTH_SPEED);
    }

    #[tokio::test]
    async fn unreachable_store_still_estimates() {
        let service = GrowthService::with_store(Arc::new(BrokenStore));

        let estimate = service.estimate(80.0).await;
        assert_eq!(estimate.estimated_days_to_harvest, -2.0);
        assert_eq!(estimate.growth_speed_ripe, DEFAULT_GROWTH_SPEED);
    }

    #[tokio::test]
    async fn record_batch_derives_speed_from_previous() {
        let service = GrowthService::with_store(Arc::new(MemoryStore::seeded(40.0, 1.0, 2)));

        service.record_batch(&shares(50.0), &recommendation()).await;

        let latest = service.latest().await.unwrap().unwrap();
        assert_eq!(latest.ripe_percentage, 50.0);
        // 10 points over two days
        assert_eq!(latest.growth_speed_ripe, 5.0);
        assert_eq!(latest.temperature_c, 22.0);
        assert_eq!(latest.light_intensity_lux, 5000.0);
        assert_eq!(latest.humidity_percent, 80.0);
    }

    #[tokio::test]
    async fn first_batch_records_default_speed() {
        let service = GrowthService::with_store(Arc::new(MemoryStore::default()));

        service.record_batch(&shares(30.0), &recommendation()).await;

        let latest = service.latest().await.unwrap().unwrap();
        assert_eq!(latest.ripe_percentage, 30.0);
        assert_eq!(latest.growth_speed_ripe, DEFAULT_GROWTH_SPEED);
    }

    #[tokio::test]
    async fn record_batch_survives_a_broken_store() {
        let service = GrowthService::with_store(Arc::new(BrokenStore));

        service.record_batch(&shares(50.0), &recommendation()).await;
    }
}

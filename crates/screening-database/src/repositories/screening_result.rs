//! Screening result repository.

use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use screening_core::error::{AppError, ErrorKind};
use screening_core::result::AppResult;
use screening_entity::screening::{
    MatchBands, NewScreeningResult, ResultFilter, ResultPage, ScreeningAnalytics, ScreeningResult,
};

/// Postgres SQLSTATE for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Repository for scored results.
#[derive(Debug, Clone)]
pub struct ScreeningResultRepository {
    pool: PgPool,
}

impl ScreeningResultRepository {
    /// Create a new result repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the result for `(screening_job_id, candidate_id)`.
    ///
    /// The write only happens while the job still exists with the task's
    /// generation token. Returns `None` when fenced off, otherwise the row
    /// and whether it was newly inserted.
    pub async fn upsert(
        tx: &mut Transaction<'_, Postgres>,
        data: &NewScreeningResult,
    ) -> AppResult<Option<(ScreeningResult, bool)>> {
        let row = sqlx::query(
            "INSERT INTO screening_results \
             (id, screening_job_id, candidate_id, filename, match_percentage, skills_matched, \
              skills_missing, strengths, improvement_areas, recommendations, experience_years) \
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11 \
             WHERE EXISTS (SELECT 1 FROM screening_jobs WHERE id = $2 AND generation = $12) \
             ON CONFLICT (screening_job_id, candidate_id) DO UPDATE SET \
                filename = EXCLUDED.filename, \
                match_percentage = EXCLUDED.match_percentage, \
                skills_matched = EXCLUDED.skills_matched, \
                skills_missing = EXCLUDED.skills_missing, \
                strengths = EXCLUDED.strengths, \
                improvement_areas = EXCLUDED.improvement_areas, \
                recommendations = EXCLUDED.recommendations, \
                experience_years = EXCLUDED.experience_years, \
                updated_at = NOW() \
             RETURNING *, (xmax = 0) AS inserted",
        )
        .bind(Uuid::new_v4())
        .bind(data.screening_job_id)
        .bind(data.candidate_id)
        .bind(&data.filename)
        .bind(data.match_percentage.clamp(0, 100))
        .bind(&data.skills_matched)
        .bind(&data.skills_missing)
        .bind(&data.strengths)
        .bind(&data.improvement_areas)
        .bind(&data.recommendations)
        .bind(data.experience_years)
        .bind(data.job_generation)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            let fenced = e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
            if fenced {
                AppError::with_source(
                    ErrorKind::Conflict,
                    "Screening job was deleted while the result was being written",
                    e,
                )
            } else {
                AppError::with_source(ErrorKind::Dependency, "Failed to save screening result", e)
            }
        })?;

        let Some(row) = row else {
            return Ok(None);
        };
        let inserted: bool = row.try_get("inserted").map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to read upsert outcome", e)
        })?;
        let result = ScreeningResult::from_row(&row).map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to decode screening result", e)
        })?;
        Ok(Some((result, inserted)))
    }

    /// Filtered, sorted, paginated results of a job.
    pub async fn find_page(&self, job_id: Uuid, filter: &ResultFilter) -> AppResult<ResultPage> {
        let min = i32::from(filter.min_match_percentage.unwrap_or(0));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM screening_results \
             WHERE screening_job_id = $1 AND match_percentage >= $2",
        )
        .bind(job_id)
        .bind(min)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to count results", e))?;

        let direction = if filter.descending() { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT * FROM screening_results \
             WHERE screening_job_id = $1 AND match_percentage >= $2 \
             ORDER BY {} {direction}, created_at ASC, id ASC LIMIT $3 OFFSET $4",
            filter.sort_column().column()
        );

        let results = sqlx::query_as::<_, ScreeningResult>(&sql)
            .bind(job_id)
            .bind(min)
            .bind(i64::from(filter.limit))
            .bind(i64::from(filter.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to list results", e))?;

        Ok(ResultPage {
            results,
            total: total.max(0) as u64,
        })
    }

    /// Every result of a job in insertion order.
    pub async fn find_all(&self, job_id: Uuid) -> AppResult<Vec<ScreeningResult>> {
        sqlx::query_as::<_, ScreeningResult>(
            "SELECT * FROM screening_results WHERE screening_job_id = $1 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to list results", e))
    }

    /// Mark exactly the given results of a job as shortlisted.
    pub async fn shortlist(&self, job_id: Uuid, result_ids: &[Uuid]) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE screening_results SET shortlisted = TRUE, updated_at = NOW() \
             WHERE screening_job_id = $1 AND id = ANY($2)",
        )
        .bind(job_id)
        .bind(result_ids)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Dependency, "Failed to save shortlist", e))?;
        Ok(result.rows_affected())
    }

    /// Shortlisted results of a job, best match first.
    pub async fn find_shortlisted(&self, job_id: Uuid) -> AppResult<Vec<ScreeningResult>> {
        sqlx::query_as::<_, ScreeningResult>(
            "SELECT * FROM screening_results WHERE screening_job_id = $1 AND shortlisted \
             ORDER BY match_percentage DESC, created_at ASC, id ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Dependency, "Failed to list shortlisted results", e)
        })
    }

    /// Aggregate a job's scores.
    pub async fn analytics(&self, job_id: Uuid, bands: MatchBands) -> AppResult<ScreeningAnalytics> {
        let (total, average, strong, moderate, weak): (i64, Option<f64>, i64, i64, i64) =
            sqlx::query_as(
                "SELECT COUNT(*), AVG(match_percentage)::float8, \
                    COUNT(*) FILTER (WHERE match_percentage >= $2), \
                    COUNT(*) FILTER (WHERE match_percentage >= $3 AND match_percentage < $2), \
                    COUNT(*) FILTER (WHERE match_percentage < $3) \
                 FROM screening_results WHERE screening_job_id = $1",
            )
            .bind(job_id)
            .bind(i32::from(bands.strong))
            .bind(i32::from(bands.moderate))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Dependency, "Failed to aggregate results", e)
            })?;

        Ok(ScreeningAnalytics {
            total_screened: total.max(0) as u64,
            average_match: average.map(|a| (a * 100.0).round() / 100.0).unwrap_or(0.0),
            strong_matches: strong.max(0) as u64,
            moderate_matches: moderate.max(0) as u64,
            weak_matches: weak.max(0) as u64,
        })
    }
}

//! Bulk screening handlers.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use screening_core::error::AppError;
use screening_entity::candidate::ResumeUpload;
use screening_entity::screening::{ResultPage, ScreeningAnalytics, ScreeningResult};
use screening_service::RankedCandidate;
use screening_service::coordinator::ScreeningJobPage;

use crate::dto::{
    ApiResponse, PageQuery, RankingQuery, ResultsQuery, ScreeningJobResponse, ShortlistRequest,
    ShortlistResponse,
};
use crate::error::ApiError;
use crate::extractors::Employer;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// POST /api/screenings (multipart: `job_id` + one or more `resume` files)
pub async fn create_screening(
    State(state): State<AppState>,
    employer: Employer,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ScreeningJobResponse>>), ApiError> {
    let mut job_id: Option<Uuid> = None;
    let mut resumes = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "job_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                job_id = Some(
                    Uuid::parse_str(text.trim())
                        .map_err(|_| AppError::validation("Invalid job_id"))?,
                );
            }
            "resume" | "resumes" => {
                let filename = field
                    .file_name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("resume-{}", resumes.len() + 1));
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                resumes.push(ResumeUpload::new(filename, content));
            }
            _ => {}
        }
    }

    let job_id = job_id.ok_or_else(|| AppError::validation("job_id field is required"))?;
    let job = state
        .coordinator
        .initiate_bulk_screening(employer.id(), job_id, resumes)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::ok(job.into()))))
}

/// GET /api/screenings?limit&offset
pub async fn list_screenings(
    State(state): State<AppState>,
    employer: Employer,
    Query(page): Query<PageQuery>,
) -> ApiResult<ScreeningJobPage> {
    let limit = page
        .limit
        .unwrap_or(state.config.screening.default_page_limit);
    let jobs = state
        .coordinator
        .list_screening_jobs(employer.id(), limit, page.offset.unwrap_or(0))
        .await?;
    Ok(Json(ApiResponse::ok(jobs)))
}

/// GET /api/screenings/{id}
pub async fn get_screening(
    State(state): State<AppState>,
    employer: Employer,
    Path(id): Path<Uuid>,
) -> ApiResult<ScreeningJobResponse> {
    let job = state.coordinator.get_screening_job(&employer, id).await?;
    Ok(Json(ApiResponse::ok(job.into())))
}

/// GET /api/screenings/{id}/results
pub async fn get_results(
    State(state): State<AppState>,
    employer: Employer,
    Path(id): Path<Uuid>,
    Query(query): Query<ResultsQuery>,
) -> ApiResult<ResultPage> {
    let filter = query.into_filter(&state.config.screening)?;
    let page = state
        .coordinator
        .get_screening_results(&employer, id, &filter)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/screenings/{id}/analytics
pub async fn get_analytics(
    State(state): State<AppState>,
    employer: Employer,
    Path(id): Path<Uuid>,
) -> ApiResult<ScreeningAnalytics> {
    let analytics = state
        .coordinator
        .get_screening_analytics(&employer, id)
        .await?;
    Ok(Json(ApiResponse::ok(analytics)))
}

/// GET /api/screenings/{id}/ranking?limit
pub async fn get_ranking(
    State(state): State<AppState>,
    employer: Employer,
    Path(id): Path<Uuid>,
    Query(query): Query<RankingQuery>,
) -> ApiResult<Vec<RankedCandidate<ScreeningResult>>> {
    let ranked = state
        .coordinator
        .get_ranked_candidates(&employer, id, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok(ranked)))
}

/// POST /api/screenings/{id}/shortlist
pub async fn save_shortlist(
    State(state): State<AppState>,
    employer: Employer,
    Path(id): Path<Uuid>,
    Json(body): Json<ShortlistRequest>,
) -> ApiResult<ShortlistResponse> {
    let updated = state
        .coordinator
        .save_shortlist(&employer, id, &body.result_ids)
        .await?;
    Ok(Json(ApiResponse::ok(ShortlistResponse { updated })))
}

/// GET /api/screenings/{id}/shortlist
pub async fn get_shortlist(
    State(state): State<AppState>,
    employer: Employer,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<ScreeningResult>> {
    let results = state.coordinator.get_shortlisted(&employer, id).await?;
    Ok(Json(ApiResponse::ok(results)))
}

/// DELETE /api/screenings/{id}
pub async fn delete_screening(
    State(state): State<AppState>,
    employer: Employer,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.coordinator.delete_screening_job(&employer, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

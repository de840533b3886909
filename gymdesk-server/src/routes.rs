//! Request handlers.
//!
//! Thin adapters between HTTP and the gymdesk service layer: handlers
//! extract inputs, call one service function with today's date, and return
//! the outcome as JSON. Session checking lives in [`require_session`],
//! applied to every route except `/login` and `/health`.

use axum::{
    Extension, Json,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use gymdesk::{
    auth::SessionToken,
    domain::{Member, Payment, Plan, PlanInput, RegisterMemberInput},
    service::{
        self, BillingOverview, DashboardSummary, MemberCascadeOutcome, MemberListStatus,
        MemberView, PlanCascadeOutcome, PlanListing, RegistrationOutcome, RenewMembershipRequest,
        RenewalOutcome, RenewalStatusFilter,
    },
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::ApiError,
    observability::{HealthCheck, HealthReport},
    state::AppState,
};

/// Admin identity attached to the request by [`require_session`].
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub String);

/// Credentials for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Admin email, compared case-insensitively.
    pub email: String,
    /// Admin password in the clear; only its digest is ever stored.
    pub password: String,
}

/// Body of a successful `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// When the token stops working.
    pub expires_at: DateTime<Utc>,
}

/// Query parameters of `GET /user-list`.
#[derive(Debug, Default, Deserialize)]
pub struct MemberListQuery {
    /// Name or phone fragment.
    #[serde(default)]
    pub search: String,
    /// Coverage filter, `all` when absent.
    #[serde(default)]
    pub status: MemberListStatus,
}

/// Query parameters of `GET /payment-management`.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentPageQuery {
    /// Member to pre-select for renewal; unknown ids are ignored.
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    /// Name or phone fragment.
    #[serde(default)]
    pub search: String,
    /// Classification filter, `expired` when absent.
    #[serde(default)]
    pub status: RenewalStatusFilter,
}

/// Body of `GET /payment-management`.
#[derive(Debug, Serialize)]
pub struct PaymentPage {
    /// Header figures.
    pub stats: BillingOverview,
    /// Renewal candidate cards.
    pub members: Vec<MemberView>,
    /// Full payment history, newest first.
    pub payments: Vec<Payment>,
    /// Pre-selected member when `userId` named a known one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_member: Option<Member>,
}

/// Gate middleware: resolves the bearer token to the admin session, or
/// redirects to `/login`.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return Redirect::to("/login").into_response();
    };
    let Some(email) = state.gate.current_user(&token, Utc::now()).await else {
        return Redirect::to("/login").into_response();
    };
    request.extensions_mut().insert(AdminIdentity(email));
    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let raw = value.strip_prefix("Bearer ")?.trim();
    (!raw.is_empty()).then(|| SessionToken::new(raw))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state.gate.login(&body.email, &body.password, Utc::now()).await?;
    Ok(Json(LoginResponse {
        token: outcome.token.as_str().to_owned(),
        expires_at: outcome.expires_at,
    }))
}

/// `POST /logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.gate.logout(&token).await;
    }
    StatusCode::NO_CONTENT
}

/// `GET /session`
pub async fn session(Extension(identity): Extension<AdminIdentity>) -> Json<serde_json::Value> {
    Json(json!({ "email": identity.0 }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let member_count = state.store.read(|inner| inner.members.len()).await;
    let checks = vec![
        HealthCheck::pass_with_message("store", format!("{member_count} member(s) on record")),
        match &state.config.store.snapshot_path {
            Some(path) => HealthCheck::pass_with_message("snapshot", path.display().to_string()),
            None => HealthCheck::warn("snapshot", "persistence disabled"),
        },
    ];
    Json(HealthReport {
        status: HealthReport::compute_status(&checks),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        checks,
    })
}

/// `GET /`
pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

/// Fallback for unknown paths.
pub async fn not_found() -> Redirect {
    Redirect::to("/login")
}

/// `GET /dashboard`
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(service::dashboard_summary(&state.store, Utc::now().date_naive()).await)
}

/// `POST /add-user`
pub async fn add_user(
    State(state): State<AppState>,
    Json(input): Json<RegisterMemberInput>,
) -> Result<(StatusCode, Json<RegistrationOutcome>), ApiError> {
    let outcome =
        service::register_member(&state.store, input, Utc::now().date_naive(), Utc::now())
            .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `GET /user-list`
pub async fn user_list(
    State(state): State<AppState>,
    Query(query): Query<MemberListQuery>,
) -> Json<Vec<MemberView>> {
    let today = Utc::now().date_naive();
    Json(service::list_members(&state.store, &query.search, query.status, today).await)
}

/// `DELETE /user-list/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MemberCascadeOutcome>, ApiError> {
    Ok(Json(service::delete_member(&state.store, &id).await?))
}

/// `GET /plans`
pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<PlanListing>> {
    Json(service::list_plans(&state.store).await)
}

/// `POST /plans`
pub async fn create_plan(
    State(state): State<AppState>,
    Json(input): Json<PlanInput>,
) -> Result<(StatusCode, Json<Plan>), ApiError> {
    let plan = service::create_plan(&state.store, input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// `PUT /plans/{id}`
pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PlanInput>,
) -> Result<Json<Plan>, ApiError> {
    Ok(Json(service::update_plan(&state.store, &id, input, Utc::now()).await?))
}

/// `DELETE /plans/{id}`
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlanCascadeOutcome>, ApiError> {
    Ok(Json(service::delete_plan(&state.store, &id).await?))
}

/// `GET /payment-management`
pub async fn payment_page(
    State(state): State<AppState>,
    Query(query): Query<PaymentPageQuery>,
) -> Json<PaymentPage> {
    let today = Utc::now().date_naive();
    let stats = service::billing_overview(&state.store, today).await;
    let members =
        service::renewal_candidates(&state.store, &query.search, query.status, today).await;
    let payments = service::list_payments(&state.store).await;
    let selected_member = match &query.user_id {
        Some(id) => service::get_member(&state.store, id).await.ok(),
        None => None,
    };
    Json(PaymentPage { stats, members, payments, selected_member })
}

/// `POST /payment-management`
pub async fn record_renewal(
    State(state): State<AppState>,
    Json(request): Json<RenewMembershipRequest>,
) -> Result<(StatusCode, Json<RenewalOutcome>), ApiError> {
    let outcome =
        service::renew_membership(&state.store, request, Utc::now().date_naive(), Utc::now())
            .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok-123"));
        let token = bearer_token(&headers);
        assert_eq!(token.map(|t| t.as_str().to_owned()).as_deref(), Some("tok-123"));
    }
}

use crate::app::ClaimOutcome;
use crate::core::ticket::has_printable_text;
use crate::domain::model::Student;
use crate::http::AppState;
use crate::utils::error::ServiceError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct PrintRequest {
    #[serde(default)]
    pub contenido: Option<PrintContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrintContent {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub tipo_alimentacion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub codigo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StudentView {
    pub nombre: String,
    pub grado: String,
    pub tipo_alimentacion: String,
}

impl From<&Student> for StudentView {
    fn from(student: &Student) -> Self {
        Self {
            nombre: student.name.clone(),
            grado: student.grade.clone(),
            tipo_alimentacion: student.plan_text.clone(),
        }
    }
}

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servicio: Option<String>,
    #[serde(flatten)]
    pub estudiante: Option<StudentView>,
}

impl ApiResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            servicio: None,
            estudiante: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::UnknownCode { .. } => StatusCode::NOT_FOUND,
            ServiceError::GradeDenied { .. } => StatusCode::FORBIDDEN,
            ServiceError::GatewayError(_) | ServiceError::GatewayStatus { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ApiResponse::failure(self.user_friendly_message()))).into_response()
    }
}

fn outcome_response(outcome: ClaimOutcome, student: Option<&Student>) -> Response {
    let estudiante = student.map(StudentView::from);
    match outcome {
        ClaimOutcome::Printed(ticket) => {
            // 不等待列印結果
            let body = ApiResponse {
                servicio: Some(ticket.window.label),
                estudiante,
                ..ApiResponse::ok("Printing...")
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        ClaimOutcome::Refused { message, .. } => {
            let body = ApiResponse {
                estudiante,
                ..ApiResponse::failure(message)
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

/// GET / - Liveness and printer mode
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.claims.status())
}

/// POST /imprimir - Print a ticket for an already-verified student
pub async fn imprimir(
    State(state): State<AppState>,
    payload: Result<Json<PrintRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected print payload: {}", rejection);
            PrintRequest::default()
        }
    };

    let content = request.contenido.unwrap_or_default();
    let Some(name) = content.nombre.filter(|n| has_printable_text(n)) else {
        return ServiceError::InvalidRequest {
            message: "Incomplete data".to_string(),
        }
        .into_response();
    };
    let plan_text = content.tipo_alimentacion.unwrap_or_default();

    match state.claims.claim(&name, &plan_text) {
        Ok(outcome) => outcome_response(outcome, None),
        Err(e) => e.into_response(),
    }
}

/// POST /validar - Verify a scanned code and print when entitled
pub async fn validar(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let code = match payload {
        Ok(Json(VerifyRequest { codigo: Some(code) })) => code,
        _ => {
            return ServiceError::InvalidRequest {
                message: "Enter a valid code".to_string(),
            }
            .into_response()
        }
    };

    match state.claims.claim_by_code(&code).await {
        Ok(claim) => outcome_response(claim.outcome, Some(&claim.student)),
        Err(e) => e.into_response(),
    }
}

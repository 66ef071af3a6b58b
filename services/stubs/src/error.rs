use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tonic::Status;

use mockwire_core::error::error_response;

use crate::domain::template::RenderError;
use crate::domain::types::MethodRoute;

/// Stub server error variants, shared by the admin API and the gRPC endpoint.
#[derive(Debug, thiserror::Error)]
pub enum StubsServiceError {
    #[error("method description {0} already exists")]
    DuplicateId(String),
    #[error("method {route} is already described by {existing}")]
    DuplicateRoute { route: String, existing: String },
    #[error("method description {0} not found")]
    MethodDescriptionNotFound(String),
    #[error("method description {id} is referenced by {stubs} stub(s)")]
    MethodDescriptionInUse { id: String, stubs: usize },
    #[error("invalid method description: {0}")]
    InvalidMethodDescription(String),
    #[error("invalid codecs: {0}")]
    InvalidCodecs(String),
    #[error("unknown method description {0}")]
    UnknownMethodDescriptor(String),
    #[error("stub {0} not found")]
    StubNotFound(String),
    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("Unknown method {0}")]
    UnknownMethod(MethodRoute),
    #[error("{route} is a {connection} method, only unary calls are served")]
    UnsupportedConnection { route: MethodRoute, connection: String },
    #[error("request does not decode as {class}: {reason}")]
    InvalidRequest { class: String, reason: String },
    #[error("Can't find any stub for {0}")]
    NoStubFound(MethodRoute),
    #[error("failed to render response: {0}")]
    Render(#[from] RenderError),
    #[error("rendered response does not fit {class}: {reason}")]
    InvalidResponse { class: String, reason: String },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StubsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateId(_) => "DUPLICATE_ID",
            Self::DuplicateRoute { .. } => "DUPLICATE_ROUTE",
            Self::MethodDescriptionNotFound(_) => "METHOD_DESCRIPTION_NOT_FOUND",
            Self::MethodDescriptionInUse { .. } => "METHOD_DESCRIPTION_IN_USE",
            Self::InvalidMethodDescription(_) => "INVALID_METHOD_DESCRIPTION",
            Self::InvalidCodecs(_) => "INVALID_CODECS",
            Self::UnknownMethodDescriptor(_) => "UNKNOWN_METHOD_DESCRIPTOR",
            Self::StubNotFound(_) => "STUB_NOT_FOUND",
            Self::InvalidPredicate(_) => "INVALID_PREDICATE",
            Self::InvalidTemplate(_) => "INVALID_TEMPLATE",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::UnknownMethod(_) => "UNKNOWN_METHOD",
            Self::UnsupportedConnection { .. } => "UNSUPPORTED_CONNECTION",
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::NoStubFound(_) => "NO_STUB_FOUND",
            Self::Render(_) => "RENDER_ERROR",
            Self::InvalidResponse { .. } => "INVALID_RESPONSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::DuplicateId(_) | Self::DuplicateRoute { .. } | Self::MethodDescriptionInUse { .. } => {
                StatusCode::CONFLICT
            }
            Self::MethodDescriptionNotFound(_) | Self::StubNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidMethodDescription(_)
            | Self::InvalidCodecs(_)
            | Self::UnknownMethodDescriptor(_)
            | Self::InvalidPredicate(_)
            | Self::InvalidTemplate(_)
            | Self::InvalidQuery(_)
            | Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::UnknownMethod(_) | Self::NoStubFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedConnection { .. } => StatusCode::NOT_IMPLEMENTED,
            Self::Render(_) | Self::InvalidResponse { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for StubsServiceError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(e) => format!("{self}: {e:#}"),
            _ => self.to_string(),
        };
        error_response(self.http_status(), self.kind(), message)
    }
}

impl From<StubsServiceError> for Status {
    fn from(err: StubsServiceError) -> Self {
        match err {
            StubsServiceError::UnknownMethod(_) | StubsServiceError::UnsupportedConnection { .. } => {
                Status::unimplemented(err.to_string())
            }
            StubsServiceError::InvalidRequest { .. } => Status::invalid_argument(err.to_string()),
            StubsServiceError::Internal(ref e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
                Status::internal(err.to_string())
            }
            _ => Status::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use tonic::Code;

    fn countdown() -> MethodRoute {
        MethodRoute::new("market_data.OTCMarketDataService", "Countdown")
    }

    async fn assert_error(
        error: StubsServiceError,
        expected_status: StatusCode,
        expected_kind: &str,
        expected_message: &str,
    ) {
        let resp = error.into_response();
        assert_eq!(resp.status(), expected_status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], expected_kind);
        assert_eq!(json["message"], expected_message);
    }

    #[tokio::test]
    async fn should_return_conflict_for_duplicate_id() {
        assert_error(
            StubsServiceError::DuplicateId("unary-countdown".to_owned()),
            StatusCode::CONFLICT,
            "DUPLICATE_ID",
            "method description unary-countdown already exists",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_bad_request_for_unknown_method_descriptor() {
        assert_error(
            StubsServiceError::UnknownMethodDescriptor("missing".to_owned()),
            StatusCode::BAD_REQUEST,
            "UNKNOWN_METHOD_DESCRIPTOR",
            "unknown method description missing",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_not_found_for_missing_stub() {
        assert_error(
            StubsServiceError::StubNotFound("abc".to_owned()),
            StatusCode::NOT_FOUND,
            "STUB_NOT_FOUND",
            "stub abc not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_conflict_for_method_in_use() {
        assert_error(
            StubsServiceError::MethodDescriptionInUse {
                id: "unary-countdown".to_owned(),
                stubs: 2,
            },
            StatusCode::CONFLICT,
            "METHOD_DESCRIPTION_IN_USE",
            "method description unary-countdown is referenced by 2 stub(s)",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_internal_with_cause() {
        assert_error(
            StubsServiceError::Internal(anyhow::anyhow!("lock poisoned")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "internal error: lock poisoned",
        )
        .await;
    }

    #[test]
    fn no_stub_found_maps_to_internal_status_with_exact_message() {
        let status = Status::from(StubsServiceError::NoStubFound(countdown()));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(
            status.message(),
            "Can't find any stub for market_data.OTCMarketDataService/Countdown"
        );
    }

    #[test]
    fn unknown_method_maps_to_unimplemented() {
        let status = Status::from(StubsServiceError::UnknownMethod(countdown()));
        assert_eq!(status.code(), Code::Unimplemented);
        assert_eq!(
            status.message(),
            "Unknown method market_data.OTCMarketDataService/Countdown"
        );
    }

    #[test]
    fn undecodable_request_maps_to_invalid_argument() {
        let status = Status::from(StubsServiceError::InvalidRequest {
            class: "market_data.PricesRequest".to_owned(),
            reason: "buffer underflow".to_owned(),
        });
        assert_eq!(status.code(), Code::InvalidArgument);
    }
}

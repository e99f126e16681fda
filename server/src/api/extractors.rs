//! Request extractors that answer with the API error envelope
//!
//! Every parse or `validator` failure becomes a 400 `ApiError`, so handlers
//! never see axum's plain-text rejections.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::api::types::ApiError;

/// One sorted line per failed constraint, joined with `; `
fn describe(errors: &ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| match &failure.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    lines.sort();
    lines.join("; ")
}

fn checked<T: Validate>(value: T) -> Result<T, ApiError> {
    value
        .validate()
        .map_err(|errors| ApiError::bad_request("VALIDATION_ERROR", describe(&errors)))?;
    Ok(value)
}

/// Path parameters; ids that do not parse are a 400
#[derive(Debug)]
pub struct ValidatedPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|e| ApiError::bad_request("PATH_PARSE_ERROR", e.body_text()))
    }
}

/// Query string, deserialized then checked with `validator`
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request("QUERY_PARSE_ERROR", e.body_text()))?;
        checked(value).map(Self)
    }
}

/// JSON body, deserialized then checked with `validator`
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request("JSON_PARSE_ERROR", e.body_text()))?;
        checked(value).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{self, StatusCode, header};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Campus {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 1, max = 10))]
        floors: i64,
    }

    fn json_request(body: &str) -> Request {
        http::Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_body_is_validated() {
        let ValidatedJson(campus) =
            ValidatedJson::<Campus>::from_request(json_request(r#"{"name":"Gorham","floors":3}"#), &())
                .await
                .unwrap();
        assert_eq!(campus.name, "Gorham");

        let err = ValidatedJson::<Campus>::from_request(json_request(r#"{"name":"","floors":30}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        match err {
            ApiError::BadRequest { code, message } => {
                assert_eq!(code, "VALIDATION_ERROR");
                assert_eq!(message, "floors is invalid; name is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let err = ValidatedJson::<Campus>::from_request(json_request("{"), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { ref code, .. } if code == "JSON_PARSE_ERROR"));
    }

    #[tokio::test]
    async fn test_query_is_validated() {
        let (mut parts, _) = http::Request::get("/?name=Portland&floors=0")
            .body(Body::empty())
            .unwrap()
            .into_parts();
        let err = ValidatedQuery::<Campus>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { ref code, .. } if code == "VALIDATION_ERROR"));
    }
}

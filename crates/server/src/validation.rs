use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest},
    http::{Request, StatusCode},
    Json,
};
use axum_derive_error::ErrorResponse;
use derive_more::{Display, Error};
use validator::{Validate, ValidationErrors};

/// Errors related to JSON request body validation.
///
/// Both malformed bodies and bodies with missing fields are
/// rejected with `400 Bad Request`.
#[derive(ErrorResponse, Display, Error)]
pub enum ValidatedJsonRejection {
    /// Unable to parse a JSON value.
    #[status(StatusCode::BAD_REQUEST)]
    JsonParsingError(JsonRejection),

    /// Request body is missing required fields.
    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "Missing required fields")]
    ValidationError(ValidationErrors),
}

/// JSON request body extractor that runs [`validator`] checks.
///
/// Request structs mark required fields with `#[serde(default)]` and
/// `#[validate(length(min = 1))]`, so that absent and empty values
/// are reported the same way.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: Validate,
    B: Send + 'static,
    S: Sync,
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonParsingError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

//! Mapping of AWS SDK failures onto [`StoreError`].
//!
//! Service errors keep the upstream code and message. A HEAD request has no
//! response body, so a 404 there has no code and is named after its status.
//! Transport failures are named after the SDK failure class.

use crate::provider::StoreError;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

pub(crate) fn store_error<E>(err: SdkError<E, HttpResponse>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let class = match &err {
        SdkError::ServiceError(context) => {
            let status = context.raw().status().as_u16();
            let code = err
                .code()
                .map_or_else(|| status_code_name(status), str::to_string);
            let message = err
                .message()
                .map_or_else(|| format!("HTTP status {status}"), str::to_string);
            return StoreError::new(code, message);
        }
        SdkError::TimeoutError(_) => "TimeoutError",
        SdkError::DispatchFailure(_) => "DispatchFailure",
        SdkError::ResponseError(_) => "ResponseError",
        SdkError::ConstructionFailure(_) => "ConstructionFailure",
        _ => "Unknown",
    };
    StoreError::new(class, DisplayErrorContext(&err).to_string())
}

/// Code for a service error response that carried no error body
pub(crate) fn status_code_name(status: u16) -> String {
    match status {
        301 => "PermanentRedirect".to_string(),
        304 => "NotModified".to_string(),
        400 => "BadRequest".to_string(),
        403 => "Forbidden".to_string(),
        404 => "NotFound".to_string(),
        412 => "PreconditionFailed".to_string(),
        500 => "InternalError".to_string(),
        503 => "ServiceUnavailable".to_string(),
        other => format!("Http{other}"),
    }
}

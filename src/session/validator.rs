//! Status validation applied to every portal response

use crate::{Error, Result};
use reqwest::Response;

/// Pass `response` through unchanged if its status is a success, otherwise
/// fail with [`Error::BadStatusCode`] carrying `label`.
pub fn check(label: &str, response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("Endpoint: {:<35}| status = {:>4}", label, status.as_u16());

    if !status.is_success() {
        tracing::error!("Endpoint {} failed with status {}", label, status);
        return Err(Error::bad_status(label, status.as_u16()));
    }

    Ok(response)
}

pub mod method_description;
pub mod state;
pub mod stub;

use serde::Serialize;

/// Body returned by every create endpoint.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

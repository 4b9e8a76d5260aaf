use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

/// `{ "message": ..., "<key>": <payload> }`, the success shape of every endpoint.
pub fn envelope<T: Serialize>(message: impl Into<String>, key: &str, payload: &T) -> Value {
    let mut body = json!({ "message": message.into() });
    if let (Some(map), Ok(payload)) = (body.as_object_mut(), serde_json::to_value(payload)) {
        map.insert(key.to_string(), payload);
    }
    body
}

/// Failure shape as documented for clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Validation failed")]
    pub message: String,
    #[schema(value_type = Object)]
    pub error: Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

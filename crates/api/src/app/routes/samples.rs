//! Sample endpoints exercising each pipeline adapter.

use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::NaiveDateTime;
use serde_json::{Value, json};

use crate::app::dto;
use crate::mvc::error::MvcError;
use crate::mvc::extract::{BodyMapping, ParamMapping, RequestParams};
use crate::mvc::return_value::ResponseBody;

pub fn router() -> Router {
    Router::new()
        .route("/query", get(echo_query))
        .route("/body", post(echo_body))
        .route("/date", get(convert_date))
        .route("/raw", get(raw))
}

pub async fn echo_query(
    ParamMapping(query): ParamMapping<dto::SampleQuery>,
) -> ResponseBody<dto::SampleQuery> {
    ResponseBody::ok(query)
}

pub async fn echo_body(
    BodyMapping(body): BodyMapping<dto::SampleBody>,
) -> ResponseBody<dto::SampleBody> {
    ResponseBody::created(body)
}

pub async fn convert_date(params: RequestParams) -> Result<ResponseBody<dto::DateEcho>, MvcError> {
    let value = params.require::<NaiveDateTime>("value")?;
    let gender = params.get_enum::<dto::Gender>("gender")?;

    Ok(ResponseBody::ok(dto::DateEcho {
        value: Some(value),
        gender,
    }))
}

/// Not body-annotated: never wrapped.
pub async fn raw() -> Json<Value> {
    Json(json!({"wrapped": false}))
}

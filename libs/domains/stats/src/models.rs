use axum_helpers::datetime::{self, parse_date_time};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{StatsError, StatsResult};

/// A stored hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EndpointHit {
    pub id: Uuid,
    /// Name of the service that served the request
    pub app: String,
    pub uri: String,
    pub ip: String,
    #[serde(with = "datetime::format")]
    #[schema(value_type = String, example = "2024-01-01 10:00:00")]
    pub timestamp: NaiveDateTime,
}

impl EndpointHit {
    pub fn new(input: NewEndpointHit) -> Self {
        Self {
            id: Uuid::now_v7(),
            app: input.app,
            uri: input.uri,
            ip: input.ip,
            timestamp: input.timestamp,
        }
    }
}

/// Body of `POST /hit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewEndpointHit {
    #[validate(length(min = 1, max = 255))]
    pub app: String,
    #[validate(length(min = 1, max = 512))]
    pub uri: String,
    #[validate(length(min = 1, max = 45))]
    pub ip: String,
    #[serde(with = "datetime::format")]
    #[schema(value_type = String, example = "2024-01-01 10:00:00")]
    pub timestamp: NaiveDateTime,
}

/// One aggregated row of `GET /stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ViewStats {
    pub app: String,
    pub uri: String,
    pub hits: i64,
}

/// Query of `GET /stats`, dates still in wire form
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Window start, `yyyy-MM-dd HH:mm:ss`
    pub start: String,
    /// Window end, `yyyy-MM-dd HH:mm:ss`
    pub end: String,
    /// Keep only these uris; repeat the key for several
    #[serde(default)]
    pub uris: Vec<String>,
    /// Count distinct IPs instead of raw hits
    #[serde(default)]
    pub unique: bool,
}

impl StatsQuery {
    /// Parse the window; malformed dates and `start > end` are rejected.
    pub fn window(&self) -> StatsResult<StatsWindow> {
        let start = parse_date_time(&self.start).map_err(StatsError::InvalidArgument)?;
        let end = parse_date_time(&self.end).map_err(StatsError::InvalidArgument)?;
        if start > end {
            return Err(StatsError::InvalidArgument(
                "Start date must be before end date".to_string(),
            ));
        }
        Ok(StatsWindow {
            start,
            end,
            uris: self.uris.clone(),
            unique: self.unique,
        })
    }

    /// Query-string pairs; sequence keys are repeated.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("start", self.start.clone()), ("end", self.end.clone())];
        pairs.extend(self.uris.iter().map(|uri| ("uris", uri.clone())));
        pairs.push(("unique", self.unique.to_string()));
        pairs
    }
}

/// A validated stats request; both bounds inclusive
#[derive(Debug, Clone, PartialEq)]
pub struct StatsWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub uris: Vec<String>,
    pub unique: bool,
}

//! Actor Extractor
//!
//! Authentication happens upstream; the acting user arrives as
//! `X-Actor-Id` / `X-Actor-Name` headers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::ServerState;
use crate::utils::AppError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";

/// Acting user of a request
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: i64,
    pub name: String,
}

impl Actor {
    pub fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::validation("Missing X-Actor-Id header"))?
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::validation("X-Actor-Id must be an integer"))?;

        let name = parts
            .headers
            .get(ACTOR_NAME_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("actor-{}", id));

        Ok(Self { id, name })
    }
}

impl FromRequestParts<ServerState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(actor.clone());
        }
        let actor = Actor::from_parts(parts)?;
        parts.extensions.insert(actor.clone());
        Ok(actor)
    }
}

//! GET /api/v1/personas - the persona table.

use std::time::Instant;

use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use chatguru_types::persona::Persona;

use crate::http::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct PersonaInfo {
    pub name: &'static str,
    pub prompt: &'static str,
    pub default: bool,
}

pub async fn list_personas() -> Json<ApiResponse<Vec<PersonaInfo>>> {
    let start = Instant::now();
    let personas = Persona::ALL
        .iter()
        .map(|p| PersonaInfo {
            name: p.name(),
            prompt: p.prompt(),
            default: *p == Persona::default(),
        })
        .collect();

    let elapsed = start.elapsed().as_millis() as u64;
    Json(
        ApiResponse::success(personas, Uuid::now_v7().to_string(), elapsed)
            .with_link("self", "/api/v1/personas"),
    )
}

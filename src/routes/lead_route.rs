use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{domain::lead_request::LeadRequest, services::LeadOrchestrator};

const MISSING_FIELDS: &str = "Missing required fields. Please provide industry and country.";

#[derive(Deserialize)]
struct GenerateLeadsBody {
    industry: Option<String>,
    country: Option<String>,
    requirements: Option<String>,
}

#[derive(Serialize)]
struct GenerateLeadsResponse {
    success: bool,
    filename: String,
    table: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
}

#[post("/generate-leads")]
pub async fn generate_leads(
    orchestrator: web::Data<LeadOrchestrator>,
    body: web::Bytes,
) -> HttpResponse {
    let request = match parse_lead_request(&body) {
        Some(request) => request,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: MISSING_FIELDS.to_string(),
                success: None,
            })
        }
    };

    log::info!(
        "Generating leads for {} in {}",
        request.industry,
        request.country
    );

    match orchestrator.find_potential_clients(&request).await {
        Ok(outcome) => HttpResponse::Ok().json(GenerateLeadsResponse {
            success: true,
            filename: outcome.filename,
            table: outcome.table,
        }),
        Err(e) => {
            log::error!("Lead generation failed: {:?}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
                success: Some(false),
            })
        }
    }
}

/// `None` for anything that is not a JSON object with non-blank industry and country.
fn parse_lead_request(body: &[u8]) -> Option<LeadRequest> {
    let body: GenerateLeadsBody = serde_json::from_slice(body).ok()?;

    match (body.industry, body.country) {
        (Some(industry), Some(country))
            if !industry.trim().is_empty() && !country.trim().is_empty() =>
        {
            Some(LeadRequest::new(
                &industry,
                &country,
                &body.requirements.unwrap_or_default(),
            ))
        }
        _ => None,
    }
}

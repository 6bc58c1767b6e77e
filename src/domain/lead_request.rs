use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeadRequest {
    pub industry: String,
    pub country: String,
    #[serde(default)]
    pub requirements: String,
}

impl LeadRequest {
    pub fn new(industry: &str, country: &str, requirements: &str) -> Self {
        LeadRequest {
            industry: industry.trim().to_string(),
            country: country.trim().to_string(),
            requirements: requirements.trim().to_string(),
        }
    }
}

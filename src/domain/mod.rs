pub mod lead_report;
pub mod lead_request;
pub mod prompts;
pub mod search_result;

pub mod content_fetcher;
pub mod lead_orchestrator;
pub mod openai_client;
pub mod report_store;
pub mod search_client;

pub use content_fetcher::*;
pub use lead_orchestrator::*;
pub use openai_client::*;
pub use report_store::*;
pub use search_client::*;

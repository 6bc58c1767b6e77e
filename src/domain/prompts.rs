use super::lead_request::LeadRequest;

pub const TOP_CLIENTS: u8 = 20;
pub const FIXED_QUERY_COUNT: usize = 5;

const NO_REQUIREMENTS: &str = "No additional requirements specified";

/// One prompted task: system instructions plus the human turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPrompt {
    pub system: String,
    pub user: String,
}

pub fn query_prompt(request: &LeadRequest, current_year: i32) -> TaskPrompt {
    let LeadRequest {
        industry,
        country,
        requirements,
    } = request;
    let requirements = match requirements.is_empty() {
        true => NO_REQUIREMENTS,
        false => requirements.as_str(),
    };

    let system = format!(
        r#"You are an expert at finding potential consulting clients. Your task is to:
1. Search for companies in the {industry} industry from {country} that might need consulting services
2. Consider these specific requirements when searching:
   {requirements}
3. Use the search tool to find companies that match these criteria
4. Generate follow-up searches based on initial findings
5. Focus on {current_year} data when available
6. Look for companies that match the size and requirements specified
7. Gather information about:
   - Company growth and market position
   - Current challenges that align with the requirements
   - Transformation and expansion plans
   - Recent developments that suggest consulting needs

Analyze the additional requirements and tailor your searches to find companies
that specifically match these criteria. Generate and execute searches iteratively
to build a comprehensive list of potential clients that align with all specified requirements."#
    );

    let user = format!(
        r#"Find potential consulting clients in the {industry} industry from {country}.
Focus on gathering comprehensive information about companies, including their websites,
contact information, and recent developments."#
    );

    TaskPrompt { system, user }
}

pub fn filter_prompt(
    request: &LeadRequest,
    current_year: i32,
    search_output: &str,
    web_content: &str,
) -> TaskPrompt {
    let LeadRequest {
        industry,
        country,
        requirements,
    } = request;

    let system = format!(
        r#"You are an expert at analyzing and filtering potential clients. Review the search results and filter the most promising clients based on their size, industry, potential needs, and available contact information.
Focus on {current_year} data when available.

Industry: {industry}
Country: {country}
Additional Requirements: {requirements}"#
    );

    let user = format!(
        r#"Filter these search results and web content to find the {TOP_CLIENTS} most promising
and unique clients in {industry} industry from {country}, focusing on those with
available contact information:

Search Results:
{search_output}

Additional Web Content:
{web_content}"#
    );

    TaskPrompt { system, user }
}

pub fn finalize_prompt(request: &LeadRequest, current_year: i32, filtered: &str) -> TaskPrompt {
    let system = format!(
        r#"You are an expert at presenting client information. Create a markdown table with the top {TOP_CLIENTS} most promising clients from {current_year}.
Include columns for:
- Company Name
- Industry
- Location
- Potential Needs
- Contact Information (if available)
- Website
- Estimated Size
- Recent News/Developments

Format the output as a proper markdown document with a title and table."#
    );

    let user = format!(
        "Create a detailed markdown table of the top {} unique clients from {} industry in {} from these results: {}",
        TOP_CLIENTS, request.industry, request.country, filtered
    );

    TaskPrompt { system, user }
}

/// Asks the model for exactly `FIXED_QUERY_COUNT` search queries, one per line.
pub fn search_queries_prompt(request: &LeadRequest, current_year: i32) -> String {
    let requirements = match request.requirements.is_empty() {
        true => NO_REQUIREMENTS,
        false => request.requirements.as_str(),
    };

    format!(
        r#"Generate {FIXED_QUERY_COUNT} diverse web search queries to find companies in the {} industry from {} that might need consulting services in {current_year}.
Additional requirements: {requirements}
Cover growth and market position, current challenges, expansion plans and recent news.
Only return the {FIXED_QUERY_COUNT} queries, each on a new line.
Do not number the queries and don't start with a bullet point."#,
        request.industry, request.country
    )
}

/// Used when the model returns fewer usable queries than requested.
pub fn fallback_search_queries(request: &LeadRequest, current_year: i32) -> Vec<String> {
    let LeadRequest {
        industry, country, ..
    } = request;

    vec![
        format!("top {industry} companies in {country} {current_year}"),
        format!("fastest growing {industry} startups {country} {current_year}"),
        format!("{industry} companies {country} expansion plans {current_year}"),
        format!("{industry} {country} digital transformation challenges {current_year}"),
        format!("{industry} {country} recent funding news {current_year}"),
    ]
}

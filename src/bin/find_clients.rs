use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use anyhow::{bail, Context};
use env_logger::Env;
use leadgen::{
    configuration::get_configuration, domain::lead_request::LeadRequest,
    services::LeadOrchestrator,
};

fn prompt(label: &str, input: &mut impl BufRead) -> anyhow::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let orchestrator = LeadOrchestrator::from_settings(&configuration);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let industry = prompt("Enter the industry: ", &mut input)?;
    let country = prompt("Enter the country: ", &mut input)?;
    let requirements = prompt(
        "Enter any additional requirements (press Enter if none): ",
        &mut input,
    )?;

    if industry.is_empty() || country.is_empty() {
        bail!("Industry and country are required.");
    }

    let outcome = orchestrator
        .find_potential_clients(&LeadRequest::new(&industry, &country, &requirements))
        .await?;

    let basename = Path::new(&outcome.filename)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or(outcome.filename.clone());

    println!("\nFinal Results have been saved to {}", basename);
    println!("\nPreview of results:");
    println!("{}", outcome.table);

    Ok(())
}

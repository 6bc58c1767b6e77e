use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::PathBuf,
};

/// Writes each lead report to its own auto-numbered markdown file.
#[derive(Clone)]
pub struct ReportStore {
    leads_dir: PathBuf,
}

impl ReportStore {
    pub fn new(leads_dir: impl Into<PathBuf>) -> Self {
        ReportStore {
            leads_dir: leads_dir.into(),
        }
    }

    /// Reserves the first unused `leads_{industry}_{country}_{n}.md`, starting at n = 1.
    /// The reservation is a `create_new` open, so concurrent runs never share a file.
    pub fn persist(&self, industry: &str, country: &str, content: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.leads_dir)?;

        let mut counter: u32 = 1;
        loop {
            let filename = self
                .leads_dir
                .join(report_file_name(industry, country, counter));

            match OpenOptions::new().write(true).create_new(true).open(&filename) {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())?;
                    log::info!("Saved lead report to {}", filename.display());
                    return Ok(filename);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => counter += 1,
                Err(e) => return Err(e),
            }
        }
    }
}

pub fn report_file_name(industry: &str, country: &str, counter: u32) -> String {
    format!(
        "leads_{}_{}_{}.md",
        sanitize_segment(industry),
        sanitize_segment(country),
        counter
    )
}

fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

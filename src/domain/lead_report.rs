use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("Report is empty")]
    Empty,
    #[error("Report does not start with a markdown title")]
    MissingTitle,
    #[error("Report has no markdown table header")]
    MissingTableHeader,
    #[error("Report table has no header separator row")]
    MissingSeparator,
    #[error("Report table has no rows")]
    MissingRows,
}

/// Structural check on the finalizer output: a `#` title first, then a
/// pipe table with a header, a `---` separator and at least one data row.
/// One code fence wrapped around the whole report is ignored, and rows may
/// omit the outer pipes.
pub fn validate_report(report: &str) -> Result<(), ReportError> {
    let mut lines = strip_code_fence(report)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let title = lines.next().ok_or(ReportError::Empty)?;
    if !title.starts_with('#') {
        return Err(ReportError::MissingTitle);
    }

    let mut lines = lines.skip_while(|l| !is_table_row(l));

    match lines.next() {
        Some(_header) => {}
        None => return Err(ReportError::MissingTableHeader),
    }

    match lines.next() {
        Some(l) if is_separator_row(l) => {}
        _ => return Err(ReportError::MissingSeparator),
    }

    match lines.next() {
        Some(l) if is_table_row(l) && !is_separator_row(l) => Ok(()),
        _ => Err(ReportError::MissingRows),
    }
}

fn strip_code_fence(report: &str) -> &str {
    let trimmed = report.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return report;
    };
    let Some(inner) = after_open.strip_suffix("```") else {
        return report;
    };

    // Drop the info string (```markdown) on the opening line.
    match inner.split_once('\n') {
        Some((_info, body)) => body,
        None => "",
    }
}

fn is_table_row(line: &str) -> bool {
    line.contains('|')
}

fn is_separator_row(line: &str) -> bool {
    is_table_row(line)
        && line.contains('-')
        && line
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

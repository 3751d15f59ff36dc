//! JSON and CSV output of collected offerings.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::AppError;
use crate::models::CourseOfferings;

pub const CSV_HEADER: [&str; 4] = ["course_num", "credits", "type", "SLN"];

/// One CSV line: a single section of a course.
#[derive(Debug, Serialize)]
struct SectionRow<'a> {
    course_num: &'a str,
    credits: &'a str,
    #[serde(rename = "type")]
    category: &'a str,
    #[serde(rename = "SLN")]
    sln: &'a str,
}

/// Write offerings as a JSON object keyed by `"{course} {credit} {category}"`,
/// keys sorted, indented with four spaces.
pub fn write_json<W: Write>(offerings: &CourseOfferings, writer: W) -> Result<(), AppError> {
    let by_key: BTreeMap<String, &[String]> = offerings
        .iter()
        .map(|(key, sections)| (key.to_string(), sections))
        .collect();

    let mut ser = serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
    by_key.serialize(&mut ser)?;
    Ok(())
}

pub fn to_json_string(offerings: &CourseOfferings) -> Result<String, AppError> {
    let mut buf = Vec::new();
    write_json(offerings, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write offerings as CSV: a header row, then one row per (course, section).
///
/// The header is written even when there are no sections. Rows end in CRLF.
pub fn write_csv<W: Write>(offerings: &CourseOfferings, writer: W) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for (key, sections) in offerings.iter() {
        for sln in sections {
            wtr.serialize(SectionRow {
                course_num: &key.course,
                credits: &key.credit,
                category: &key.category,
                sln,
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(offerings: &CourseOfferings) -> Result<String, AppError> {
    let mut buf = Vec::new();
    write_csv(offerings, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Create (or truncate) the JSON and CSV files.
pub fn write_outputs(
    offerings: &CourseOfferings,
    json_path: &Path,
    csv_path: &Path,
) -> Result<(), AppError> {
    let mut json = BufWriter::new(File::create(json_path)?);
    write_json(offerings, &mut json)?;
    json.flush()?;

    write_csv(offerings, BufWriter::new(File::create(csv_path)?))?;

    tracing::info!(
        json = %json_path.display(),
        csv = %csv_path.display(),
        courses = offerings.len(),
        sections = offerings.section_count(),
        "Wrote output files"
    );
    Ok(())
}

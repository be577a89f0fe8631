//! CSV downloads for tables and reports.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use crate::Error;

/// Write `headers` then `rows` as CSV and wrap the result in a download response.
///
/// The browser is told to save the body as `filename`.
///
/// # Errors
/// Returns [Error::CsvError] if a record could not be written.
pub fn csv_response<R, F>(filename: &str, headers: &[&str], rows: R) -> Result<Response, Error>
where
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<[u8]>,
{
    let body = write_csv(headers, rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

fn write_csv<R, F>(headers: &[&str], rows: R) -> Result<Vec<u8>, Error>
where
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;

    for row in rows {
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

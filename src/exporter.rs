use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;
use crate::error::ParseError;
use crate::models::{Column, HttpMethod, LogRecord, LogTable};

/// Write the table as CSV, columns in `Column::ALL` order.
///
/// The header row is always written, so an empty table yields a header-only file.
pub fn write_csv<W: Write>(table: &LogTable, writer: W) -> Result<(), ParseError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(Column::ALL.iter().map(Column::name))?;

    for record in table {
        csv_writer.write_record(Column::ALL.iter().map(|column| record.field(*column)))?;
    }

    csv_writer
        .flush()
        .map_err(|e| ParseError::io("write", "csv output", &e))
}

pub fn save_to_csv<P: AsRef<Path>>(table: &LogTable, path: P) -> Result<(), ParseError> {
    let path = path.as_ref();
    let target = path.to_string_lossy().to_string();
    let file = File::create(path).map_err(|e| ParseError::io("create", &target, &e))?;
    write_csv(table, file)?;
    info!(path = %target, rows = table.len(), "table exported");
    Ok(())
}

/// Read a CSV written by `write_csv` back into a table.
///
/// Columns are located by header name; a missing column is a `SchemaError`.
pub fn read_csv<R: Read>(reader: R) -> Result<LogTable, ParseError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut positions = Vec::with_capacity(Column::ALL.len());
    for column in Column::ALL {
        let position = headers
            .iter()
            .position(|header| header == column.name())
            .ok_or_else(|| ParseError::SchemaError {
                missing_field: column.name().to_string(),
                available_fields: headers.iter().map(|h| h.to_string()).collect(),
            })?;
        positions.push(position);
    }

    let mut table = LogTable::new();
    for row in csv_reader.records() {
        let row = row?;
        let value = |column: Column| row.get(positions[column as usize]).unwrap_or_default().to_string();

        let method_text = value(Column::Method);
        let method = HttpMethod::from_token(&method_text).ok_or_else(|| ParseError::FieldExtractionError {
            field_name: Column::Method.name().to_string(),
            error_message: format!("unsupported method '{}'", method_text),
        })?;

        table.push(LogRecord {
            ip: value(Column::Ip),
            country: value(Column::Country),
            datetime: value(Column::Datetime),
            method,
            path: value(Column::Path),
            status: value(Column::Status),
            size: value(Column::Size),
            ua: value(Column::Ua),
            duration: value(Column::Duration),
        });
    }

    Ok(table)
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<LogTable, ParseError> {
    let path = path.as_ref();
    let source = path.to_string_lossy().to_string();
    let file = File::open(path).map_err(|e| ParseError::io("open", &source, &e))?;
    read_csv(file)
}

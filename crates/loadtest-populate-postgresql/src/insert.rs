//! INSERT statement and parameters for plane records.

use loadtest_generator::Record;
use tokio_postgres::types::ToSql;

/// Columns written for every record, in parameter order.
pub const COLUMNS: [&str; 12] = [
    "id",
    "ts",
    "speed",
    "dist",
    "bearing",
    "rtid",
    "orig",
    "dest",
    "secstodep",
    "lon",
    "lat",
    "geometry",
];

/// Quote a table name, keeping an optional `schema.` prefix.
pub fn quote_table_name(table: &str) -> String {
    table
        .split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Single-row INSERT with one placeholder per column.
pub fn insert_statement(table: &str) -> String {
    let columns = COLUMNS
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=COLUMNS.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_table_name(table),
        columns,
        placeholders
    )
}

/// Row count query used by the monitor.
pub fn count_statement(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_table_name(table))
}

/// Bind parameters for `record`, in [`COLUMNS`] order.
pub fn record_params(record: &Record) -> [&(dyn ToSql + Sync); 12] {
    [
        &record.id,
        &record.ts,
        &record.speed,
        &record.dist,
        &record.bearing,
        &record.rtid,
        &record.orig,
        &record.dest,
        &record.secs_to_dep,
        &record.lon,
        &record.lat,
        &record.geometry,
    ]
}

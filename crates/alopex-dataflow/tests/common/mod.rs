#![allow(dead_code)]

use alopex_dataflow::{row, Row};

/// Route `tracing` output to stderr, filtered by `RUST_LOG`.
pub fn init_test_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Rows `{key_column: k, "seq": i}` for each `(i, k)` in `keys`.
pub fn keyed_rows(key_column: &str, keys: &[i64]) -> Vec<Row> {
    keys.iter()
        .enumerate()
        .map(|(i, k)| row! { key_column => *k, "seq" => i })
        .collect()
}

/// The `column` values of `rows` as integers.
pub fn ints(rows: &[Row], column: &str) -> Vec<i64> {
    rows.iter()
        .map(|r| r.get(column).unwrap().as_i64().unwrap())
        .collect()
}

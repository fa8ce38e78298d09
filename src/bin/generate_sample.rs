use std::sync::Arc;

use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

/// Gain of a band-pass amplifier with a little ripple and roll-off at the edges.
fn gain_db(freq_ghz: f64) -> f64 {
    let center = 2.45;
    let ripple = 0.35 * (freq_ghz * 40.0).sin() + 0.04 * (freq_ghz * 1700.0).sin();
    let rolloff = 9.0 * (freq_ghz - center).powi(2);
    15.0 + ripple - rolloff
}

fn main() {
    // 2.40 → 2.50 GHz, 1 MHz steps
    let freq: Vec<f64> = (0..=100).map(|i| 2.40 + i as f64 * 0.001).collect();
    let gain: Vec<f64> = freq.iter().map(|&f| gain_db(f)).collect();

    // CSV
    let csv_path = "tx_power_results.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV");
    writer
        .write_record(["Frequency", "Gain"])
        .expect("Failed to write CSV header");
    for (f, g) in freq.iter().zip(gain.iter()) {
        writer
            .write_record([format!("{f:.3}"), format!("{g:.4}")])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV");

    // Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("Frequency", DataType::Float64, false),
        Field::new("Gain", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(freq.clone())),
            Arc::new(Float64Array::from(gain.clone())),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "tx_power_results.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // Trace records
    let records = json!([
        { "id": "REQ_TX_001", "type": "requirement", "title": "TX gain stays within 14..16 dB over the band",
          "status": "open", "tags": ["tx", "rf"] },
        { "id": "REQ_TX_002", "type": "requirement", "title": "TX spurious emissions below -40 dBc",
          "status": "open", "tags": ["tx"] },
        { "id": "SPEC_TX_GAIN", "type": "specification", "title": "Gain 15 dB ± 1 dB, 2.40-2.50 GHz",
          "links": { "covers": ["REQ_TX_001"] } },
        { "id": "TC_TX_001", "type": "test_case", "title": "TX gain sweep",
          "links": { "covers": ["SPEC_TX_GAIN"] } }
    ]);
    let trace_path = "trace_records.json";
    std::fs::write(trace_path, serde_json::to_string_pretty(&records).expect("serialize records"))
        .expect("Failed to write trace records");

    // Config binding the analysis to the test case
    let config = json!({
        "analysis": {
            "spec_min": 14.0,
            "spec_max": 16.0,
            "result": { "id": "TR_TX_001", "validates": ["TC_TX_001"] }
        }
    });
    let config_path = "margin_view.json";
    std::fs::write(config_path, serde_json::to_string_pretty(&config).expect("serialize config"))
        .expect("Failed to write config");

    println!(
        "Wrote {} points to {csv_path} and {parquet_path}; trace records to {trace_path}; config to {config_path}",
        freq.len()
    );
}

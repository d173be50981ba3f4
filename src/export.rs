//! Measurement export for reporting sinks.
//!
//! Measurements are flat records, so the reporting interface is plain
//! serde_json: a JSON array for one-shot exports and JSON Lines for
//! append-style measurement logs. Round-trips preserve every field
//! exactly.

use std::io::{BufRead, Write};

use crate::{
    error::{Error, Result},
    measure::Measurement,
};

/// Serializes measurements to a JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(measurements: &[Measurement]) -> Result<String> {
    serde_json::to_string_pretty(measurements).map_err(|e| Error::parse(e.to_string()))
}

/// Deserializes measurements from a JSON array.
///
/// # Errors
///
/// Returns an error if the input is not a valid measurement array.
pub fn from_json(data: &str) -> Result<Vec<Measurement>> {
    serde_json::from_str(data).map_err(|e| Error::parse(e.to_string()))
}

/// Writes measurements as JSON Lines, one record per line.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json_lines(writer: &mut impl Write, measurements: &[Measurement]) -> Result<()> {
    for measurement in measurements {
        let line = serde_json::to_string(measurement).map_err(|e| Error::parse(e.to_string()))?;
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(Error::io_no_path)?;
    }
    Ok(())
}

/// Reads measurements from JSON Lines, skipping blank lines.
///
/// # Errors
///
/// Returns an error if reading fails or a line is not a valid
/// measurement record.
pub fn read_json_lines(reader: impl BufRead) -> Result<Vec<Measurement>> {
    let mut measurements = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(Error::io_no_path)?;
        if line.trim().is_empty() {
            continue;
        }
        let measurement =
            serde_json::from_str(&line).map_err(|e| Error::parse(e.to_string()))?;
        measurements.push(measurement);
    }
    Ok(measurements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Measurement> {
        vec![
            Measurement {
                item_key: "cyl_larger_4".to_string(),
                rule_key: "cyl > 4".to_string(),
                data_id: Some("mtcars".to_string()),
                group_value: None,
                value: 21.0,
                unknown_count: 0,
                timestamp: Some(1_754_000_000),
            },
            Measurement {
                item_key: "materiality".to_string(),
                rule_key: "(cyl > 4) * mpg".to_string(),
                data_id: Some("mtcars".to_string()),
                group_value: Some("four".to_string()),
                value: 60.7,
                unknown_count: 2,
                timestamp: None,
            },
        ]
    }

    #[test]
    fn test_json_round_trip_preserves_fields() {
        let measurements = sample();
        let json = to_json(&measurements).unwrap();
        let restored = from_json(&json).unwrap();
        assert_eq!(measurements, restored);
    }

    #[test]
    fn test_json_lines_round_trip() {
        let measurements = sample();

        let mut buffer = Vec::new();
        write_json_lines(&mut buffer, &measurements).unwrap();

        let restored = read_json_lines(buffer.as_slice()).unwrap();
        assert_eq!(measurements, restored);
    }

    #[test]
    fn test_json_lines_skips_blank_lines() {
        let data = "\n\n";
        let restored = read_json_lines(data.as_bytes()).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result = from_json("not json");
        assert!(matches!(result, Err(Error::Parse { .. })));
    }
}

//! Reading design parameters from disk.
//!
//! The parameter sheet is a headerless two-column CSV: a label and a
//! value per row, rows in the fixed order of `RECORD_FIELDS`. Only the
//! value column is read. A `.json` file is deserialized directly and
//! may also set the hairpin tunables.
//!

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use csv::ReaderBuilder;
use log::debug;

use sp_design::DesignParameters;
use sp_design::RECORD_FIELDS;

/// Values of the parameter sheet, in row order.
pub fn read_record<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("cannot read parameter row {}", row + 1))?;
        let value = record.get(1).unwrap_or_default().to_string();
        if let Some(name) = RECORD_FIELDS.get(row) {
            debug!("{name}: '{value}'");
        }
        values.push(value);
    }
    Ok(values)
}

pub fn parameters_from_csv<R: Read>(reader: R) -> Result<DesignParameters> {
    let values = read_record(reader)?;
    Ok(DesignParameters::from_record(&values)?)
}

pub fn parameters_from_json<R: Read>(reader: R) -> Result<DesignParameters> {
    let params: DesignParameters = serde_json::from_reader(reader)?;
    params.validate()?;
    Ok(params)
}

/// Read parameters from a CSV sheet, or from JSON if the file name
/// ends in `.json`.
pub fn load_parameters(path: &Path) -> Result<DesignParameters> {
    let file = File::open(path)
        .with_context(|| format!("cannot open parameter file {}", path.display()))?;
    let is_json = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let params = if is_json {
        parameters_from_json(file)
    } else {
        parameters_from_csv(file)
    };
    params.with_context(|| format!("invalid parameter file {}", path.display()))
}

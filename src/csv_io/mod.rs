//! CSV collaborator for biquad coefficients, FIR coefficients, and LUT rows.
//!
//! This module is the only part of the crate that performs I/O or
//! allocation; it translates tabular text into calls on the infallible core
//! setters (`BiquadBank::set_coefficients`, `FirBank::set_one_coefficient`/
//! `set_one_geometry`, `LutBank::set_one_entry`) and back. It owns no
//! pipeline state of its own.

use std::collections::HashMap;
use std::io::{Read, Write};

use crate::biquad::{BiquadBank, BiquadCoeffs};
use crate::fir::FirBank;
use crate::int::FixedInt;
use crate::lut::LutBank;

/// Failure reading or writing a coefficient/LUT CSV.
#[derive(Debug, thiserror::Error)]
pub enum CsvIoError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Optional `(column, value)` row filter: a row is accepted if, for every
/// distinct column named in the map, at least one of its associated values
/// matches the row's cell in that column.
#[derive(Debug, Default, Clone)]
pub struct RowFilter {
    criteria: HashMap<String, Vec<String>>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.criteria
            .entry(column.into())
            .or_default()
            .push(value.into());
        self
    }

    fn matches(&self, row: &HashMap<String, String>) -> bool {
        self.criteria.iter().all(|(column, values)| {
            row.get(column)
                .map(|cell| values.iter().any(|v| v == cell))
                .unwrap_or(false)
        })
    }
}

fn parse_cell_or_zero(row: &HashMap<String, String>, column: &str) -> i64 {
    row.get(column)
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Reads a biquad coefficient CSV (columns `bank, stage, num0..num2,
/// den0..den2`, extra columns ignored) into `bank`.
///
/// `den0` passes through a signed 64-bit intermediate: this restricts `S` to
/// widths of 32 bits or fewer (`S: Into<i64> + FixedInt`). Wider sample
/// types would silently lose their top bit through this path in the source
/// this collaborator is modeled on; rather than reproduce that corruption
/// for 64-bit-and-wider samples, this reader is simply not offered for them.
pub fn read_biquad_csv<R: Read, S, const B: usize, const C: usize, const STAGES: usize>(
    reader: R,
    bank: &mut BiquadBank<S, B, C, STAGES>,
    filter: &RowFilter,
    bank_remap: &HashMap<usize, usize>,
) -> Result<(), CsvIoError>
where
    S: FixedInt + TryFrom<i64>,
{
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    for result in rdr.deserialize::<HashMap<String, String>>() {
        let row = result?;
        if !filter.matches(&row) {
            continue;
        }
        let raw_bank = parse_cell_or_zero(&row, "bank") as usize;
        let stage = parse_cell_or_zero(&row, "stage") as usize;
        let target_bank = bank_remap.get(&raw_bank).copied().unwrap_or(raw_bank);
        if target_bank >= B {
            log::warn!("biquad csv row names bank {raw_bank} (remapped {target_bank}), out of range for {B} banks; skipping");
            continue;
        }

        let den0 = parse_cell_or_zero(&row, "den0");
        let mut a0_bits: u8 = 0;
        let mut shrunk = den0;
        while shrunk > 1 {
            shrunk >>= 1;
            a0_bits += 1;
        }

        let a1 = S::try_from(parse_cell_or_zero(&row, "den1")).unwrap_or(S::ZERO);
        let a2 = S::try_from(parse_cell_or_zero(&row, "den2")).unwrap_or(S::ZERO);
        let b0 = S::try_from(parse_cell_or_zero(&row, "num0")).unwrap_or(S::ZERO);
        let b1 = S::try_from(parse_cell_or_zero(&row, "num1")).unwrap_or(S::ZERO);
        let b2 = S::try_from(parse_cell_or_zero(&row, "num2")).unwrap_or(S::ZERO);

        bank.set_coefficients(stage, target_bank, BiquadCoeffs::new(a0_bits, a1, a2, b0, b1, b2));
    }
    Ok(())
}

/// Writes every configured biquad stage of `bank` back out as CSV, with
/// `want_header` controlling whether the column-name row is emitted.
/// `constant_columns` are prepended to every data row with a fixed value
/// (e.g. a rig identifier).
pub fn write_biquad_csv<W: Write, S>(
    mut writer: W,
    rows: &[(usize, usize, BiquadCoeffs<S>)],
    want_header: bool,
    constant_columns: &[(&str, &str)],
) -> Result<(), CsvIoError>
where
    S: FixedInt + Into<i64>,
{
    if want_header {
        let mut header: Vec<&str> = constant_columns.iter().map(|(k, _)| *k).collect();
        header.extend_from_slice(&["bank", "stage", "num0", "num1", "num2", "den0", "den1", "den2"]);
        writeln!(writer, "{}", header.join(",")).map_err(|e| CsvIoError::Csv(csv::Error::from(e)))?;
    }
    for (bank, stage, coeffs) in rows {
        let den0: i64 = 1i64 << coeffs.a0_bits;
        let mut fields: Vec<String> = constant_columns.iter().map(|(_, v)| v.to_string()).collect();
        fields.push(bank.to_string());
        fields.push(stage.to_string());
        fields.push(coeffs.b0.into().to_string());
        fields.push(coeffs.b1.into().to_string());
        fields.push(coeffs.b2.into().to_string());
        fields.push(den0.to_string());
        fields.push(coeffs.a1.into().to_string());
        fields.push(coeffs.a2.into().to_string());
        writeln!(writer, "{}", fields.join(","))
            .map_err(|e| CsvIoError::Csv(csv::Error::from(e)))?;
    }
    Ok(())
}

/// Reads a FIR CSV (one `bank N` column per bank, rows are taps in order)
/// into `bank`. `fracbits` is supplied by the caller: it is not persisted in
/// this format.
pub fn read_fir_csv<R: Read, S, const B: usize, const C: usize, const MAXCOEFFS: usize, const BUFLEN: usize>(
    reader: R,
    fir: &mut FirBank<S, B, C, MAXCOEFFS, BUFLEN>,
    fracbits: &[u8; B],
    filter: &RowFilter,
    bank_remap: &HashMap<usize, usize>,
) -> Result<(), CsvIoError>
where
    S: FixedInt + TryFrom<i64>,
{
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for result in rdr.deserialize::<HashMap<String, String>>() {
        let row = result?;
        if !filter.matches(&row) {
            continue;
        }
        for header in headers.iter() {
            let Some(raw_bank_str) = header.strip_prefix("bank ") else {
                continue;
            };
            let Ok(raw_bank) = raw_bank_str.trim().parse::<usize>() else {
                continue;
            };
            let target_bank = bank_remap.get(&raw_bank).copied().unwrap_or(raw_bank);
            if target_bank >= B {
                log::warn!("fir csv column {header:?} names bank {raw_bank} (remapped {target_bank}), out of range for {B} banks; skipping");
                continue;
            }
            let value = row
                .get(header)
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(0);
            let idx = counts.entry(target_bank).or_insert(0);
            fir.set_one_coefficient(target_bank, *idx, S::try_from(value).unwrap_or(S::ZERO));
            *idx += 1;
        }
    }
    for (bank, count) in &counts {
        let fb = fracbits.get(*bank).copied().unwrap_or(0);
        fir.set_one_geometry(*bank, fb, *count);
    }
    Ok(())
}

/// Reads a LUT CSV (`row` and, for the per-bank variant, `bank`, plus
/// caller-chosen `infield`/`outfield` columns) into `lut`. Existing rows not
/// present in the file are left untouched.
pub fn read_lut_csv<R: Read, In, Out, const B: usize, const ROWS: usize>(
    reader: R,
    lut: &mut LutBank<In, Out, B, ROWS>,
    infield: &str,
    outfield: &str,
) -> Result<(), CsvIoError>
where
    In: FixedInt + TryFrom<i64>,
    Out: FixedInt + TryFrom<i64>,
{
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    for result in rdr.deserialize::<HashMap<String, String>>() {
        let row = result?;
        let bank = row
            .get("bank")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let r = parse_cell_or_zero(&row, "row") as usize;
        let input = In::try_from(parse_cell_or_zero(&row, infield)).unwrap_or(In::ZERO);
        let output = Out::try_from(parse_cell_or_zero(&row, outfield)).unwrap_or(Out::ZERO);
        lut.set_one_entry(bank, r, input, output);
    }
    Ok(())
}

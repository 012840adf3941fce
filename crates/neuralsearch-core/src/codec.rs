//! Vector line codec.
//!
//! A vector is stored as one line of comma-separated decimal components with
//! no trailing delimiter. `encode` uses the shortest representation that parses
//! back to the same `f32`, so `decode(encode(v)) == v` for finite input.

use std::io::Write;

use crate::error::{Error, Result};
use crate::types::Vector;

pub const DELIMITER: char = ',';

pub fn encode(vector: &[f32]) -> String {
    vector.iter().map(f32::to_string).collect::<Vec<_>>().join(",")
}

/// Writes `vector` followed by a single newline.
pub fn write_vector<W: Write>(out: &mut W, vector: &[f32]) -> std::io::Result<()> {
    writeln!(out, "{}", encode(vector))
}

/// Parses one vector line. Blank lines and empty tokens are malformed.
pub fn decode(line: &str) -> Result<Vector> {
    line.trim()
        .split(DELIMITER)
        .enumerate()
        .map(|(position, token)| parse_component(position, token))
        .collect()
}

pub fn decode_with_dim(line: &str, dim: usize) -> Result<Vector> {
    let vector = decode(line)?;
    if vector.len() != dim {
        return Err(Error::DimensionMismatch { expected: dim, actual: vector.len() });
    }
    Ok(vector)
}

fn parse_component(position: usize, token: &str) -> Result<f32> {
    let token = token.trim();
    match token.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::MalformedVector { position, token: token.to_string() }),
    }
}

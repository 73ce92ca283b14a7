//! Model serialization/deserialization (feature: `serde`).
//!
//! A versioned, stable on-disk format for [`Network`]. The internal structs
//! are not serialized directly, so the file format survives representation
//! changes; deserialization validates dimensions, parameter lengths, and
//! that every parameter is finite.

use serde::{Deserialize, Serialize};

use std::fs;
use std::path::Path;

use crate::{Error, Network, Parameters, Result};

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SerializedNetwork {
    pub format_version: u32,
    pub input_dim: usize,
    pub hidden_dim: usize,
    pub output_dim: usize,
    /// Row-major `(input_dim, hidden_dim)`.
    pub w1: Vec<f32>,
    pub b1: Vec<f32>,
    /// Row-major `(hidden_dim, output_dim)`.
    pub w2: Vec<f32>,
    pub b2: Vec<f32>,
}

impl SerializedNetwork {
    pub fn from_network(network: &Network) -> Self {
        let params = network.params();
        Self {
            format_version: MODEL_FORMAT_VERSION,
            input_dim: network.input_dim(),
            hidden_dim: network.hidden_dim(),
            output_dim: network.output_dim(),
            w1: params.w1.clone(),
            b1: params.b1.clone(),
            w2: params.w2.clone(),
            b2: params.b2.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::DataFormat(format!(
                "unsupported model format_version {}; expected {MODEL_FORMAT_VERSION}",
                self.format_version
            )));
        }
        if self.input_dim == 0 || self.hidden_dim == 0 || self.output_dim == 0 {
            return Err(Error::DataFormat(
                "model dimensions must all be > 0".to_owned(),
            ));
        }
        if self.w1.len() != self.input_dim * self.hidden_dim {
            return Err(Error::DataFormat(format!(
                "w1 length {} does not match ({}, {})",
                self.w1.len(),
                self.input_dim,
                self.hidden_dim
            )));
        }
        if self.b1.len() != self.hidden_dim {
            return Err(Error::DataFormat(format!(
                "b1 length {} does not match hidden_dim {}",
                self.b1.len(),
                self.hidden_dim
            )));
        }
        if self.w2.len() != self.hidden_dim * self.output_dim {
            return Err(Error::DataFormat(format!(
                "w2 length {} does not match ({}, {})",
                self.w2.len(),
                self.hidden_dim,
                self.output_dim
            )));
        }
        if self.b2.len() != self.output_dim {
            return Err(Error::DataFormat(format!(
                "b2 length {} does not match output_dim {}",
                self.b2.len(),
                self.output_dim
            )));
        }

        let all = self
            .w1
            .iter()
            .chain(&self.b1)
            .chain(&self.w2)
            .chain(&self.b2);
        for &v in all {
            if !v.is_finite() {
                return Err(Error::DataFormat(format!(
                    "model contains non-finite parameter {v}"
                )));
            }
        }

        Ok(())
    }

    pub fn into_network(self) -> Result<Network> {
        self.validate()?;
        let params = Parameters {
            w1: self.w1,
            b1: self.b1,
            w2: self.w2,
            b2: self.b2,
        };
        Network::from_parts(self.input_dim, self.hidden_dim, self.output_dim, params)
    }
}

/// Save a network as pretty-printed JSON.
pub fn save_json<P: AsRef<Path>>(network: &Network, path: P) -> Result<()> {
    let serialized = SerializedNetwork::from_network(network);
    let json = serde_json::to_string_pretty(&serialized)
        .map_err(|e| Error::DataFormat(format!("failed to serialize model: {e}")))?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a network from a JSON model file, validating it fully.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
    let json = fs::read_to_string(path)?;
    let serialized: SerializedNetwork = serde_json::from_str(&json)
        .map_err(|e| Error::DataFormat(format!("failed to parse model file: {e}")))?;
    serialized.into_network()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let net = Network::new_with_seed(4, 8, 1, 42).unwrap();
        save_json(&net, &path).unwrap();
        let loaded = load_json(&path).unwrap();

        assert_eq!(net.params(), loaded.params());
        assert_eq!(net.input_dim(), loaded.input_dim());
        assert_eq!(net.hidden_dim(), loaded.hidden_dim());
        assert_eq!(net.output_dim(), loaded.output_dim());
    }

    #[test]
    fn rejects_wrong_version() {
        let net = Network::new_with_seed(4, 8, 1, 0).unwrap();
        let mut serialized = SerializedNetwork::from_network(&net);
        serialized.format_version = 99;
        assert!(serialized.validate().is_err());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let net = Network::new_with_seed(4, 8, 1, 0).unwrap();
        let mut serialized = SerializedNetwork::from_network(&net);
        serialized.w1.pop();
        assert!(serialized.into_network().is_err());
    }

    #[test]
    fn rejects_non_finite_parameters() {
        let net = Network::new_with_seed(4, 8, 1, 0).unwrap();
        let mut serialized = SerializedNetwork::from_network(&net);
        serialized.b2[0] = f32::NAN;
        assert!(serialized.validate().is_err());
    }
}

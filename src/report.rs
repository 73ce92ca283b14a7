//! Human-readable weight report.
//!
//! Writes every parameter tensor with its shape and fixed 8-decimal values,
//! one matrix row per line, in a stable layout suitable for diffing. This is
//! a pure consumer of the network's final state.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::{Network, Result};

/// Write the weight report for `network` into `out`.
pub fn write_weights<W: Write>(network: &Network, out: &mut W) -> io::Result<()> {
    let (input_dim, hidden_dim, output_dim) =
        (network.input_dim(), network.hidden_dim(), network.output_dim());
    let params = network.params();

    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "BRDF Neural Network - Trained Weights")?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out)?;

    writeln!(out, "LAYER 1 (input -> hidden)")?;
    writeln!(out, "{}", "-".repeat(40))?;
    writeln!(out, "W1 shape: ({input_dim}, {hidden_dim})")?;
    writeln!(out, "W1 values:")?;
    write_matrix(out, &params.w1, hidden_dim)?;
    writeln!(out)?;
    writeln!(out, "b1 shape: (1, {hidden_dim})")?;
    writeln!(out, "b1 values:")?;
    write_matrix(out, &params.b1, hidden_dim)?;
    writeln!(out)?;

    writeln!(out, "LAYER 2 (hidden -> output)")?;
    writeln!(out, "{}", "-".repeat(40))?;
    writeln!(out, "W2 shape: ({hidden_dim}, {output_dim})")?;
    writeln!(out, "W2 values:")?;
    write_matrix(out, &params.w2, output_dim)?;
    writeln!(out)?;
    writeln!(out, "b2 shape: (1, {output_dim})")?;
    writeln!(out, "b2 values:")?;
    write_matrix(out, &params.b2, output_dim)?;

    Ok(())
}

/// Save the weight report to a file.
pub fn save_weights<P: AsRef<Path>>(network: &Network, path: P) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write_weights(network, &mut out)?;
    out.flush()?;
    Ok(())
}

fn write_matrix<W: Write>(out: &mut W, values: &[f32], cols: usize) -> io::Result<()> {
    for row in values.chunks(cols) {
        for (i, v) in row.iter().enumerate() {
            if i > 0 {
                write!(out, " ")?;
            }
            write!(out, "{v:.8}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parameters;

    fn fixed_network() -> Network {
        let params = Parameters {
            w1: vec![0.5, -0.25, 1.0, 2.0, 0.0, -1.5],
            b1: vec![0.1, -0.2, 0.3],
            w2: vec![1.0, -2.0, 0.125],
            b2: vec![0.5],
        };
        Network::from_parts(2, 3, 1, params).unwrap()
    }

    #[test]
    fn report_contains_shapes_and_fixed_precision_values() {
        let net = fixed_network();
        let mut buf = Vec::new();
        write_weights(&net, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("W1 shape: (2, 3)"));
        assert!(text.contains("b1 shape: (1, 3)"));
        assert!(text.contains("W2 shape: (3, 1)"));
        assert!(text.contains("b2 shape: (1, 1)"));

        assert!(text.contains("0.50000000 -0.25000000 1.00000000"));
        assert!(text.contains("2.00000000 0.00000000 -1.50000000"));
        assert!(text.contains("0.12500000"));
    }

    #[test]
    fn report_layout_is_stable() {
        let net = fixed_network();
        let mut a = Vec::new();
        let mut b = Vec::new();
        write_weights(&net, &mut a).unwrap();
        write_weights(&net, &mut b).unwrap();
        assert_eq!(a, b);

        // One line per matrix row: W1 has 2 rows, b1 1, W2 3, b2 1.
        let text = String::from_utf8(a).unwrap();
        let value_lines = text
            .lines()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit() || c == '-'))
            .filter(|l| l.contains('.'))
            .count();
        assert_eq!(value_lines, 7);
    }

    #[test]
    fn save_weights_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_weights.txt");
        save_weights(&fixed_network(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("BRDF Neural Network - Trained Weights"));
        assert!(text.contains("W1 shape: (2, 3)"));
    }
}

//! Plain-text persistence for trained networks.
//!
//! A model is a run of `;`-terminated sections, each a `,`-separated list of
//! numbers:
//!
//! 1. the topology, one unit count per layer;
//! 2. one section per weight matrix, in layer order;
//! 3. one section per bias matrix, in layer order;
//! 4. the learning rate.
//!
//! Matrices are written row-major. Their shapes are not stored; they follow
//! from the topology. Unit values and training history are not persisted.
//!
//! ```text
//! 2,1;0.25,-0.5;0,0;1.5;0.1;
//! ```

use crate::error::{Error, Result};
use crate::matrix::Mat;
use crate::network::{validate_topology, Network};

use itertools::Itertools;
use std::fs;
use std::path::Path;
use std::str::{FromStr, Split};

const SECTION_END: char = ';';
const SEPARATOR: char = ',';

fn write_section<T>(out: &mut String, values: &[T])
where
    T: ToString,
{
    out.push_str(&values.iter().map(T::to_string).join(","));
    out.push(SECTION_END);
}

/// Renders `network` in the model format.
pub fn to_model_string(network: &Network) -> String {
    let mut out = String::new();
    write_section(&mut out, network.topology());
    for weights in network.weights() {
        write_section(&mut out, weights.as_slice());
    }
    for biases in network.biases() {
        write_section(&mut out, biases.as_slice());
    }
    write_section(&mut out, &[network.learning_rate()][..]);
    out
}

/// Pulls sections off the input one at a time.
struct Sections<'a> {
    inner: Split<'a, char>,
}

impl<'a> Sections<'a> {
    fn new(s: &'a str) -> Self {
        Sections {
            inner: s.split(SECTION_END),
        }
    }

    /// Returns the values of the next section, which must hold exactly
    /// `expected` of them when given.
    fn next<T>(&mut self, name: &str, expected: Option<usize>) -> Result<Vec<T>>
    where
        T: FromStr,
    {
        let section = match self.inner.next() {
            Some(section) if !section.trim().is_empty() => section,
            _ => return Err(Error::malformed(name, "section is missing")),
        };
        let values = section
            .split(SEPARATOR)
            .map(|token| {
                let token = token.trim();
                token
                    .parse::<T>()
                    .map_err(|_| Error::malformed(name, format!("not a number: {:?}", token)))
            })
            .collect::<Result<Vec<T>>>()?;
        if let Some(expected) = expected {
            if values.len() != expected {
                return Err(Error::malformed(
                    name,
                    format!("expected {} values, found {}", expected, values.len()),
                ));
            }
        }
        Ok(values)
    }

    fn next_matrix(&mut self, name: &str, rows: usize, cols: usize) -> Result<Mat> {
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| Error::malformed(name, "matrix too large"))?;
        let values = self.next(name, Some(len))?;
        Mat::from_vec(rows, cols, values).map_err(|e| Error::malformed(name, e.to_string()))
    }

    /// Fails unless only whitespace remains.
    fn finish(mut self) -> Result<()> {
        match self.inner.find(|rest| !rest.trim().is_empty()) {
            Some(rest) => Err(Error::malformed(
                "end of model",
                format!("unexpected trailing data: {:?}", rest.trim()),
            )),
            None => Ok(()),
        }
    }
}

/// Parses a network from the model format. Layers start zero-valued.
pub fn from_model_str(s: &str) -> Result<Network> {
    let mut sections = Sections::new(s);

    let topology: Vec<usize> = sections.next("topology", None)?;
    validate_topology(&topology).map_err(|e| Error::malformed("topology", e.to_string()))?;

    let mut weights = Vec::with_capacity(topology.len() - 1);
    for (i, pair) in topology.windows(2).enumerate() {
        let name = format!("weights {}", i);
        weights.push(sections.next_matrix(&name, pair[1], pair[0])?);
    }

    let mut biases = Vec::with_capacity(topology.len());
    for (i, &size) in topology.iter().enumerate() {
        let name = format!("biases {}", i);
        biases.push(sections.next_matrix(&name, size, 1)?);
    }

    let learning_rate = sections.next::<f64>("learning rate", Some(1))?[0];
    sections.finish()?;

    Network::from_parts(topology, weights, biases, learning_rate)
        .map_err(|e| Error::malformed("parameters", e.to_string()))
}

impl Network {
    /// Writes the model to `path`, replacing any existing file.
    pub fn save_model<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        fs::write(path, to_model_string(self))?;
        debug!("saved model with topology {:?} to {}", self.topology(), path.display());
        Ok(())
    }

    /// Reads a model written by `save_model`.
    pub fn load_model<P>(path: P) -> Result<Network>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let network = from_model_str(&fs::read_to_string(path)?)?;
        if network.learning_rate() <= 0.0 {
            warn!(
                "model {} has a non-positive learning rate: {}",
                path.display(),
                network.learning_rate()
            );
        }
        debug!(
            "loaded model with topology {:?} from {}",
            network.topology(),
            path.display()
        );
        Ok(network)
    }
}

use crate::matrix::Mat;
use crate::unit::Unit;

/// A fixed-size, ordered collection of units.
///
/// A unit's index is its I/O slot in the network, so the layer never grows or
/// shrinks after construction.
#[derive(Clone, Debug)]
pub struct Layer {
    units: Vec<Unit>,
}

impl Layer {
    /// Creates a layer of `size` units, each with a raw value of zero.
    pub fn new(size: usize) -> Self {
        Layer {
            units: vec![Unit::default(); size],
        }
    }

    /// Returns the number of units in this layer.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Sets the raw value of the unit at `index`. Panics when out of range.
    pub fn set_unit_value(&mut self, index: usize, value: f64) {
        self.units[index].set_value(value);
    }

    /// Writes `values` into the units in index order.
    pub(crate) fn set_values(&mut self, values: &[f64]) {
        assert_eq!(values.len(), self.len());
        for (unit, &value) in self.units.iter_mut().zip(values) {
            unit.set_value(value);
        }
    }

    fn to_column<F>(&self, field: F) -> Mat
    where
        F: Fn(&Unit) -> f64,
    {
        let values: Vec<f64> = self.units.iter().map(field).collect();
        Mat::column(&values)
    }

    /// Returns the raw unit values as a column vector.
    pub fn to_raw_matrix(&self) -> Mat {
        self.to_column(Unit::value)
    }

    /// Returns the activated unit values as a column vector.
    pub fn to_activated_matrix(&self) -> Mat {
        self.to_column(Unit::activated)
    }

    /// Returns the unit derivatives as a column vector.
    pub fn to_derivative_matrix(&self) -> Mat {
        self.to_column(Unit::derivative)
    }
}

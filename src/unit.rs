//! A single neuron and its activation function.

/// Evaluates the [fast sigmoid](https://en.wikipedia.org/wiki/Sigmoid_function)
/// `x / (1 + |x|)`.
///
/// The result lies in `(-1, 1)` and the function is odd.
#[inline]
pub fn fast_sigmoid(x: f64) -> f64 {
    x / (1.0 + x.abs())
}

/// Evaluates the gradient factor used during backpropagation, given the
/// *output* `y` of the activation function.
///
/// Note that this is the logistic sigmoid's derivative `y * (1 - y)`, not the
/// derivative of `fast_sigmoid`. Trained models depend on this exact form.
#[inline]
pub fn fast_sigmoid_prime(y: f64) -> f64 {
    y * (1.0 - y)
}

/// A single scalar node of the network.
///
/// The activated value and derivative are always derived from the current raw
/// value; the only way to change a unit is `set_value`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Unit {
    value: f64,
    activated: f64,
    derivative: f64,
}

impl Unit {
    pub fn new(value: f64) -> Self {
        let activated = fast_sigmoid(value);
        Unit {
            value,
            activated,
            derivative: fast_sigmoid_prime(activated),
        }
    }

    /// Replaces the raw value and recomputes the derived fields.
    pub fn set_value(&mut self, value: f64) {
        *self = Unit::new(value);
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn activated(&self) -> f64 {
        self.activated
    }

    pub fn derivative(&self) -> f64 {
        self.derivative
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_bounded() {
        for &x in &[-1e12, -100.0, -1.0, -1e-9, 0.0, 1e-9, 0.5, 3.0, 1e12] {
            let y = fast_sigmoid(x);
            assert!(y > -1.0 && y < 1.0, "f({}) = {}", x, y);
        }
    }

    #[test]
    fn sigmoid_is_odd() {
        assert_eq!(fast_sigmoid(0.0), 0.0);
        for &x in &[0.25, 1.0, 7.5, 1234.0] {
            assert_eq!(fast_sigmoid(-x), -fast_sigmoid(x));
        }
    }

    #[test]
    fn derivative_uses_logistic_form() {
        let unit = Unit::new(1.0);
        assert_eq!(unit.activated(), 0.5);
        assert_eq!(unit.derivative(), 0.5 * (1.0 - 0.5));

        let unit = Unit::new(-3.0);
        let a = -3.0 / 4.0;
        assert_eq!(unit.activated(), a);
        assert_eq!(unit.derivative(), a * (1.0 - a));
        // The analytic derivative of x / (1 + |x|) would be 1 / 16 here.
        assert!((unit.derivative() - 1.0 / 16.0).abs() > 1.0);
    }

    #[test]
    fn set_value_refreshes_derived_fields() {
        let mut unit = Unit::default();
        assert_eq!(unit.value(), 0.0);
        assert_eq!(unit.activated(), 0.0);
        assert_eq!(unit.derivative(), 0.0);

        unit.set_value(3.0);
        assert_eq!(unit.value(), 3.0);
        assert_eq!(unit.activated(), 0.75);
        assert_eq!(unit.derivative(), 0.75 * 0.25);
    }
}

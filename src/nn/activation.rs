use ndarray::Array1;
use num_traits::Float;

/// Logistic function `1 / (1 + e^-z)`
pub fn sigmoid<T: Float>(z: T) -> T {
    T::one() / (T::one() + (-z).exp())
}

/// Hyperbolic tangent
pub fn tanh<T: Float>(z: T) -> T {
    z.tanh()
}

/// Rectified linear unit `max(0, z)`; NaN passes through
pub fn relu<T: Float>(z: T) -> T {
    if z < T::zero() {
        T::zero()
    } else {
        z
    }
}

/// Activation functions covered by the tutorial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Sigmoid,
    Tanh,
    Relu,
}

impl Activation {
    pub const ALL: [Activation; 3] = [Activation::Sigmoid, Activation::Tanh, Activation::Relu];

    pub fn apply<T: Float>(&self, z: T) -> T {
        match self {
            Activation::Sigmoid => sigmoid(z),
            Activation::Tanh => tanh(z),
            Activation::Relu => relu(z),
        }
    }

    /// Plot title
    pub fn title(&self) -> &'static str {
        match self {
            Activation::Sigmoid => "Sigmoid Activation Function",
            Activation::Tanh => "Hyperbolic Tangent Activation Function",
            Activation::Relu => "Rectified Linear Unit Activation Function",
        }
    }

    /// LaTeX legend label
    pub fn formula(&self) -> &'static str {
        match self {
            Activation::Sigmoid => r"$\frac{1}{1 + e^{-z}}$",
            Activation::Tanh => r"$\tanh (z)$",
            Activation::Relu => r"$\max(0,z)$",
        }
    }
}

/// Element-wise activation of an array
pub fn activate<T: Float>(z: &Array1<T>, activation: Activation) -> Array1<T> {
    z.mapv(|v| activation.apply(v))
}

/// Inputs and outputs for plotting the three activations side by side
#[derive(Debug, Clone)]
pub struct ActivationCurves {
    pub z: Array1<f64>,
    pub sigmoid: Array1<f64>,
    pub tanh: Array1<f64>,
    pub relu: Array1<f64>,
}

impl ActivationCurves {
    pub fn curve(&self, activation: Activation) -> &Array1<f64> {
        match activation {
            Activation::Sigmoid => &self.sigmoid,
            Activation::Tanh => &self.tanh,
            Activation::Relu => &self.relu,
        }
    }
}

/// Sample the activations on `n` evenly spaced points in [-10, 10]
pub fn activation_curves(n: usize) -> ActivationCurves {
    let z = Array1::linspace(-10.0, 10.0, n);
    ActivationCurves {
        sigmoid: activate(&z, Activation::Sigmoid),
        tanh: activate(&z, Activation::Tanh),
        relu: activate(&z, Activation::Relu),
        z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0f64), 0.5);
        assert_relative_eq!(sigmoid(2.0f64) + sigmoid(-2.0f64), 1.0, epsilon = 1e-12);
        assert!(sigmoid(40.0f32) <= 1.0);
    }

    #[test]
    fn test_relu_and_tanh() {
        let z = array![-2.0, -0.0, 0.0, 3.5];
        assert_eq!(activate(&z, Activation::Relu), array![0.0, 0.0, 0.0, 3.5]);
        assert!(relu(f64::NAN).is_nan());
        assert_relative_eq!(tanh(1.0f64), 0.761_594_155_955_764_9, epsilon = 1e-12);
    }

    #[test]
    fn test_activation_curves() {
        let curves = activation_curves(100);
        assert_eq!(curves.z.len(), 100);
        assert_eq!(curves.z[0], -10.0);
        assert_relative_eq!(curves.z[99], 10.0, epsilon = 1e-9);
        assert_eq!(curves.curve(Activation::Relu)[0], 0.0);
        assert!(curves.sigmoid.iter().all(|&v| v > 0.0 && v < 1.0));
        assert!(curves.tanh.iter().all(|&v| v.abs() <= 1.0));
    }
}

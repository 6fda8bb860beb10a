//! Neural-network tutorial helpers

pub mod activation;

pub use activation::{activate, activation_curves, relu, sigmoid, tanh, Activation, ActivationCurves};

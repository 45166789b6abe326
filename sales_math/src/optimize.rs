//! Derivative-free minimisation
//!
//! Contains a Nelder–Mead simplex minimiser. Objective values that are not
//! finite are treated as `+inf` so the simplex moves away from them.

use crate::{MathError, Result};

/// Nelder–Mead simplex minimiser
#[derive(Debug, Clone)]
pub struct NelderMead {
    max_iterations: usize,
    tolerance: f64,
    initial_step: f64,
}

/// Result of a minimisation run
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the simplex collapsed below the tolerance
    pub converged: bool,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-10,
            initial_step: 0.5,
        }
    }
}

impl NelderMead {
    const REFLECTION: f64 = 1.0;
    const EXPANSION: f64 = 2.0;
    const CONTRACTION: f64 = 0.5;
    const SHRINK: f64 = 0.5;

    /// Create a minimiser with explicit limits
    pub fn new(max_iterations: usize, tolerance: f64, initial_step: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Maximum iterations must be greater than zero".to_string(),
            ));
        }
        if !(tolerance > 0.0) || !(initial_step > 0.0) {
            return Err(MathError::InvalidInput(
                "Tolerance and initial step must be positive".to_string(),
            ));
        }

        Ok(Self {
            max_iterations,
            tolerance,
            initial_step,
        })
    }

    /// Minimise `objective` starting from `start`
    pub fn minimize<F>(&self, objective: F, start: &[f64]) -> Result<Minimum>
    where
        F: Fn(&[f64]) -> f64,
    {
        if start.is_empty() {
            return Err(MathError::InvalidInput(
                "Starting point must have at least one dimension".to_string(),
            ));
        }

        let eval = |x: &[f64]| {
            let v = objective(x);
            if v.is_finite() {
                v
            } else {
                f64::INFINITY
            }
        };

        let dim = start.len();
        let start_value = eval(start);
        if !start_value.is_finite() {
            return Err(MathError::CalculationError(
                "Objective is not finite at the starting point".to_string(),
            ));
        }

        // Initial simplex: start plus one step along each axis
        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
        simplex.push((start.to_vec(), start_value));
        for i in 0..dim {
            let mut vertex = start.to_vec();
            vertex[i] += self.initial_step;
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let best = simplex[0].1;
            let worst = simplex[dim].1;
            if (worst - best).abs() <= self.tolerance * (1.0 + best.abs()) {
                converged = true;
                break;
            }
            iterations += 1;

            // Centroid of every vertex except the worst
            let mut centroid = vec![0.0; dim];
            for (vertex, _) in &simplex[..dim] {
                for (c, v) in centroid.iter_mut().zip(vertex) {
                    *c += v / dim as f64;
                }
            }

            let toward = |coef: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(&simplex[dim].0)
                    .map(|(c, w)| c + coef * (c - w))
                    .collect()
            };

            let reflected = toward(Self::REFLECTION);
            let reflected_value = eval(&reflected);

            if reflected_value < best {
                let expanded = toward(Self::EXPANSION);
                let expanded_value = eval(&expanded);
                simplex[dim] = if expanded_value < reflected_value {
                    (expanded, expanded_value)
                } else {
                    (reflected, reflected_value)
                };
                continue;
            }

            if reflected_value < simplex[dim - 1].1 {
                simplex[dim] = (reflected, reflected_value);
                continue;
            }

            let contracted = toward(-Self::CONTRACTION);
            let contracted_value = eval(&contracted);
            if contracted_value < worst {
                simplex[dim] = (contracted, contracted_value);
                continue;
            }

            // Shrink everything toward the best vertex
            let anchor = simplex[0].0.clone();
            for (vertex, value) in simplex.iter_mut().skip(1) {
                for (v, a) in vertex.iter_mut().zip(&anchor) {
                    *v = a + Self::SHRINK * (*v - a);
                }
                *value = eval(vertex);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (point, value) = simplex.swap_remove(0);

        Ok(Minimum {
            point,
            value,
            iterations,
            converged,
        })
    }
}

//! Statistics used by the trend fitter
//!
//! - Simple OLS with slope p-value and r²
//! - Student t distribution via the regularized incomplete beta function

mod distribution;
mod ols;

pub use distribution::{ln_gamma, regularized_incomplete_beta, student_t_two_sided_p};
pub use ols::{fit_simple_ols, SimpleOls};

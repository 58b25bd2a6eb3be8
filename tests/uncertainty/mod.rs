// Tests for post-fit covariance estimation

mod bootstrap_tests;
mod hessian_tests;

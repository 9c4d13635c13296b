use nalgebra::{DVector, Scalar};
use num_dual::DualNum;

/// Central second difference `(u[i-1] - 2u[i] + u[i+1]) / dx²` at every node,
/// with `ghost_left`/`ghost_right` standing in for `u[-1]` and `u[N]`.
pub fn second_derivative<T>(u: &DVector<T>, dx: f64, ghost_left: T, ghost_right: T) -> DVector<T>
where
    T: DualNum<f64> + Scalar,
{
    let n = u.len();
    let inv_dx2 = T::from(1.0 / (dx * dx));
    let two = T::from(2.0);
    DVector::from_fn(n, |i, _| {
        let left = if i == 0 {
            ghost_left.clone()
        } else {
            u[i - 1].clone()
        };
        let right = if i == n - 1 {
            ghost_right.clone()
        } else {
            u[i + 1].clone()
        };
        (left - two.clone() * u[i].clone() + right) * inv_dx2.clone()
    })
}

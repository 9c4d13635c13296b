use crate::discretization::stencil::second_derivative;
use crate::numerics::tridiagonal::Tridiagonal;
use crate::physics::{HeatProblem, PhysicsModel};
use nalgebra::{DVector, Scalar};
use num_dual::DualNum;

/// Builds the Newton system of one backward Euler step.
///
/// `t_old` is the field at the start of the step and stays frozen for every
/// iterate assembled through this value.
pub struct Assembler<'a> {
    problem: &'a HeatProblem,
    dt: f64,
    step: usize,
    t_old: &'a DVector<f64>,
}

impl<'a> Assembler<'a> {
    /// `step` is 1-based and selects the prescribed boundary values.
    pub fn new(problem: &'a HeatProblem, dt: f64, step: usize, t_old: &'a DVector<f64>) -> Self {
        Self {
            problem,
            dt,
            step,
            t_old,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// `(1 + 2α·dt/dx², -α·dt/dx²)`, constant over the step.
    pub fn coefficients(&self) -> (f64, f64) {
        let dx = self.problem.grid.dx;
        let r = self.problem.diffusivity * self.dt / (dx * dx);
        (1.0 + 2.0 * r, -r)
    }

    /// Tridiagonal Jacobian of the step.
    ///
    /// The radiative loss enters through the residual only; the diagonal stays
    /// at `1 + 2α·dt/dx²` regardless of boundary kind.
    pub fn jacobian(&self) -> Tridiagonal {
        let n = self.problem.num_nodes();
        let (temp1, temp2) = self.coefficients();

        let mut jac = Tridiagonal::zeros(n);
        for i in 0..n {
            if i == 0 {
                jac.upper[0] = self.problem.x0.kind.boundary_coupling(temp2);
            } else if i == n - 1 {
                jac.lower[n - 1] = self.problem.xl.kind.boundary_coupling(temp2);
            } else {
                jac.lower[i] = temp2;
                jac.upper[i] = temp2;
            }
            jac.diag[i] = temp1;
        }
        jac
    }

    /// Value prescribed at x = 0 after subtracting the radiative loss
    /// evaluated at the current surface temperature.
    pub fn effective_x0_value<T: DualNum<f64>>(&self, surface: T) -> T {
        let prescribed = T::from(self.problem.x0.prescribed(self.step));
        match &self.problem.radiation {
            Some(radiation) => prescribed - radiation.loss(surface),
            None => prescribed,
        }
    }

    /// Ghost temperatures beyond x = 0 and x = L for the iterate `u`.
    pub fn ghost_values<T>(&self, u: &DVector<T>) -> (T, T)
    where
        T: DualNum<f64> + Scalar,
    {
        let n = u.len();
        let k = self.problem.conductivity;
        let dx = self.problem.grid.dx;

        let x0_value = self.effective_x0_value(u[0].clone());
        let ghost_x0 = self.problem.x0.kind.ghost(x0_value, u[1].clone(), k, dx);

        let xl_value = T::from(self.problem.xl.prescribed(self.step));
        let ghost_xl = self.problem.xl.kind.ghost(xl_value, u[n - 2].clone(), k, dx);

        (ghost_x0, ghost_xl)
    }

    /// `F = T - T_old - α·dt·∂²T/∂x²`.
    pub fn residual<T>(&self, u: &DVector<T>) -> DVector<T>
    where
        T: DualNum<f64> + Scalar,
    {
        let (ghost_x0, ghost_xl) = self.ghost_values(u);
        let d2t = second_derivative(u, self.problem.grid.dx, ghost_x0, ghost_xl);
        let alpha_dt = T::from(self.problem.diffusivity * self.dt);

        DVector::from_fn(u.len(), |i, _| {
            u[i].clone() - T::from(self.t_old[i]) - alpha_dt.clone() * d2t[i].clone()
        })
    }

    /// Jacobian and right-hand side `-F` so that `J·dT = rhs` yields the
    /// Newton correction directly.
    pub fn assemble(&self, u: &DVector<f64>) -> (Tridiagonal, DVector<f64>) {
        (self.jacobian(), -self.residual(u))
    }
}

impl<T> PhysicsModel<T> for Assembler<'_>
where
    T: DualNum<f64> + Scalar,
{
    fn num_variables(&self) -> usize {
        self.problem.num_nodes()
    }

    fn calculate_residual(&self, u: &DVector<T>) -> DVector<T> {
        self.residual(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::numerics::SolverConfig;
    use crate::physics::MaterialProperties;
    use crate::physics::bc::{BoundaryConfig, Radiation, STEFAN_BOLTZMANN};
    use nalgebra::DMatrix;
    use num_dual::{DualDVec64, jacobian};

    fn problem(x0: BoundaryConfig, xl: BoundaryConfig, radiation: Option<Radiation>) -> HeatProblem {
        let config = SimulationConfig {
            length: 0.01,
            number_of_nodes: 11,
            material: MaterialProperties::new("steel", 60.5, 7850.0, 434.0),
            initial_temperature: 298.0,
            boundary_x0: x0,
            boundary_xl: xl,
            radiation,
            solver: SolverConfig::new(0.2, 3),
            show_progress: false,
        };
        HeatProblem::from_config(&config).unwrap()
    }

    fn varied_field(n: usize) -> DVector<f64> {
        DVector::from_fn(n, |i, _| 300.0 + 5.0 * (i as f64 * 0.7).sin() + i as f64)
    }

    fn ad_jacobian(asm: &Assembler, u: &DVector<f64>) -> DMatrix<f64> {
        let (_, jac) = jacobian(
            |arg: DVector<DualDVec64>| asm.calculate_residual(&arg),
            u.clone(),
        );
        jac
    }

    #[test]
    fn bands_follow_boundary_kinds() {
        let p = problem(
            BoundaryConfig::heat_flux(1000.0),
            BoundaryConfig::fixed_temperature(300.0),
            None,
        );
        let t_old = p.initial_condition();
        let asm = Assembler::new(&p, 0.2, 1, &t_old);
        let (temp1, temp2) = asm.coefficients();
        let jac = asm.jacobian();

        assert!(jac.diag.iter().all(|&d| d == temp1));
        assert_eq!(jac.upper[0], 2.0 * temp2);
        assert_eq!(jac.lower[10], 0.0);
        for i in 1..10 {
            assert_eq!(jac.lower[i], temp2);
            assert_eq!(jac.upper[i], temp2);
        }
    }

    #[test]
    fn analytic_jacobian_matches_automatic_differentiation() {
        let cases = [
            (BoundaryConfig::heat_flux(5.0e4), BoundaryConfig::heat_flux(0.0)),
            (
                BoundaryConfig::fixed_temperature(350.0),
                BoundaryConfig::fixed_temperature(290.0),
            ),
            (
                BoundaryConfig::fixed_temperature(350.0),
                BoundaryConfig::heat_flux(-2.0e3),
            ),
        ];
        for (x0, xl) in cases {
            let p = problem(x0, xl, None);
            let t_old = p.initial_condition();
            let asm = Assembler::new(&p, 0.2, 2, &t_old);
            let u = varied_field(p.num_nodes());

            let exact = ad_jacobian(&asm, &u);
            let banded = asm.jacobian().to_dense();
            let diff = (&exact - &banded).norm();
            assert!(diff / exact.norm() < 1e-12, "relative difference too large: {diff}");
        }
    }

    #[test]
    fn radiation_is_left_out_of_the_jacobian() {
        let rad = Radiation { emissivity: 0.9 };
        let p = problem(BoundaryConfig::heat_flux(1.0e5), BoundaryConfig::heat_flux(0.0), Some(rad));
        let t_old = p.initial_condition();
        let asm = Assembler::new(&p, 0.2, 1, &t_old);
        let u = varied_field(p.num_nodes());

        let exact = ad_jacobian(&asm, &u);
        let banded = asm.jacobian().to_dense();

        let dx = p.grid.dx;
        let r = p.diffusivity * 0.2 / (dx * dx);
        let missing = r * 8.0 * dx * 0.9 * STEFAN_BOLTZMANN * u[0].powi(3) / p.conductivity;
        assert!((exact[(0, 0)] - banded[(0, 0)] - missing).abs() < 1e-9 * missing.abs().max(1.0));

        let mut rest = &exact - &banded;
        rest[(0, 0)] = 0.0;
        assert!(rest.norm() < 1e-9);
    }

    #[test]
    fn uniform_field_with_adiabatic_ends_has_zero_residual() {
        let p = problem(BoundaryConfig::heat_flux(0.0), BoundaryConfig::heat_flux(0.0), None);
        let t_old = p.initial_condition();
        let asm = Assembler::new(&p, 0.2, 1, &t_old);
        let (_, rhs) = asm.assemble(&t_old);
        assert_eq!(rhs.norm(), 0.0);
    }

    #[test]
    fn residual_sign_points_along_the_correction() {
        // Heating at x=0 pulls the first node upward: rhs[0] = -F[0] > 0.
        let p = problem(BoundaryConfig::heat_flux(1.0e5), BoundaryConfig::heat_flux(0.0), None);
        let t_old = p.initial_condition();
        let asm = Assembler::new(&p, 0.2, 1, &t_old);
        let (jac, rhs) = asm.assemble(&t_old);
        assert!(rhs[0] > 0.0);
        assert!(rhs.iter().skip(1).all(|&v| v == 0.0));

        let du = jac.solve(&rhs).unwrap();
        let updated = &t_old + du;
        let (_, after) = asm.assemble(&updated);
        assert!(after.norm() < 1e-6 * rhs.norm());
    }

    #[test]
    fn radiation_reduces_effective_flux() {
        let rad = Radiation { emissivity: 0.5 };
        let p = problem(BoundaryConfig::heat_flux(1.0e5), BoundaryConfig::heat_flux(0.0), Some(rad));
        let t_old = p.initial_condition();
        let asm = Assembler::new(&p, 0.2, 1, &t_old);

        let cool = asm.effective_x0_value(300.0);
        let hot = asm.effective_x0_value(900.0);
        assert!(cool < 1.0e5);
        assert!(hot < cool);
        assert!(((1.0e5 - hot) / (1.0e5 - cool) - 81.0).abs() < 1e-9);
    }
}

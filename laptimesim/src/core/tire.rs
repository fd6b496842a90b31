use crate::core::vehicle::TirePars;

/// (N) Reference vertical load of the load sensitivity model, approximately 200 kg per tire.
pub const FZ_REFERENCE: f64 = 2000.0;

/// TireModel provides the available tire forces based on an isotropic friction circle with a
/// load-sensitive effective friction coefficient.
#[derive(Debug)]
pub struct TireModel {
    pars: TirePars,
}

impl TireModel {
    pub fn new(pars: &TirePars) -> TireModel {
        TireModel {
            pars: pars.to_owned(),
        }
    }

    /// mu_eff = mu_base * (Fz / Fz_ref)^(load_sensitivity - 1). The exponent is non-positive,
    /// i.e. higher loads produce proportionally less grip. A non-positive load yields zero.
    pub fn effective_mu(&self, fz: f64, base_mu: f64) -> f64 {
        if fz <= 0.0 {
            return 0.0;
        }

        let load_ratio = fz / FZ_REFERENCE;
        let exponent = self.pars.load_sensitivity - 1.0;

        base_mu * load_ratio.powf(exponent)
    }

    /// Maximum pure longitudinal force at the inserted vertical load.
    pub fn max_longitudinal_force(&self, fz: f64) -> f64 {
        self.effective_mu(fz, self.pars.mu_x) * fz
    }

    /// Maximum pure lateral force at the inserted vertical load.
    pub fn max_lateral_force(&self, fz: f64) -> f64 {
        self.effective_mu(fz, self.pars.mu_y) * fz
    }

    /// Maximum combined force magnitude. The averaged friction coefficient is a simplification
    /// of the anisotropic friction ellipse.
    pub fn max_total_force(&self, fz: f64) -> f64 {
        let mu_avg = (self.pars.mu_x + self.pars.mu_y) / 2.0;
        self.effective_mu(fz, mu_avg) * fz
    }

    /// The method returns the longitudinal force that is still available while the tire already
    /// transmits the inserted lateral force (friction circle: Fx^2 + Fy^2 <= F_max^2).
    pub fn available_longitudinal_force(&self, fz: f64, fy_current: f64) -> f64 {
        let f_max_squared = self.max_total_force(fz).powi(2);
        let fy_squared = fy_current.powi(2);

        if fy_squared >= f_max_squared {
            return 0.0;
        }

        (f_max_squared - fy_squared).sqrt()
    }

    /// The method returns the lateral force that is still available while the tire already
    /// transmits the inserted longitudinal force.
    pub fn available_lateral_force(&self, fz: f64, fx_current: f64) -> f64 {
        let f_max_squared = self.max_total_force(fz).powi(2);
        let fx_squared = fx_current.powi(2);

        if fx_squared >= f_max_squared {
            return 0.0;
        }

        (f_max_squared - fx_squared).sqrt()
    }

    /// The method checks whether a combined force request stays within the friction circle.
    pub fn is_within_friction_circle(&self, fx: f64, fy: f64, fz: f64) -> bool {
        (fx.powi(2) + fy.powi(2)).sqrt() <= self.max_total_force(fz)
    }
}

//! # Substitute fixed variables
//!
//! A variable with equal bounds is replaced by its value in the objective and the constraints.
use crate::presolve::Reducer;
use crate::presolve::error::Infeasible;

impl<'a> Reducer<'a> {
    /// Remove all variables that can take only a single value.
    ///
    /// # Return value
    ///
    /// Whether any variable was removed. Never `Infeasible`, the bounds were checked when they were
    /// set.
    pub(in crate::presolve) fn presolve_fixed_variables(&mut self) -> Result<bool, Infeasible> {
        let fixed = self.store.live_variables()
            .filter_map(|variable| self.bounds.fixed_value(variable).map(|value| (variable, value)))
            .collect::<Vec<_>>();

        for &(variable, value) in &fixed {
            self.fix_variable(variable, value);
        }

        Ok(!fixed.is_empty())
    }
}

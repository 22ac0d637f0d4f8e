//! # Restoring samples
//!
//! Every variable that presolve removes leaves a record behind describing how its value follows
//! from the values of the variables that remain. Replaying these records in reverse maps a sample
//! of the reduced model back to a sample of the original model.
use crate::presolve::error::PresolveError;

/// A variable from the original model that was removed.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    /// Variable was determined to an explicit value.
    Fixed {
        /// Original index.
        variable: usize,
        #[allow(missing_docs)]
        value: f64,
    },
    /// Variable was determined as an affine function of other variables.
    ///
    /// The value is `constant + Σ coefficient * value(j)` for `(j, coefficient)` in `terms`.
    Substituted {
        /// Original index.
        variable: usize,
        #[allow(missing_docs)]
        constant: f64,
        /// Original indices of other variables and their coefficients.
        terms: Vec<(usize, f64)>,
    },
}

impl Record {
    /// Index of the variable that was removed.
    pub fn variable(&self) -> usize {
        match self {
            Record::Fixed { variable, .. } | Record::Substituted { variable, .. } => *variable,
        }
    }
}

/// Append-only log of removed variables.
#[derive(Clone, Debug, PartialEq)]
pub struct Postsolve {
    records: Vec<Record>,
    eliminated: Vec<bool>,
}

impl Postsolve {
    /// Create a new instance for a model with a number of variables.
    pub fn new(nr_original_variables: usize) -> Self {
        Self {
            records: Vec::new(),
            eliminated: vec![false; nr_original_variables],
        }
    }

    #[allow(missing_docs)]
    pub fn nr_original_variables(&self) -> usize {
        self.eliminated.len()
    }

    /// All records, in the order in which the variables were removed.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Whether a variable was removed.
    pub fn is_eliminated(&self, variable: usize) -> bool {
        self.eliminated[variable]
    }

    /// Original indices of the variables that were not removed, ascending.
    ///
    /// This is the order of the variables in the reduced model.
    pub fn surviving_variables(&self) -> impl Iterator<Item = usize> + '_ {
        self.eliminated.iter()
            .enumerate()
            .filter(|&(_, &eliminated)| !eliminated)
            .map(|(j, _)| j)
    }

    /// Record that a variable was removed with a known value.
    pub fn record_fixed(&mut self, variable: usize, value: f64) {
        self.push(Record::Fixed { variable, value });
    }

    /// Record that a variable was removed as a function of other variables.
    ///
    /// # Arguments
    ///
    /// * `variable`: Variable that was removed.
    /// * `constant`: Constant part of the affine function.
    /// * `terms`: Linear part, in original indices of variables not yet removed.
    pub fn record_substituted(&mut self, variable: usize, constant: f64, terms: Vec<(usize, f64)>) {
        debug_assert!(terms.iter().all(|&(j, _)| j != variable && !self.eliminated[j]));

        self.push(Record::Substituted { variable, constant, terms });
    }

    fn push(&mut self, record: Record) {
        debug_assert!(!self.eliminated[record.variable()], "variable removed twice");

        self.eliminated[record.variable()] = true;
        self.records.push(record);
    }

    /// Map a sample of the reduced model to a sample of the original model.
    ///
    /// # Arguments
    ///
    /// * `reduced`: One value for every variable of the reduced model, in the order of that model.
    ///
    /// # Errors
    ///
    /// `PresolveError::SampleLength` if there are not exactly as many values as the reduced model
    /// has variables.
    pub fn restore(&self, reduced: &[f64]) -> Result<Vec<f64>, PresolveError> {
        let expected = self.nr_original_variables() - self.records.len();
        if reduced.len() != expected {
            return Err(PresolveError::SampleLength { expected, found: reduced.len() });
        }

        let mut values = vec![0_f64; self.nr_original_variables()];
        for (j, &value) in self.surviving_variables().zip(reduced) {
            values[j] = value;
        }
        for record in self.records.iter().rev() {
            match record {
                &Record::Fixed { variable, value } => values[variable] = value,
                Record::Substituted { variable, constant, terms } => {
                    values[*variable] = constant + terms.iter().map(|&(j, a)| a * values[j]).sum::<f64>();
                },
            }
        }

        Ok(values)
    }
}

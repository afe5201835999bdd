use bimap::BiMap;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ModelConstructionError;

/// Position of a variable inside a `Program`. Stable for a given topology and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Binary,
    Integer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub kind: VariableKind,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEqual,
    Equal,
    GreaterEqual,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessEqual => write!(f, "<="),
            Relation::Equal => write!(f, "="),
            Relation::GreaterEqual => write!(f, ">="),
        }
    }
}

/// Rule a constraint belongs to. Used for diagnostics and per-family statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstraintFamily {
    Demand,
    SourceCapacity,
    FreshCapacity,
    DisruptionLinkage,
    AcyclicOrdering,
    SlotExclusivity,
    SlotCount,
    Contiguity,
    FlowLinking,
    SpectrumContinuity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub family: ConstraintFamily,
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn lhs_value(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|(var, coefficient)| coefficient * values[var.index()]).sum()
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs_value(values);
        match self.relation {
            Relation::LessEqual => lhs <= self.rhs + tolerance,
            Relation::Equal => (lhs - self.rhs).abs() <= tolerance,
            Relation::GreaterEqual => lhs >= self.rhs - tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
}

/// Solver-independent mixed-integer linear program.
///
/// This is the canonical form handed to a `MilpSolver`: named variables with kind and bounds,
/// named linear constraints, and a linear objective. Variable names are unique and the
/// name/position mapping is kept in both directions.
#[derive(Debug, Clone)]
pub struct Program {
    variables: Vec<VariableDef>,
    names: BiMap<String, VarId>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<(VarId, f64)>,
    sense: Sense,
}

impl Program {
    pub fn new(sense: Sense) -> Self {
        Program { variables: Vec::new(), names: BiMap::new(), constraints: Vec::new(), objective: Vec::new(), sense }
    }

    pub fn add_variable(&mut self, name: String, kind: VariableKind, lower: f64, upper: f64) -> Result<VarId, ModelConstructionError> {
        if self.names.contains_left(&name) {
            return Err(ModelConstructionError::DuplicateVariable(name));
        }

        let id = VarId(self.variables.len());
        self.names.insert(name.clone(), id);
        self.variables.push(VariableDef { name, kind, lower, upper });

        Ok(id)
    }

    pub fn add_constraint(&mut self, name: String, family: ConstraintFamily, terms: Vec<(VarId, f64)>, relation: Relation, rhs: f64) {
        self.constraints.push(LinearConstraint { name, family, terms, relation, rhs });
    }

    pub fn set_objective(&mut self, terms: Vec<(VarId, f64)>) {
        self.objective = terms;
    }

    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &VariableDef {
        &self.variables[id.index()]
    }

    pub fn var_id(&self, name: &str) -> Option<VarId> {
        self.names.get_by_left(name).copied()
    }

    pub fn name(&self, id: VarId) -> &str {
        self.names.get_by_right(&id).map(String::as_str).unwrap_or_default()
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn family_counts(&self) -> BTreeMap<ConstraintFamily, usize> {
        let mut counts = BTreeMap::new();
        for constraint in &self.constraints {
            *counts.entry(constraint.family).or_insert(0) += 1;
        }
        counts
    }

    /// Objective value for a dense value vector indexed by `VarId`.
    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        self.objective.iter().map(|(var, coefficient)| coefficient * values[var.index()]).sum()
    }

    /// Constraints violated by a dense value vector, within `tolerance`.
    pub fn violated_constraints<'a>(&'a self, values: &'a [f64], tolerance: f64) -> impl Iterator<Item = &'a LinearConstraint> + 'a {
        self.constraints.iter().filter(move |constraint| !constraint.is_satisfied(values, tolerance))
    }
}

use {
    crate::{utils::serde_ark, FieldElement},
    ark_ff::{One, Zero},
    serde::{Deserialize, Serialize},
};

/// Handle to a variable allocated in a [`ConstraintSystem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Variable(pub usize);

/// A single `coeff * var` term of a linear combination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(with = "serde_ark")]
    pub coeff: FieldElement,
    pub var:   Variable,
}

/// A weighted sum of variables plus a constant, over the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearCombination {
    pub terms: Vec<Term>,
    #[serde(with = "serde_ark")]
    pub constant: FieldElement,
}

impl LinearCombination {
    #[must_use]
    pub fn zero() -> Self {
        Self {
            terms:    Vec::new(),
            constant: FieldElement::zero(),
        }
    }

    /// The constant combination `1`.
    #[must_use]
    pub fn one() -> Self {
        Self::constant(FieldElement::one())
    }

    #[must_use]
    pub fn constant(value: FieldElement) -> Self {
        Self {
            terms:    Vec::new(),
            constant: value,
        }
    }

    /// A combination holding a single variable with coefficient one.
    #[must_use]
    pub fn variable(var: Variable) -> Self {
        Self::term(FieldElement::one(), var)
    }

    #[must_use]
    pub fn term(coeff: FieldElement, var: Variable) -> Self {
        Self::zero().add(coeff, var)
    }

    pub fn push_term(&mut self, coeff: FieldElement, var: Variable) {
        self.terms.push(Term { coeff, var });
    }

    /// Builder form: `lc + coeff * var`.
    #[must_use]
    pub fn add(mut self, coeff: FieldElement, var: Variable) -> Self {
        self.push_term(coeff, var);
        self
    }

    #[must_use]
    pub fn with_constant(mut self, constant: FieldElement) -> Self {
        self.constant = constant;
        self
    }

    /// Evaluates the combination against a full variable assignment.
    #[must_use]
    pub fn evaluate(&self, assignment: &[FieldElement]) -> FieldElement {
        self.terms
            .iter()
            .fold(self.constant, |acc, term| acc + term.coeff * assignment[term.var.0])
    }
}

/// One rank-1 constraint `A * B = C`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub a: LinearCombination,
    pub b: LinearCombination,
    pub c: LinearCombination,
}

/// Sink for rank-1 constraints together with the variable assignment.
///
/// Variables are dense indices into the assignment vector and hold zero until
/// a value is written, so a freshly allocated system evaluates every
/// combination to its constant part. The first `num_public_inputs` variables
/// are the public ones; the count is registered once after parsing and never
/// changes afterwards.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConstraintSystem {
    constraints: Vec<Constraint>,
    #[serde(with = "serde_ark::vec")]
    values: Vec<FieldElement>,
    num_public_inputs: usize,
}

impl ConstraintSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh variable with a zero value.
    pub fn allocate_variable(&mut self) -> Variable {
        let var = Variable(self.values.len());
        self.values.push(FieldElement::zero());
        var
    }

    pub fn set_value(&mut self, var: Variable, value: FieldElement) {
        self.values[var.0] = value;
    }

    #[must_use]
    pub fn get_value(&self, var: Variable) -> FieldElement {
        self.values[var.0]
    }

    pub fn add_constraint(&mut self, a: LinearCombination, b: LinearCombination, c: LinearCombination) {
        self.constraints.push(Constraint { a, b, c });
    }

    pub fn set_num_public_inputs(&mut self, count: usize) {
        self.num_public_inputs = count;
    }

    #[must_use]
    pub const fn num_public_inputs(&self) -> usize {
        self.num_public_inputs
    }

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Whether the current assignment satisfies every constraint.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.first_unsatisfied().is_none()
    }

    /// Index of the first failing constraint, if any.
    #[must_use]
    pub fn first_unsatisfied(&self) -> Option<usize> {
        self.constraints.iter().position(|constraint| {
            let a = constraint.a.evaluate(&self.values);
            let b = constraint.b.evaluate(&self.values);
            let c = constraint.c.evaluate(&self.values);
            a * b != c
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(value: u64) -> FieldElement {
        FieldElement::from(value)
    }

    #[test]
    fn evaluate_includes_constant() {
        let mut cs = ConstraintSystem::new();
        let x = cs.allocate_variable();
        cs.set_value(x, fe(5));
        let lc = LinearCombination::constant(fe(3)).add(fe(2), x);
        assert_eq!(lc.evaluate(&[fe(5)]), fe(13));
        assert_eq!(LinearCombination::zero().evaluate(&[]), fe(0));
    }

    #[test]
    fn product_constraint_satisfaction() {
        let mut cs = ConstraintSystem::new();
        let a = cs.allocate_variable();
        let b = cs.allocate_variable();
        let c = cs.allocate_variable();
        cs.set_value(a, fe(3));
        cs.set_value(b, fe(5));
        cs.set_value(c, fe(15));
        cs.add_constraint(
            LinearCombination::variable(a),
            LinearCombination::variable(b),
            LinearCombination::variable(c),
        );
        assert!(cs.is_satisfied());

        cs.set_value(c, fe(16));
        assert_eq!(cs.first_unsatisfied(), Some(0));
    }

    #[test]
    fn fresh_variables_are_zero() {
        let mut cs = ConstraintSystem::new();
        let v = cs.allocate_variable();
        assert_eq!(cs.get_value(v), FieldElement::zero());
    }

    #[test]
    fn serde_round_trip() {
        let mut cs = ConstraintSystem::new();
        let a = cs.allocate_variable();
        let b = cs.allocate_variable();
        cs.set_value(a, fe(7));
        cs.set_num_public_inputs(1);
        cs.add_constraint(
            LinearCombination::variable(a),
            LinearCombination::one(),
            LinearCombination::variable(b).with_constant(fe(7)),
        );

        let json = serde_json::to_string(&cs).unwrap();
        let decoded: ConstraintSystem = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.num_variables(), 2);
        assert_eq!(decoded.num_public_inputs(), 1);
        assert_eq!(decoded.get_value(a), fe(7));
        assert_eq!(decoded.constraints(), cs.constraints());
    }
}

// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Projective measurement and non-destructive inspection.
//!
//! Both paths go through [`marginal_probabilities`], which delegates to the
//! component's single partial-trace routine, so a destructive `measure` and a
//! non-destructive `inspect` of the same register can never disagree.
//!
//! Measuring one register projects the *whole* component: every register
//! sharing the density matrix collapses together.

use rand::Rng;
use tracing::warn;

use crate::component::{Component, TRACE_FLOOR};
use crate::engine::registry::RegisterId;
use crate::error::Result;
use crate::operators::table::LabelId;

/// Outcome of one projective measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementOutcome {
    pub register: RegisterId,
    /// Basis label the register collapsed to.
    pub label: LabelId,
    /// 0 ↔ lo label, 1 ↔ hi label.
    pub bit: u8,
    /// Born probability of this outcome at sampling time.
    pub probability: f64,
    /// True when the Born distribution had no mass and the outcome is the
    /// documented fallback (the register's first basis label).
    pub degenerate: bool,
}

/// Born probabilities (P(lo), P(hi)) of one register, unnormalized.
///
/// The single source of truth shared by `measure` and `inspect`.
pub fn marginal_probabilities(component: &Component, register: RegisterId) -> Result<(f64, f64)> {
    component.probabilities_of(register)
}

/// Non-destructive inspection: both basis probabilities, normalized, keyed by
/// label in (lo, hi) order.
pub fn inspect(component: &Component, register: RegisterId) -> Result<[(LabelId, f64); 2]> {
    let (lo, hi) = component.labels_of(register)?;
    let (p_lo, p_hi) = marginal_probabilities(component, register)?;
    let total = p_lo + p_hi;
    if total < TRACE_FLOOR {
        warn!(%register, "degenerate marginal during inspection");
        return Ok([(lo, 0.0), (hi, 0.0)]);
    }
    Ok([(lo, p_lo / total), (hi, p_hi / total)])
}

/// Sample one register and project the whole component onto the outcome,
/// renormalizing afterwards.
pub fn measure<R: Rng>(
    component: &mut Component,
    register: RegisterId,
    rng: &mut R,
) -> Result<MeasurementOutcome> {
    let outcome = sample_and_project(component, register, rng)?;
    if !outcome.degenerate {
        component.renormalize();
    }
    Ok(outcome)
}

/// Measure every register of the component in `registers` order, projecting
/// after each sample and renormalizing once at the end.
///
/// Models the collapse of a whole entangled set: each projection conditions
/// the marginals of the registers still to be measured.
pub fn batch_measure<R: Rng>(
    component: &mut Component,
    rng: &mut R,
) -> Result<Vec<MeasurementOutcome>> {
    let registers: Vec<RegisterId> = component.registers().to_vec();
    let mut outcomes = Vec::with_capacity(registers.len());
    for register in registers {
        outcomes.push(sample_and_project(component, register, rng)?);
    }
    component.renormalize();
    Ok(outcomes)
}

/// Shared sampling/projection path: Born-sample from the marginal, project
/// the component, leave renormalization to the caller.
fn sample_and_project<R: Rng>(
    component: &mut Component,
    register: RegisterId,
    rng: &mut R,
) -> Result<MeasurementOutcome> {
    let (lo, hi) = component.labels_of(register)?;
    let (p_lo, p_hi) = marginal_probabilities(component, register)?;
    let total = p_lo + p_hi;

    if total < TRACE_FLOOR {
        // Degenerate Born distribution: fall back to the first basis label
        // without dividing, and leave the state untouched.
        warn!(
            %register,
            p_lo, p_hi, "degenerate Born distribution, returning default label"
        );
        return Ok(MeasurementOutcome {
            register,
            label: lo,
            bit: 0,
            probability: 0.0,
            degenerate: true,
        });
    }

    let draw: f64 = rng.gen::<f64>() * total;
    let (bit, label, probability) = if draw < p_lo {
        (0u8, lo, p_lo / total)
    } else {
        (1u8, hi, p_hi / total)
    };

    component.project_register(register, bit as usize)?;
    Ok(MeasurementOutcome {
        register,
        label,
        bit,
        probability,
        degenerate: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::operators::embed::{cnot, embed_1q, embed_2q, hadamard};
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const LO: LabelId = LabelId(0);
    const HI: LabelId = LabelId(1);

    fn fresh(reg: u64) -> Component {
        Component::new_pure(RegisterId(reg), (LO, HI))
    }

    fn bell_pair() -> Component {
        let mut c = fresh(0).merge_with(fresh(1));
        c.apply_unitary(&embed_1q(&hadamard(), 0, 2).unwrap()).unwrap();
        c.apply_unitary(&embed_2q(&cnot(), 0, 1, 2).unwrap()).unwrap();
        c
    }

    #[test]
    fn test_measure_fresh_register_is_deterministic() {
        let mut c = fresh(0);
        let mut rng = SmallRng::seed_from_u64(1);
        let outcome = measure(&mut c, RegisterId(0), &mut rng).unwrap();
        assert_eq!(outcome.label, LO);
        assert_eq!(outcome.bit, 0);
        assert!(!outcome.degenerate);
        assert_relative_eq!(outcome.probability, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inspect_matches_measure_after_collapse() {
        let mut c = fresh(0);
        c.apply_unitary(&embed_1q(&hadamard(), 0, 1).unwrap()).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let outcome = measure(&mut c, RegisterId(0), &mut rng).unwrap();

        // Repeated inspection reports certainty for the measured outcome
        // until another operation touches the component.
        for _ in 0..3 {
            let probs = inspect(&c, RegisterId(0)).unwrap();
            let measured = probs.iter().find(|(l, _)| *l == outcome.label).unwrap();
            let other = probs.iter().find(|(l, _)| *l != outcome.label).unwrap();
            assert_relative_eq!(measured.1, 1.0, epsilon = 1e-9);
            assert_relative_eq!(other.1, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_bell_pair_perfect_correlation() {
        // Measuring one half of Φ+ fixes the other, every time.
        for trial in 0..200 {
            let mut c = bell_pair();
            let mut rng = SmallRng::seed_from_u64(trial);
            let first = measure(&mut c, RegisterId(0), &mut rng).unwrap();
            let second = measure(&mut c, RegisterId(1), &mut rng).unwrap();
            assert_eq!(
                first.label, second.label,
                "trial {}: partner decorrelated",
                trial
            );
            assert_relative_eq!(second.probability, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_both_bell_outcomes_occur() {
        let mut saw_lo = false;
        let mut saw_hi = false;
        for trial in 0..200 {
            let mut c = bell_pair();
            let mut rng = SmallRng::seed_from_u64(trial);
            match measure(&mut c, RegisterId(0), &mut rng).unwrap().bit {
                0 => saw_lo = true,
                _ => saw_hi = true,
            }
        }
        assert!(saw_lo && saw_hi, "Born sampling never explored one branch");
    }

    #[test]
    fn test_batch_measure_collapses_whole_set() {
        let mut c = bell_pair();
        let mut rng = SmallRng::seed_from_u64(3);
        let outcomes = batch_measure(&mut c, &mut rng).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].label, outcomes[1].label);
        // Post-batch state is normalized and fully collapsed
        assert!(c.validate_invariants(1e-6).is_none());
        assert_relative_eq!(c.purity_of(RegisterId(0)).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_marginal_returns_default_label() {
        let mut c = fresh(0);
        c.ensure_density_matrix();
        // Both diagonal entries below the floor
        c.replace_density(Array2::zeros((2, 2)));
        let mut rng = SmallRng::seed_from_u64(5);
        let outcome = measure(&mut c, RegisterId(0), &mut rng).unwrap();
        assert!(outcome.degenerate);
        assert_eq!(outcome.label, LO);
        assert_eq!(outcome.bit, 0);
        assert_relative_eq!(outcome.probability, 0.0);

        let probs = inspect(&c, RegisterId(0)).unwrap();
        assert_relative_eq!(probs[0].1, 0.0);
        assert_relative_eq!(probs[1].1, 0.0);
    }

    #[test]
    fn test_measure_unknown_register_errors() {
        let mut c = fresh(0);
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(measure(&mut c, RegisterId(99), &mut rng).is_err());
    }
}

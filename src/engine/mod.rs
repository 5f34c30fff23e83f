// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! The engine: owns every component of one simulation scope.
//!
//! The engine maps registers to components, merges components on entangling
//! operations, and dispatches gate, measurement, and evolution calls. It is
//! single-threaded and synchronous: all operations are plain function calls
//! driven by an external fixed-timestep tick. Independent engine instances
//! share no state and can be advanced in parallel by an external scheduler.

pub mod registry;

use std::collections::{HashMap, HashSet};

use ndarray::Array2;
use num_complex::Complex64;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::component::{Component, ComponentSnapshot};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::evolve::{drain_flux, euler_step};
use crate::measure::{self, MeasurementOutcome};
use crate::operators::build::{build_hamiltonian, build_jump_operators};
use crate::operators::embed::{cnot, embed_1q, embed_2q, hadamard};
use crate::operators::table::{LabelId, LabelTable, OperatorTable};
use crate::validation;

use registry::{ComponentArena, ComponentId, RegisterId};

/// One simulation scope: a registry of components plus the shared
/// label table, RNG, clock, and sink-flux accumulator.
pub struct Engine {
    config: EngineConfig,
    arena: ComponentArena,
    register_component: HashMap<RegisterId, ComponentId>,
    entanglement: HashMap<RegisterId, HashSet<RegisterId>>,
    labels: LabelTable,
    sink_flux: HashMap<LabelId, f64>,
    rng: SmallRng,
    next_register: u64,
    time: f64,
}

impl Engine {
    /// Create an engine; the Born sampler is seeded from the configuration,
    /// or from entropy when no seed is set.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Ok(Self {
            config,
            arena: ComponentArena::new(),
            register_component: HashMap::new(),
            entanglement: HashMap::new(),
            labels: LabelTable::new(),
            sink_flux: HashMap::new(),
            rng,
            next_register: 0,
            time: 0.0,
        })
    }

    /// Create an engine with an explicit seed, overriding the configuration.
    pub fn with_seed(mut config: EngineConfig, seed: u64) -> Result<Self> {
        config.rng_seed = Some(seed);
        Self::new(config)
    }

    /// Intern a basis label at the boundary.
    pub fn intern_label(&mut self, name: &str) -> LabelId {
        self.labels.intern(name)
    }

    /// Resolve an interned label back to its string.
    pub fn label_name(&self, label: LabelId) -> Option<&str> {
        self.labels.resolve(label)
    }

    /// Simulated time in seconds, advanced by `evolve`.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn num_components(&self) -> usize {
        self.arena.len()
    }

    pub fn num_registers(&self) -> usize {
        self.register_component.len()
    }

    /// Allocate a fresh register: a new 1-register component in the pure
    /// |lo⟩ state.
    pub fn allocate(&mut self, lo: LabelId, hi: LabelId) -> RegisterId {
        let register = RegisterId(self.next_register);
        self.next_register += 1;
        let id = self.arena.insert(Component::new_pure(register, (lo, hi)));
        self.register_component.insert(register, id);
        self.entanglement.entry(register).or_default();
        debug!(%register, component = %id, "allocated register");
        register
    }

    /// Convenience: intern both labels, then allocate.
    pub fn allocate_pair(&mut self, lo: &str, hi: &str) -> RegisterId {
        let lo = self.labels.intern(lo);
        let hi = self.labels.intern(hi);
        self.allocate(lo, hi)
    }

    /// Component currently holding a register.
    pub fn component_of(&self, register: RegisterId) -> Result<ComponentId> {
        self.register_component
            .get(&register)
            .copied()
            .ok_or(Error::InvalidRegister(register))
    }

    pub fn get_component(&self, id: ComponentId) -> Result<&Component> {
        self.arena.get(id)
    }

    /// Ids of every live component.
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.arena.live_ids()
    }

    /// Merge the components of two registers into one (ρ_a ⊗ ρ_b), retiring
    /// the old arena slots and recording complete bipartite entanglement
    /// edges. Enforces the configured dimension cap before allocating.
    pub fn merge(&mut self, a: RegisterId, b: RegisterId) -> Result<ComponentId> {
        let id_a = self.component_of(a)?;
        let id_b = self.component_of(b)?;
        if id_a == id_b {
            return Ok(id_a);
        }

        let dim_a = self.arena.get(id_a)?.dimension();
        let dim_b = self.arena.get(id_b)?.dimension();
        validation::check_dimension(dim_a * dim_b, self.config.max_component_dimension)?;

        let comp_a = self.arena.remove(id_a)?;
        let comp_b = self.arena.remove(id_b)?;
        let regs_a: Vec<RegisterId> = comp_a.registers().to_vec();
        let regs_b: Vec<RegisterId> = comp_b.registers().to_vec();

        let merged = comp_a.merge_with(comp_b);
        let id = self.arena.insert(merged);
        for &reg in regs_a.iter().chain(regs_b.iter()) {
            self.register_component.insert(reg, id);
        }
        for &ra in &regs_a {
            for &rb in &regs_b {
                self.entanglement.entry(ra).or_default().insert(rb);
                self.entanglement.entry(rb).or_default().insert(ra);
            }
        }
        debug!(component = %id, registers = regs_a.len() + regs_b.len(), "merged components");
        Ok(id)
    }

    /// Apply a 2×2 unitary to one register: ρ′ = UρU†.
    pub fn apply_1q(&mut self, register: RegisterId, u: &Array2<Complex64>) -> Result<()> {
        let id = self.component_of(register)?;
        let component = self.arena.get_mut(id)?;
        let index = component.index_of(register)?;
        let full = embed_1q(u, index, component.num_registers())?;
        component.apply_unitary(&full)?;
        self.check_component(id);
        Ok(())
    }

    /// Apply a 4×4 unitary across two registers that already share a
    /// component. Never merges implicitly: `ComponentMismatch` otherwise.
    pub fn apply_2q(
        &mut self,
        reg_a: RegisterId,
        reg_b: RegisterId,
        u: &Array2<Complex64>,
    ) -> Result<()> {
        let id_a = self.component_of(reg_a)?;
        let id_b = self.component_of(reg_b)?;
        if id_a != id_b {
            return Err(Error::ComponentMismatch { a: reg_a, b: reg_b });
        }
        let component = self.arena.get_mut(id_a)?;
        let idx_a = component.index_of(reg_a)?;
        let idx_b = component.index_of(reg_b)?;
        let full = embed_2q(u, idx_a, idx_b, component.num_registers())?;
        component.apply_unitary(&full)?;
        self.check_component(id_a);
        Ok(())
    }

    /// Entangle two registers into the Φ+ Bell state: merge if needed, then
    /// Hadamard on `reg_a` followed by CNOT(a→b). Produces Φ+ only when both
    /// registers start in |lo⟩.
    pub fn entangle(&mut self, reg_a: RegisterId, reg_b: RegisterId) -> Result<ComponentId> {
        let id = self.merge(reg_a, reg_b)?;
        self.apply_1q(reg_a, &hadamard())?;
        self.apply_2q(reg_a, reg_b, &cnot())?;
        debug!(a = %reg_a, b = %reg_b, "entangled registers");
        self.component_of(reg_a)
    }

    /// Advance every component by one Lindblad timestep.
    ///
    /// Per component: rebuild H(t) from the table (drives evaluated at the
    /// engine clock), build jump operators, accumulate pre-step drain flux,
    /// take one forward-Euler step, renormalize, then invariant-check.
    pub fn evolve(&mut self, table: &OperatorTable, dt: f64) -> Result<()> {
        let t = self.time;
        for id in self.arena.live_ids() {
            let component = self.arena.get_mut(id)?;
            component.ensure_density_matrix();

            let h = build_hamiltonian(table, component.label_pairs(), t)?;
            let jumps = build_jump_operators(table, component.label_pairs())?;
            let Some(rho) = component.density() else {
                continue;
            };

            // Pre-step drain accounting: flux reads the population *before*
            // the step mutates it.
            for (label, flux) in drain_flux(rho, &jumps, dt) {
                *self.sink_flux.entry(label).or_insert(0.0) += flux;
            }

            let next = euler_step(rho, &h, &jumps, dt);
            component.replace_density(next);
            if !component.renormalize() {
                warn!(component = %id, "trace collapsed to zero during evolution");
            }
            self.check_component(id);
        }
        self.time += dt;
        Ok(())
    }

    /// Sample and collapse one register; the whole component projects with it.
    pub fn measure(&mut self, register: RegisterId) -> Result<MeasurementOutcome> {
        let id = self.component_of(register)?;
        let component = self.arena.get_mut(id)?;
        let outcome = measure::measure(component, register, &mut self.rng)?;
        debug!(%register, label = %outcome.label, degenerate = outcome.degenerate, "measured");
        self.check_component(id);
        Ok(outcome)
    }

    /// Non-destructive Born probabilities of one register, keyed by label.
    pub fn inspect(&self, register: RegisterId) -> Result<[(LabelId, f64); 2]> {
        let component = self.arena.get(self.component_of(register)?)?;
        measure::inspect(component, register)
    }

    /// Measure every register of a component in tensor order.
    pub fn batch_measure(&mut self, id: ComponentId) -> Result<Vec<MeasurementOutcome>> {
        let component = self.arena.get_mut(id)?;
        let outcomes = measure::batch_measure(component, &mut self.rng)?;
        self.check_component(id);
        Ok(outcomes)
    }

    /// Marginal purity Tr(ρ_m²) of one register.
    pub fn marginal_purity(&self, register: RegisterId) -> Result<f64> {
        self.arena
            .get(self.component_of(register)?)?
            .purity_of(register)
    }

    /// Marginal coherence |ρ_m[0,1]| of one register.
    pub fn marginal_coherence(&self, register: RegisterId) -> Result<f64> {
        self.arena
            .get(self.component_of(register)?)?
            .coherence_of(register)
    }

    /// Probability of finding a register in one of its basis labels.
    pub fn marginal_probability(&self, register: RegisterId, label: LabelId) -> Result<f64> {
        let component = self.arena.get(self.component_of(register)?)?;
        let (lo, hi) = component.labels_of(register)?;
        let probs = measure::inspect(component, register)?;
        if label == lo {
            Ok(probs[0].1)
        } else if label == hi {
            Ok(probs[1].1)
        } else {
            Err(Error::Validation(crate::error::ValidationError::Field {
                field: "label".into(),
                message: format!("register {} does not carry {}", register, label),
            }))
        }
    }

    /// Registers this register has ever been merged with (informational).
    pub fn entangled_with(&self, register: RegisterId) -> Option<&HashSet<RegisterId>> {
        self.entanglement.get(&register)
    }

    /// Accumulated drained probability per label since the last reset.
    pub fn sink_flux_per_label(&self) -> &HashMap<LabelId, f64> {
        &self.sink_flux
    }

    /// Clear per-step drain accumulation.
    pub fn reset_sink_flux(&mut self) {
        self.sink_flux.clear();
    }

    /// Discard a whole component; its registers vanish with it. Partial
    /// removal of one register from a multi-register component is not
    /// supported (components never split).
    pub fn discard_component(&mut self, id: ComponentId) -> Result<()> {
        let component = self.arena.remove(id)?;
        for &reg in component.registers() {
            self.register_component.remove(&reg);
            self.entanglement.remove(&reg);
        }
        for partners in self.entanglement.values_mut() {
            for reg in component.registers() {
                partners.remove(reg);
            }
        }
        debug!(component = %id, "discarded component");
        Ok(())
    }

    /// Serializable snapshot of one component.
    pub fn snapshot_component(&self, id: ComponentId) -> Result<ComponentSnapshot> {
        Ok(self.arena.get(id)?.snapshot())
    }

    /// Restore a component from a snapshot. Its register ids must not
    /// collide with live registers.
    pub fn restore_component(&mut self, snapshot: ComponentSnapshot) -> Result<ComponentId> {
        for reg in &snapshot.registers {
            if self.register_component.contains_key(reg) {
                return Err(Error::Serialization(format!(
                    "register {} already live in this engine",
                    reg
                )));
            }
        }
        let component = Component::from_snapshot(snapshot)?;
        validation::check_dimension(component.dimension(), self.config.max_component_dimension)?;
        let registers: Vec<RegisterId> = component.registers().to_vec();
        let id = self.arena.insert(component);
        for &reg in &registers {
            self.register_component.insert(reg, id);
            self.entanglement.entry(reg).or_default();
        }
        self.next_register = self
            .next_register
            .max(registers.iter().map(|r| r.0 + 1).max().unwrap_or(0));
        Ok(id)
    }

    /// Post-operation invariant check; violations are logged, never raised.
    fn check_component(&self, id: ComponentId) {
        if !self.config.check_invariants {
            return;
        }
        if let Ok(component) = self.arena.get(id) {
            if let Some(violation) = component.validate_invariants(self.config.trace_tolerance) {
                warn!(component = %id, %violation, "post-operation invariant check failed");
            }
        }
    }
}

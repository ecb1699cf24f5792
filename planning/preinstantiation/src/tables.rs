//! The global side tables threaded through the preinstantiation pipeline.
//!
//! Rather than the module-level statics a straight port of the source algorithm would reach for,
//! every table here is a field of one owning [`PreprocessingContext`] passed by reference through
//! the pipeline (`examples/plaans-aries/planning/planning/src/chronicles/mod.rs`'s `Ctx` is the
//! same shape: one struct owning the symbol table, fluents and model). This is what lets a caller
//! run several planning problems concurrently — one context each — rather than being pinned to a
//! process-wide singleton (§5, §9 of the design notes).
//!
//! Interning uses the dense-handle idiom from `aries_collections::ref_store`: a [`RefPool`] where
//! reverse lookup by name is needed (predicates, types, constants — uniqueness is by name), a
//! [`RefStore`] for append-only per-handle data indexed by a handle obtained elsewhere (typed
//! signatures, inertia tags, inferred domains, occurrence tables).

use std::collections::BTreeSet;

use aries_collections::ref_store::{RefPool, RefStore};

use crate::ids::{ConstantId, PredicateId, TypeId};
use crate::inertia::Inertia;
use crate::predicate_tables::PredicateOccurrenceTables;

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("predicate `{0}` is already declared")]
    DuplicatePredicate(String),
    #[error("type `{0}` is already declared")]
    DuplicateType(String),
}

pub struct PreprocessingContext {
    predicate_names: RefPool<PredicateId, String>,
    typed_predicates: RefStore<PredicateId, Vec<TypeId>>,
    inertia: RefStore<PredicateId, Inertia>,
    inferred_domains: RefStore<PredicateId, Option<BTreeSet<ConstantId>>>,
    occurrence_tables: RefStore<PredicateId, Option<PredicateOccurrenceTables>>,

    type_names: RefPool<TypeId, String>,
    domains: RefStore<TypeId, BTreeSet<ConstantId>>,

    constant_names: RefPool<ConstantId, String>,
}

impl Default for PreprocessingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PreprocessingContext {
    pub fn new() -> PreprocessingContext {
        PreprocessingContext {
            predicate_names: RefPool::default(),
            typed_predicates: RefStore::new(),
            inertia: RefStore::new(),
            inferred_domains: RefStore::new(),
            occurrence_tables: RefStore::new(),
            type_names: RefPool::default(),
            domains: RefStore::new(),
            constant_names: RefPool::default(),
        }
    }

    // ---- predicates -------------------------------------------------------------------------

    /// Declares a new predicate, growing `tableOfPredicates`, `tableOfTypedPredicates`,
    /// `tableOfInertia` and `tableOfInferredDomains` in lockstep: the invariant
    /// `|inertia| = |typed_predicates| = |predicates|` (§3) holds after every call.
    pub fn declare_predicate(&mut self, name: impl Into<String>, argument_types: Vec<TypeId>) -> Result<PredicateId, TableError> {
        let name = name.into();
        if self.predicate_names.get_ref(name.as_str()).is_some() {
            return Err(TableError::DuplicatePredicate(name));
        }
        let id = self.predicate_names.push(name);
        let arity = argument_types.len();
        let typed_id = self.typed_predicates.push(argument_types);
        debug_assert_eq!(id, typed_id);
        let inertia_id = self.inertia.push(Inertia::Inertia);
        debug_assert_eq!(id, inertia_id);
        // arity(p)=1 is necessary but not sufficient for a non-null inferred domain: the
        // predicate must still turn out to be INERTIA (always true at this point) *after*
        // inertia extraction has run. We seed `None` here and let
        // `crate::type_inference::infer_types_from_inertia` populate it.
        let _ = arity;
        let domains_id = self.inferred_domains.push(None);
        debug_assert_eq!(id, domains_id);
        let tables_id = self.occurrence_tables.push(None);
        debug_assert_eq!(id, tables_id);
        Ok(id)
    }

    pub fn predicate_name(&self, p: PredicateId) -> &str {
        self.predicate_names.get(p)
    }

    pub fn predicate_id(&self, name: &str) -> Option<PredicateId> {
        self.predicate_names.get_ref(name)
    }

    pub fn argument_types(&self, p: PredicateId) -> &[TypeId] {
        self.typed_predicates.get(p)
    }

    pub fn arity(&self, p: PredicateId) -> usize {
        self.argument_types(p).len()
    }

    pub fn predicates(&self) -> impl Iterator<Item = PredicateId> + '_ {
        self.predicate_names.keys()
    }

    pub fn inertia(&self, p: PredicateId) -> Inertia {
        *self.inertia.get(p)
    }

    pub fn set_inertia(&mut self, p: PredicateId, value: Inertia) {
        *self.inertia.get_mut(p) = value;
    }

    pub fn inferred_domain(&self, p: PredicateId) -> Option<&BTreeSet<ConstantId>> {
        self.inferred_domains.get(p).as_ref()
    }

    pub fn set_inferred_domain(&mut self, p: PredicateId, domain: Option<BTreeSet<ConstantId>>) {
        *self.inferred_domains.get_mut(p) = domain;
    }

    pub fn occurrence_tables(&self, p: PredicateId) -> Option<&PredicateOccurrenceTables> {
        self.occurrence_tables.get(p).as_ref()
    }

    pub fn set_occurrence_tables(&mut self, p: PredicateId, tables: PredicateOccurrenceTables) {
        *self.occurrence_tables.get_mut(p) = Some(tables);
    }

    // ---- types & domains ----------------------------------------------------------------------

    pub fn declare_type(&mut self, name: impl Into<String>, domain: BTreeSet<ConstantId>) -> Result<TypeId, TableError> {
        let name = name.into();
        if self.type_names.get_ref(name.as_str()).is_some() {
            return Err(TableError::DuplicateType(name));
        }
        let id = self.type_names.push(name);
        let domain_id = self.domains.push(domain);
        debug_assert_eq!(id, domain_id);
        Ok(id)
    }

    pub fn type_name(&self, t: TypeId) -> &str {
        self.type_names.get(t)
    }

    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.type_names.get_ref(name)
    }

    pub fn domain(&self, t: TypeId) -> &BTreeSet<ConstantId> {
        self.domains.get(t)
    }

    /// Returns the type named `name` if it is already declared, otherwise declares it with
    /// `domain`. Type naming is by string equality (§6): `declare_or_get_type("A^B", ...)` called
    /// twice for the same split always returns the same handle.
    pub fn declare_or_get_type(&mut self, name: impl Into<String>, domain: impl FnOnce() -> BTreeSet<ConstantId>) -> TypeId {
        let name = name.into();
        if let Some(id) = self.type_names.get_ref(name.as_str()) {
            return id;
        }
        self.declare_type(name, domain()).expect("just checked absence")
    }

    // ---- constants ------------------------------------------------------------------------------

    pub fn declare_constant(&mut self, name: impl Into<String>) -> ConstantId {
        let name = name.into();
        if let Some(id) = self.constant_names.get_ref(name.as_str()) {
            return id;
        }
        self.constant_names.push(name)
    }

    pub fn constant_name(&self, c: ConstantId) -> &str {
        self.constant_names.get(c)
    }

    pub fn constants(&self) -> impl Iterator<Item = ConstantId> + '_ {
        self.constant_names.keys()
    }

    /// Checks the `|tableOfInertia| = |tableOfTypedPredicates| = |tableOfPredicates|` family of
    /// invariants (§3). `declare_predicate` keeps them in lockstep by construction; this exists
    /// for callers (the pipeline entry point) that want to fail fast on a context built by hand
    /// or deserialized from an untrusted source.
    pub fn validate(&self) -> Result<(), crate::errors::PreinstantiationError> {
        let expected = self.predicate_names.len();
        for (table, actual) in [
            ("tableOfTypedPredicates", self.typed_predicates.len()),
            ("tableOfInertia", self.inertia.len()),
            ("tableOfInferredDomains", self.inferred_domains.len()),
            ("predicatesTables", self.occurrence_tables.len()),
        ] {
            if actual != expected {
                return Err(crate::errors::PreinstantiationError::MismatchedTable { table, expected, actual });
            }
        }
        Ok(())
    }
}

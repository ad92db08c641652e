//! Turns decoded units into dependency sink calls, and drives whole runs over
//! many units.

use crate::sink::{DependencySink, ObjectDecl};
use crate::unit::{BodyOp, BootstrapKind, ClassUnit};
use anyhow::Result;
use std::collections::HashSet;
use tracing::debug;

/// Convert a decoder-native slash-separated name to dotted FQN form.
pub fn dotted(name: &str) -> String {
    name.replace('/', ".")
}

/// Emit one decoded unit into the sink: open the object, its fields and
/// methods, every edge observed in method bodies, then close everything.
pub fn analyze_unit(unit: &ClassUnit, sink: &mut dyn DependencySink) {
    let fqn = dotted(&unit.name);
    debug!(class = %fqn, "analyzing unit");

    let mut supers = Vec::new();
    if let Some(super_name) = &unit.super_name {
        supers.push(dotted(super_name));
    }
    supers.extend(unit.interfaces.iter().map(|name| dotted(name)));

    // An inner-class record naming this unit with no inner simple name means
    // the unit is an anonymous/locally-scoped class.
    let local = unit
        .inner_classes
        .iter()
        .any(|inner| dotted(&inner.name) == fqn && inner.inner_name.is_none());

    let decl = ObjectDecl::new(fqn.clone(), local, unit.is_interface, supers);
    let object = sink.open_object(&decl);

    let mut fields: HashSet<String> = HashSet::new();
    for field in &unit.fields {
        if fields.insert(field.clone()) {
            object.field(field);
        }
    }

    for method_unit in &unit.methods {
        debug!(class = %fqn, method = %method_unit.name, "analyzing method");
        let method = object.open_method(&method_unit.name, method_unit.private);
        for op in &method_unit.body {
            match op {
                BodyOp::Call { owner, name } => {
                    method.call(&dotted(owner), name);
                }
                BodyOp::FieldAccess { owner, name } => {
                    let owner_fqn = dotted(owner);
                    method.reference(&owner_fqn, name);
                    // The owner of a field access can be this object even when
                    // the field declaration was never seen (it may live in a
                    // superclass); attribute it as a field of this object too.
                    if owner_fqn == fqn && !fields.contains(name) {
                        fields.insert(name.clone());
                        object.field(name);
                    }
                }
                BodyOp::DynamicCall {
                    bootstrap,
                    owner,
                    name,
                } => {
                    if *bootstrap == BootstrapKind::LambdaMetafactory {
                        debug!(target = %name, owner = %owner, "resolved lambda call site");
                        method.call(&dotted(owner), name);
                    }
                }
            }
        }
        method.close();
    }

    object.close();
}

/// A source of decoded units; archive and directory scanning live behind this
/// seam, outside the crate.
pub trait UnitSource {
    fn units(&self) -> Result<Vec<ClassUnit>>;
}

/// Several unit sources analyzed back to back as one run.
pub struct AggregateSource {
    sources: Vec<Box<dyn UnitSource>>,
}

impl AggregateSource {
    pub fn new(sources: Vec<Box<dyn UnitSource>>) -> Self {
        Self { sources }
    }
}

impl UnitSource for AggregateSource {
    fn units(&self) -> Result<Vec<ClassUnit>> {
        let mut units = Vec::new();
        for source in &self.sources {
            units.extend(source.units()?);
        }
        Ok(units)
    }
}

/// Analyze every unit of `source` into `sink`, then fire pipeline shutdown.
/// A malformed source aborts the whole run.
pub fn analyze_all(source: &dyn UnitSource, sink: &mut dyn DependencySink) -> Result<()> {
    for unit in source.units()? {
        analyze_unit(&unit, sink);
    }
    sink.close();
    Ok(())
}

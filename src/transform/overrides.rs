//! Override simulation: a method that overrides an ancestor's method depends
//! on the overridden contract, so a synthetic call edge is injected towards
//! the nearest declaring ancestor. Works for interfaces the same way.

use crate::signal::SignalMap;
use crate::sink::{DependencySink, MethodHandle, ObjectDecl, ObjectHandle, ObjectSink};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

/// Everything needed to answer "does this ancestor declare method M, and if
/// not, where to look next", snapshotted when the ancestor closes.
#[derive(Clone)]
struct AnalyzedObject {
    fqn: String,
    supers: Vec<String>,
    methods: Rc<HashSet<String>>,
}

struct OverrideState {
    next: Box<dyn DependencySink>,
    analyzed: SignalMap<AnalyzedObject>,
}

/// Injects one synthetic call per overriding method, resolved asynchronously:
/// ancestors not yet closed are awaited, and the walk continues up their own
/// super chains until a declaring ancestor is found or the chain runs out.
pub struct OverrideSimulation {
    state: Rc<RefCell<OverrideState>>,
}

impl OverrideSimulation {
    pub fn new(next: Box<dyn DependencySink>) -> Self {
        Self {
            state: Rc::new(RefCell::new(OverrideState {
                next,
                analyzed: SignalMap::new(),
            })),
        }
    }
}

impl DependencySink for OverrideSimulation {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle {
        let inner = self.state.borrow_mut().next.open_object(decl);
        ObjectHandle::new(OverrideObject {
            state: self.state.clone(),
            decl: decl.clone(),
            inner,
            methods: HashSet::new(),
        })
    }

    fn close(&mut self) {
        self.state.borrow_mut().next.close();
    }
}

struct OverrideObject {
    state: Rc<RefCell<OverrideState>>,
    decl: ObjectDecl,
    inner: ObjectHandle,
    methods: HashSet<String>,
}

impl ObjectSink for OverrideObject {
    fn open_method(&mut self, name: &str, local: bool) -> MethodHandle {
        self.methods.insert(name.to_string());
        let method = self.inner.open_method(name, local);
        // Shared once-flag: at most one synthetic edge per lookup, even when
        // several same-distance ancestors declare the method.
        let injected = Rc::new(Cell::new(false));
        resolve_override(&self.state, &method, name, &self.decl.supers, &injected);
        method
    }

    fn field(&mut self, name: &str) {
        self.inner.field(name);
    }

    fn close(&mut self) {
        self.inner.close();
        let analyzed = AnalyzedObject {
            fqn: self.decl.fqn.clone(),
            supers: self.decl.supers.clone(),
            methods: Rc::new(std::mem::take(&mut self.methods)),
        };
        let signal = self.state.borrow_mut().analyzed.signal(&self.decl.fqn);
        signal.complete(analyzed);
    }
}

/// Await each listed ancestor; the first resolved one that declares `name`
/// receives the synthetic edge, the others continue up their own chains until
/// the once-flag is set or the chain runs out.
fn resolve_override(
    state: &Rc<RefCell<OverrideState>>,
    method: &MethodHandle,
    name: &str,
    supers: &[String],
    injected: &Rc<Cell<bool>>,
) {
    for super_fqn in supers {
        let signal = state.borrow_mut().analyzed.signal(super_fqn);
        let state = state.clone();
        let method = method.clone();
        let name = name.to_string();
        let injected = injected.clone();
        signal.when_done(move |ancestor: AnalyzedObject| {
            if injected.get() {
                return;
            }
            if ancestor.methods.contains(&name) {
                injected.set(true);
                debug!(ancestor = %ancestor.fqn, method = %name, "simulating override call");
                method.call(&ancestor.fqn, &name);
            } else {
                resolve_override(&state, &method, &name, &ancestor.supers, &injected);
            }
        });
    }
}

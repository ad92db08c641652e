//! Existence filtering: an edge is only meaningful if its target object was
//! actually analyzed, so every edge waits for the target's close. Edges whose
//! target never closes are dropped silently when the run ends.

use crate::signal::SignalMap;
use crate::sink::{DependencySink, MethodHandle, MethodSink, ObjectDecl, ObjectHandle, ObjectSink};
use std::cell::RefCell;
use std::rc::Rc;

struct ExistenceState {
    next: Box<dyn DependencySink>,
    closed: SignalMap<()>,
}

/// Defers every call/reference until the target FQN has closed at least once.
pub struct ExistenceFilter {
    state: Rc<RefCell<ExistenceState>>,
}

impl ExistenceFilter {
    pub fn new(next: Box<dyn DependencySink>) -> Self {
        Self {
            state: Rc::new(RefCell::new(ExistenceState {
                next,
                closed: SignalMap::new(),
            })),
        }
    }
}

impl DependencySink for ExistenceFilter {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle {
        let inner = self.state.borrow_mut().next.open_object(decl);
        ObjectHandle::new(ExistenceObject {
            state: self.state.clone(),
            fqn: decl.fqn.clone(),
            inner,
        })
    }

    fn close(&mut self) {
        self.state.borrow_mut().next.close();
    }
}

struct ExistenceObject {
    state: Rc<RefCell<ExistenceState>>,
    fqn: String,
    inner: ObjectHandle,
}

impl ObjectSink for ExistenceObject {
    fn open_method(&mut self, name: &str, local: bool) -> MethodHandle {
        MethodHandle::new(ExistenceMethod {
            state: self.state.clone(),
            inner: self.inner.open_method(name, local),
        })
    }

    fn field(&mut self, name: &str) {
        self.inner.field(name);
    }

    fn close(&mut self) {
        self.inner.close();
        // First close satisfies the signal and flushes every deferred edge
        // targeting this FQN; re-opening later never re-fires it.
        let signal = self.state.borrow_mut().closed.signal(&self.fqn);
        signal.complete(());
    }
}

struct ExistenceMethod {
    state: Rc<RefCell<ExistenceState>>,
    inner: MethodHandle,
}

impl MethodSink for ExistenceMethod {
    fn call(&mut self, target_fqn: &str, method_name: &str) {
        let signal = self.state.borrow_mut().closed.signal(target_fqn);
        let inner = self.inner.clone();
        let target_fqn = target_fqn.to_string();
        let method_name = method_name.to_string();
        signal.when_done(move |_| inner.call(&target_fqn, &method_name));
    }

    fn reference(&mut self, target_fqn: &str, field_name: &str) {
        let signal = self.state.borrow_mut().closed.signal(target_fqn);
        let inner = self.inner.clone();
        let target_fqn = target_fqn.to_string();
        let field_name = field_name.to_string();
        signal.when_done(move |_| inner.reference(&target_fqn, &field_name));
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

//! Private-method merging: a private method is invisible to external callers,
//! so its edges are inlined into every visible method of the same object that
//! (transitively) calls it. Resolved per object at close time, when the full
//! member set is known.

use crate::sink::{DependencySink, MethodHandle, MethodSink, ObjectDecl, ObjectHandle, ObjectSink};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Clone)]
enum PrivateEvent {
    Call { fqn: String, name: String },
    Reference { fqn: String, name: String },
}

#[derive(Default)]
struct PrivateTables {
    /// Method names in first-seen order; overloads share one entry.
    order: Vec<String>,
    events: HashMap<String, Rc<RefCell<Vec<PrivateEvent>>>>,
    local_methods: HashSet<String>,
}

/// Buffers each object's methods until close, then forwards only the
/// non-local ones with their private callees inlined depth-first.
pub struct PrivateMethodMerge {
    next: Box<dyn DependencySink>,
}

impl PrivateMethodMerge {
    pub fn new(next: Box<dyn DependencySink>) -> Self {
        Self { next }
    }
}

impl DependencySink for PrivateMethodMerge {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle {
        ObjectHandle::new(PrivateObject {
            fqn: decl.fqn.clone(),
            inner: self.next.open_object(decl),
            tables: Rc::new(RefCell::new(PrivateTables::default())),
        })
    }

    fn close(&mut self) {
        self.next.close();
    }
}

struct PrivateObject {
    fqn: String,
    inner: ObjectHandle,
    tables: Rc<RefCell<PrivateTables>>,
}

impl ObjectSink for PrivateObject {
    fn open_method(&mut self, name: &str, local: bool) -> MethodHandle {
        let mut tables = self.tables.borrow_mut();
        if local {
            tables.local_methods.insert(name.to_string());
        }
        if !tables.events.contains_key(name) {
            tables.order.push(name.to_string());
        }
        let events = tables.events.entry(name.to_string()).or_default().clone();
        MethodHandle::new(PrivateMethod { events })
    }

    fn field(&mut self, name: &str) {
        self.inner.field(name);
    }

    fn close(&mut self) {
        let tables = self.tables.borrow();
        for name in &tables.order {
            if tables.local_methods.contains(name) {
                continue;
            }
            let out = self.inner.open_method(name, false);
            inline_events(&self.fqn, &tables, name, &out);
            out.close();
        }
        self.inner.close();
    }
}

/// Forward `name`'s events in order, splicing a callee's own events at the
/// call site when the callee is a local method of the same object. Iterative
/// depth-first with a visited guard; private-call chains are assumed acyclic,
/// the guard only hardens against bad input.
fn inline_events(fqn: &str, tables: &PrivateTables, name: &str, out: &MethodHandle) {
    let Some(events) = tables.events.get(name) else {
        return;
    };
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<std::vec::IntoIter<PrivateEvent>> =
        vec![events.borrow().clone().into_iter()];
    while let Some(current) = stack.last_mut() {
        let Some(event) = current.next() else {
            stack.pop();
            continue;
        };
        match event {
            PrivateEvent::Call {
                fqn: target,
                name: callee,
            } => {
                if target == fqn && tables.local_methods.contains(&callee) {
                    if visited.insert(callee.clone())
                        && let Some(callee_events) = tables.events.get(&callee)
                    {
                        stack.push(callee_events.borrow().clone().into_iter());
                    }
                } else {
                    // Same-object calls to non-local methods stay addressable.
                    out.call(&target, &callee);
                }
            }
            PrivateEvent::Reference {
                fqn: target,
                name: field,
            } => {
                out.reference(&target, &field);
            }
        }
    }
}

struct PrivateMethod {
    events: Rc<RefCell<Vec<PrivateEvent>>>,
}

impl MethodSink for PrivateMethod {
    fn call(&mut self, target_fqn: &str, method_name: &str) {
        self.events.borrow_mut().push(PrivateEvent::Call {
            fqn: target_fqn.to_string(),
            name: method_name.to_string(),
        });
    }

    fn reference(&mut self, target_fqn: &str, field_name: &str) {
        self.events.borrow_mut().push(PrivateEvent::Reference {
            fqn: target_fqn.to_string(),
            name: field_name.to_string(),
        });
    }

    fn close(&mut self) {}
}

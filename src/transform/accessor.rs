//! Synthetic-accessor merging: compiler-generated `access$...` bridge methods
//! must never appear as nodes, so their edges are spliced into every
//! (transitive) caller. A caller is only forwarded downstream once every
//! accessor it calls has resolved; accessors that never resolve silently take
//! their callers' methods with them.

use crate::signal::SignalMap;
use crate::sink::{DependencySink, MethodHandle, MethodSink, ObjectDecl, ObjectHandle, ObjectSink};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Compiler-synthesized accessor method name prefix.
const ACCESSOR_PREFIX: &str = "access$";

fn is_accessor(method_name: &str) -> bool {
    method_name.starts_with(ACCESSOR_PREFIX)
}

fn accessor_key(fqn: &str, method_name: &str) -> String {
    format!("{fqn}.{method_name}")
}

#[derive(Clone)]
enum AccessorEdge {
    Call { fqn: String, name: String },
    Reference { fqn: String, name: String },
}

struct AccessorState {
    next: Box<dyn DependencySink>,
    /// Accessor key → that accessor's fully resolved edge list.
    resolved: SignalMap<Rc<Vec<AccessorEdge>>>,
}

pub struct AccessorMerge {
    state: Rc<RefCell<AccessorState>>,
}

impl AccessorMerge {
    pub fn new(next: Box<dyn DependencySink>) -> Self {
        Self {
            state: Rc::new(RefCell::new(AccessorState {
                next,
                resolved: SignalMap::new(),
            })),
        }
    }
}

impl DependencySink for AccessorMerge {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle {
        let inner = self.state.borrow_mut().next.open_object(decl);
        ObjectHandle::new(AccessorObject {
            state: self.state.clone(),
            fqn: decl.fqn.clone(),
            inner,
        })
    }

    fn close(&mut self) {
        self.state.borrow_mut().next.close();
    }
}

struct AccessorObject {
    state: Rc<RefCell<AccessorState>>,
    fqn: String,
    inner: ObjectHandle,
}

impl ObjectSink for AccessorObject {
    fn open_method(&mut self, name: &str, local: bool) -> MethodHandle {
        let output = if is_accessor(name) {
            Output::Accessor {
                key: accessor_key(&self.fqn, name),
            }
        } else {
            Output::Forward {
                object: self.inner.clone(),
                name: name.to_string(),
                local,
            }
        };
        MethodHandle::new(AccessorMethod {
            state: self.state.clone(),
            buf: Rc::new(RefCell::new(MethodBuf {
                edges: Vec::new(),
                pending: 0,
                closed: false,
                done: false,
                output,
            })),
        })
    }

    fn field(&mut self, name: &str) {
        self.inner.field(name);
    }

    fn close(&mut self) {
        // Methods still waiting on accessors flush later through their own
        // retained handle; the object itself closes now.
        self.inner.close();
    }
}

/// Where a method's resolved edges go: accessors complete their signal,
/// everything else opens a real downstream method.
#[derive(Clone)]
enum Output {
    Accessor {
        key: String,
    },
    Forward {
        object: ObjectHandle,
        name: String,
        local: bool,
    },
}

struct MethodBuf {
    edges: Vec<AccessorEdge>,
    /// Accessor calls registered but not yet resolved.
    pending: usize,
    closed: bool,
    done: bool,
    output: Output,
}

struct AccessorMethod {
    state: Rc<RefCell<AccessorState>>,
    buf: Rc<RefCell<MethodBuf>>,
}

impl MethodSink for AccessorMethod {
    fn call(&mut self, target_fqn: &str, method_name: &str) {
        if is_accessor(method_name) {
            let key = accessor_key(target_fqn, method_name);
            self.buf.borrow_mut().pending += 1;
            let signal = self.state.borrow_mut().resolved.signal(&key);
            let state = self.state.clone();
            let buf = self.buf.clone();
            signal.when_done(move |edges: Rc<Vec<AccessorEdge>>| {
                {
                    let mut buffered = buf.borrow_mut();
                    buffered.edges.extend(edges.iter().cloned());
                    buffered.pending -= 1;
                }
                try_finish(&state, &buf);
            });
        } else {
            self.buf.borrow_mut().edges.push(AccessorEdge::Call {
                fqn: target_fqn.to_string(),
                name: method_name.to_string(),
            });
        }
    }

    fn reference(&mut self, target_fqn: &str, field_name: &str) {
        self.buf.borrow_mut().edges.push(AccessorEdge::Reference {
            fqn: target_fqn.to_string(),
            name: field_name.to_string(),
        });
    }

    fn close(&mut self) {
        self.buf.borrow_mut().closed = true;
        try_finish(&self.state, &self.buf);
    }
}

/// Finish the method once its body is fully read and every accessor it called
/// has resolved; chains of accessors calling accessors complete through here.
fn try_finish(state: &Rc<RefCell<AccessorState>>, buf: &Rc<RefCell<MethodBuf>>) {
    let edges = {
        let mut buffered = buf.borrow_mut();
        if !buffered.closed || buffered.pending > 0 || buffered.done {
            return;
        }
        buffered.done = true;
        std::mem::take(&mut buffered.edges)
    };
    let output = buf.borrow().output.clone();
    match output {
        Output::Accessor { key } => {
            debug!(accessor = %key, "accessor resolved");
            let signal = state.borrow_mut().resolved.signal(&key);
            signal.complete(Rc::new(edges));
        }
        Output::Forward {
            object,
            name,
            local,
        } => {
            let out = object.open_method(&name, local);
            for edge in &edges {
                match edge {
                    AccessorEdge::Call { fqn, name } => out.call(fqn, name),
                    AccessorEdge::Reference { fqn, name } => out.reference(fqn, name),
                }
            }
            out.close();
        }
    }
}

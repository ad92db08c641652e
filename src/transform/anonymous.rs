//! Anonymous-scope merging: locally-scoped (anonymous) classes are compiler
//! artifacts, so their methods' edges are spliced into whichever visible
//! method constructed them, flattening nested construction transitively.

use crate::sink::{
    CONSTRUCTOR_NAME, DependencySink, MethodHandle, MethodSink, ObjectDecl, ObjectHandle,
    ObjectSink,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// One buffered edge. Constructions are tagged so they can be suppressed and
/// spliced at replay time, when the full set of local objects is known.
#[derive(Clone)]
enum BufferedDep {
    Call { fqn: String, name: String },
    Reference { fqn: String, name: String },
    Construct { fqn: String },
}

struct AnonymousState {
    next: Box<dyn DependencySink>,
    /// Edges of every local object, merged across its methods, keyed by FQN.
    locals: HashMap<String, Rc<RefCell<Vec<BufferedDep>>>>,
    /// Non-local objects buffered whole until shutdown, in arrival order.
    tops: Vec<TopObject>,
}

struct TopObject {
    decl: ObjectDecl,
    body: Rc<RefCell<TopBody>>,
}

#[derive(Default)]
struct TopBody {
    fields: Vec<String>,
    methods: Vec<TopMethod>,
}

struct TopMethod {
    name: String,
    local: bool,
    deps: Rc<RefCell<Vec<BufferedDep>>>,
}

/// Buffers everything: local objects under their FQN, top objects whole. Top
/// objects are replayed downstream only at shutdown, so a local object
/// appearing anywhere later in the stream is still captured and spliced.
pub struct AnonymousMerge {
    state: Rc<RefCell<AnonymousState>>,
}

impl AnonymousMerge {
    pub fn new(next: Box<dyn DependencySink>) -> Self {
        Self {
            state: Rc::new(RefCell::new(AnonymousState {
                next,
                locals: HashMap::new(),
                tops: Vec::new(),
            })),
        }
    }
}

impl DependencySink for AnonymousMerge {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle {
        let mut state = self.state.borrow_mut();
        if decl.local {
            // Re-opening a local FQN keeps appending to the same buffer.
            let deps = state.locals.entry(decl.fqn.clone()).or_default().clone();
            ObjectHandle::new(LocalObject { deps })
        } else {
            let body = Rc::new(RefCell::new(TopBody::default()));
            state.tops.push(TopObject {
                decl: decl.clone(),
                body: body.clone(),
            });
            ObjectHandle::new(BufferedTopObject { body })
        }
    }

    fn close(&mut self) {
        let tops = std::mem::take(&mut self.state.borrow_mut().tops);
        for top in &tops {
            let object = self.state.borrow_mut().next.open_object(&top.decl);
            let body = top.body.borrow();
            for field in &body.fields {
                object.field(field);
            }
            for method in &body.methods {
                let out = object.open_method(&method.name, method.local);
                let deps = method.deps.borrow().clone();
                replay(&self.state, deps, &out);
                out.close();
            }
            object.close();
        }
        self.state.borrow_mut().next.close();
    }
}

/// Replay buffered edges into `out`, splicing local constructions in place.
/// Iterative with an explicit work stack; the visited set guards against
/// construction cycles, which valid compiler output does not produce.
fn replay(state: &Rc<RefCell<AnonymousState>>, deps: Vec<BufferedDep>, out: &MethodHandle) {
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<std::vec::IntoIter<BufferedDep>> = vec![deps.into_iter()];
    while let Some(current) = stack.last_mut() {
        let Some(dep) = current.next() else {
            stack.pop();
            continue;
        };
        match dep {
            BufferedDep::Call { fqn, name } => {
                // Calls on a local object's instance are dropped: its body is
                // merged where it was constructed, not where it is invoked.
                let is_local = state.borrow().locals.contains_key(&fqn);
                if !is_local {
                    out.call(&fqn, &name);
                }
            }
            BufferedDep::Reference { fqn, name } => {
                out.reference(&fqn, &name);
            }
            BufferedDep::Construct { fqn } => {
                let local_deps = state.borrow().locals.get(&fqn).cloned();
                match local_deps {
                    Some(local_deps) => {
                        if visited.insert(fqn) {
                            stack.push(local_deps.borrow().clone().into_iter());
                        }
                    }
                    None => out.call(&fqn, CONSTRUCTOR_NAME),
                }
            }
        }
    }
}

struct LocalObject {
    deps: Rc<RefCell<Vec<BufferedDep>>>,
}

impl ObjectSink for LocalObject {
    fn open_method(&mut self, _name: &str, _local: bool) -> MethodHandle {
        MethodHandle::new(BufferingMethod {
            deps: self.deps.clone(),
        })
    }

    fn field(&mut self, _name: &str) {
        // Local objects carry only captured state; their fields are not nodes.
    }

    fn close(&mut self) {}
}

struct BufferedTopObject {
    body: Rc<RefCell<TopBody>>,
}

impl ObjectSink for BufferedTopObject {
    fn open_method(&mut self, name: &str, local: bool) -> MethodHandle {
        let deps = Rc::new(RefCell::new(Vec::new()));
        self.body.borrow_mut().methods.push(TopMethod {
            name: name.to_string(),
            local,
            deps: deps.clone(),
        });
        MethodHandle::new(BufferingMethod { deps })
    }

    fn field(&mut self, name: &str) {
        self.body.borrow_mut().fields.push(name.to_string());
    }

    fn close(&mut self) {}
}

/// Shared edge buffer; late arrivals (deferred edges flushed by upstream
/// stages after this method closed) still land in the buffer and are replayed.
struct BufferingMethod {
    deps: Rc<RefCell<Vec<BufferedDep>>>,
}

impl MethodSink for BufferingMethod {
    fn call(&mut self, target_fqn: &str, method_name: &str) {
        let dep = if method_name == CONSTRUCTOR_NAME {
            BufferedDep::Construct {
                fqn: target_fqn.to_string(),
            }
        } else {
            BufferedDep::Call {
                fqn: target_fqn.to_string(),
                name: method_name.to_string(),
            }
        };
        self.deps.borrow_mut().push(dep);
    }

    fn reference(&mut self, target_fqn: &str, field_name: &str) {
        self.deps.borrow_mut().push(BufferedDep::Reference {
            fqn: target_fqn.to_string(),
            name: field_name.to_string(),
        });
    }

    fn close(&mut self) {}
}

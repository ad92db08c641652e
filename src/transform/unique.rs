//! Deduplication: at most one forwarded edge per method per distinct target
//! pair. Calls and references dedup independently.

use crate::sink::{DependencySink, MethodHandle, MethodSink, ObjectDecl, ObjectHandle, ObjectSink};
use std::collections::HashSet;

pub struct UniqueEdges {
    next: Box<dyn DependencySink>,
}

impl UniqueEdges {
    pub fn new(next: Box<dyn DependencySink>) -> Self {
        Self { next }
    }
}

impl DependencySink for UniqueEdges {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle {
        ObjectHandle::new(UniqueObject {
            inner: self.next.open_object(decl),
        })
    }

    fn close(&mut self) {
        self.next.close();
    }
}

struct UniqueObject {
    inner: ObjectHandle,
}

impl ObjectSink for UniqueObject {
    fn open_method(&mut self, name: &str, local: bool) -> MethodHandle {
        MethodHandle::new(UniqueMethod {
            inner: self.inner.open_method(name, local),
            calls: HashSet::new(),
            references: HashSet::new(),
        })
    }

    fn field(&mut self, name: &str) {
        self.inner.field(name);
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

struct UniqueMethod {
    inner: MethodHandle,
    calls: HashSet<(String, String)>,
    references: HashSet<(String, String)>,
}

impl MethodSink for UniqueMethod {
    fn call(&mut self, target_fqn: &str, method_name: &str) {
        if self
            .calls
            .insert((target_fqn.to_string(), method_name.to_string()))
        {
            self.inner.call(target_fqn, method_name);
        }
    }

    fn reference(&mut self, target_fqn: &str, field_name: &str) {
        if self
            .references
            .insert((target_fqn.to_string(), field_name.to_string()))
        {
            self.inner.reference(target_fqn, field_name);
        }
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

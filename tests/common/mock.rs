//! Recording sink for integration tests: captures the downstream stream as a
//! flat event list with query helpers.
#![allow(dead_code)]

use classdep::sink::{
    DependencySink, MethodHandle, MethodSink, ObjectDecl, ObjectHandle, ObjectSink,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    OpenObject {
        fqn: String,
        local: bool,
        pure_interface: bool,
        supers: Vec<String>,
    },
    Field {
        object: String,
        name: String,
    },
    OpenMethod {
        object: String,
        name: String,
        local: bool,
    },
    Call {
        object: String,
        method: String,
        target: String,
        member: String,
    },
    Reference {
        object: String,
        method: String,
        target: String,
        member: String,
    },
    CloseMethod {
        object: String,
        name: String,
    },
    CloseObject {
        fqn: String,
    },
    Shutdown,
}

/// Shared view over everything a [`RecordingSink`] observed.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink feeding this recorder; hand it to the stage under test.
    pub fn sink(&self) -> RecordingSink {
        RecordingSink {
            events: self.events.clone(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn opened_objects(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::OpenObject { fqn, .. } => Some(fqn.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn opened_methods(&self, object: &str) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::OpenMethod { object: o, name, .. } if o == object => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// (target, member) pairs of every call recorded for `object.method`.
    pub fn calls_of(&self, object: &str, method: &str) -> Vec<(String, String)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Call {
                    object: o,
                    method: m,
                    target,
                    member,
                } if o == object && m == method => Some((target.clone(), member.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn references_of(&self, object: &str, method: &str) -> Vec<(String, String)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Reference {
                    object: o,
                    method: m,
                    target,
                    member,
                } if o == object && m == method => Some((target.clone(), member.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn has_call(&self, object: &str, method: &str, target: &str, member: &str) -> bool {
        self.call_count(object, method, target, member) > 0
    }

    pub fn call_count(&self, object: &str, method: &str, target: &str, member: &str) -> usize {
        self.calls_of(object, method)
            .iter()
            .filter(|(t, m)| t == target && m == member)
            .count()
    }

    /// Any call anywhere in the stream targeting `member` on `target`.
    pub fn has_call_to(&self, target: &str, member: &str) -> bool {
        self.events.borrow().iter().any(|event| {
            matches!(event, Event::Call { target: t, member: m, .. } if t == target && m == member)
        })
    }

    pub fn fields_of(&self, object: &str) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Field { object: o, name } if o == object => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn shutdown_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| matches!(event, Event::Shutdown))
            .count()
    }
}

pub struct RecordingSink {
    events: Rc<RefCell<Vec<Event>>>,
}

impl DependencySink for RecordingSink {
    fn open_object(&mut self, decl: &ObjectDecl) -> ObjectHandle {
        self.events.borrow_mut().push(Event::OpenObject {
            fqn: decl.fqn.clone(),
            local: decl.local,
            pure_interface: decl.pure_interface,
            supers: decl.supers.clone(),
        });
        ObjectHandle::new(RecordingObject {
            events: self.events.clone(),
            fqn: decl.fqn.clone(),
        })
    }

    fn close(&mut self) {
        self.events.borrow_mut().push(Event::Shutdown);
    }
}

struct RecordingObject {
    events: Rc<RefCell<Vec<Event>>>,
    fqn: String,
}

impl ObjectSink for RecordingObject {
    fn open_method(&mut self, name: &str, local: bool) -> MethodHandle {
        self.events.borrow_mut().push(Event::OpenMethod {
            object: self.fqn.clone(),
            name: name.to_string(),
            local,
        });
        MethodHandle::new(RecordingMethod {
            events: self.events.clone(),
            object: self.fqn.clone(),
            name: name.to_string(),
        })
    }

    fn field(&mut self, name: &str) {
        self.events.borrow_mut().push(Event::Field {
            object: self.fqn.clone(),
            name: name.to_string(),
        });
    }

    fn close(&mut self) {
        self.events.borrow_mut().push(Event::CloseObject {
            fqn: self.fqn.clone(),
        });
    }
}

struct RecordingMethod {
    events: Rc<RefCell<Vec<Event>>>,
    object: String,
    name: String,
}

impl MethodSink for RecordingMethod {
    fn call(&mut self, target_fqn: &str, method_name: &str) {
        self.events.borrow_mut().push(Event::Call {
            object: self.object.clone(),
            method: self.name.clone(),
            target: target_fqn.to_string(),
            member: method_name.to_string(),
        });
    }

    fn reference(&mut self, target_fqn: &str, field_name: &str) {
        self.events.borrow_mut().push(Event::Reference {
            object: self.object.clone(),
            method: self.name.clone(),
            target: target_fqn.to_string(),
            member: field_name.to_string(),
        });
    }

    fn close(&mut self) {
        self.events.borrow_mut().push(Event::CloseMethod {
            object: self.object.clone(),
            name: self.name.clone(),
        });
    }
}

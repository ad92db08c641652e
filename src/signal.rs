//! Per-key completion signals, the single deferred-resolution primitive of the
//! pipeline. A signal is satisfiable at most once; waiters registered before
//! satisfaction fire on the drain, waiters registered after fire immediately.
//! Signals still pending when a stage is dropped are permanently abandoned and
//! their waiters never fire.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

enum SignalState<T> {
    Pending(Vec<Box<dyn FnOnce(T)>>),
    Done(T),
}

/// A single-shot completion signal carrying a clonable value.
pub struct Signal<T> {
    state: Rc<RefCell<SignalState<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SignalState::Pending(Vec::new()))),
        }
    }

    /// Run `waiter` once the signal is satisfied. Fires immediately if it
    /// already is. The waiter runs outside any interior borrow, so it may
    /// register further waiters on this or other signals.
    pub fn when_done(&self, waiter: impl FnOnce(T) + 'static) {
        let done_value = match &*self.state.borrow() {
            SignalState::Done(value) => Some(value.clone()),
            SignalState::Pending(_) => None,
        };
        match done_value {
            Some(value) => waiter(value),
            None => {
                if let SignalState::Pending(waiters) = &mut *self.state.borrow_mut() {
                    waiters.push(Box::new(waiter));
                }
            }
        }
    }

    /// Satisfy the signal and drain all registered waiters. Later calls are
    /// ignored, keeping satisfaction at-most-once.
    pub fn complete(&self, value: T) {
        let waiters = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                SignalState::Done(_) => return,
                SignalState::Pending(waiters) => {
                    let waiters = std::mem::take(waiters);
                    *state = SignalState::Done(value.clone());
                    waiters
                }
            }
        };
        for waiter in waiters {
            waiter(value.clone());
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(&*self.state.borrow(), SignalState::Done(_))
    }
}

impl<T: Clone + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyed table of completion signals, one per FQN or member key, owned by a
/// single pipeline stage.
pub struct SignalMap<T> {
    signals: HashMap<String, Signal<T>>,
}

impl<T: Clone + 'static> SignalMap<T> {
    pub fn new() -> Self {
        Self {
            signals: HashMap::new(),
        }
    }

    /// The signal for `key`, created pending on first use.
    pub fn signal(&mut self, key: &str) -> Signal<T> {
        self.signals
            .entry(key.to_string())
            .or_insert_with(Signal::new)
            .clone()
    }

    /// Whether `key` has a satisfied signal, without creating one.
    pub fn is_done(&self, key: &str) -> bool {
        self.signals.get(key).is_some_and(Signal::is_done)
    }
}

impl<T: Clone + 'static> Default for SignalMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn waiter_before_completion_fires_on_drain() {
        let signal = Signal::new();
        let fired = Rc::new(Cell::new(0));
        let observed = fired.clone();
        signal.when_done(move |v: u32| observed.set(v));
        assert_eq!(fired.get(), 0);
        signal.complete(7);
        assert_eq!(fired.get(), 7);
    }

    #[test]
    fn waiter_after_completion_fires_immediately() {
        let signal = Signal::new();
        signal.complete(3);
        let fired = Rc::new(Cell::new(0));
        let observed = fired.clone();
        signal.when_done(move |v: u32| observed.set(v));
        assert_eq!(fired.get(), 3);
    }

    #[test]
    fn completion_is_at_most_once() {
        let signal = Signal::new();
        let count = Rc::new(Cell::new(0));
        let observed = count.clone();
        signal.when_done(move |_: u32| observed.set(observed.get() + 1));
        signal.complete(1);
        signal.complete(2);
        let observed = count.clone();
        signal.when_done(move |v: u32| {
            assert_eq!(v, 1);
            observed.set(observed.get() + 1);
        });
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn waiter_may_register_another_waiter_during_drain() {
        let signal: Signal<u32> = Signal::new();
        let inner = signal.clone();
        let fired = Rc::new(Cell::new(0));
        let observed = fired.clone();
        signal.when_done(move |_| {
            inner.when_done(move |v| observed.set(v));
        });
        signal.complete(9);
        assert_eq!(fired.get(), 9);
    }

    #[test]
    fn map_hands_out_the_same_signal_per_key() {
        let mut map: SignalMap<()> = SignalMap::new();
        let first = map.signal("a.B");
        map.signal("a.B").complete(());
        assert!(first.is_done());
        assert!(map.is_done("a.B"));
        assert!(!map.is_done("a.C"));
    }
}

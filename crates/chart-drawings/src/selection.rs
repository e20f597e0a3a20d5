// File: crates/chart-drawings/src/selection.rs
// Summary: Single-selection state with change observers.

use crate::types::DrawingId;

type Observer = Box<dyn FnMut(Option<DrawingId>)>;

/// Handle for removing a selection observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObserverId(u64);

/// At most one selected drawing. Observers hear every change, including clears.
#[derive(Default)]
pub struct SelectionController {
    current: Option<DrawingId>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl SelectionController {
    pub fn new() -> Self { Self::default() }

    pub fn current(&self) -> Option<DrawingId> { self.current }

    pub fn is_selected(&self, id: DrawingId) -> bool { self.current == Some(id) }

    pub fn select(&mut self, id: DrawingId) {
        if self.current != Some(id) {
            self.current = Some(id);
            self.notify();
        }
    }

    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            self.notify();
        }
    }

    /// Drop the selection if it points at `id` (the drawing is going away).
    pub fn forget(&mut self, id: DrawingId) {
        if self.current == Some(id) {
            self.clear();
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(Option<DrawingId>) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) {
        self.observers.retain(|(oid, _)| *oid != id);
    }

    fn notify(&mut self) {
        let current = self.current;
        for (_, observer) in self.observers.iter_mut() {
            observer(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn observers_see_changes_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut sel = SelectionController::new();
        let sink = Rc::clone(&seen);
        let handle = sel.subscribe(move |id| sink.borrow_mut().push(id));

        let a = DrawingId::new();
        sel.select(a);
        sel.select(a);
        sel.forget(DrawingId::new());
        sel.clear();
        sel.unsubscribe(handle);
        sel.select(a);

        assert_eq!(*seen.borrow(), vec![Some(a), None]);
        assert_eq!(sel.current(), Some(a));
    }
}

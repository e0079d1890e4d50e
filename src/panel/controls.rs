//! Button state for the Save and Refresh controls.
//!
//! A control is busy while at least one action it brackets is in flight.
//! The guard decrements on drop, so the control reverts on every exit path
//! including early returns and errors.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::render::ControlView;

#[derive(Debug)]
pub struct Control {
    in_flight: AtomicUsize,
    idle_label: &'static str,
    busy_label: &'static str,
}

impl Control {
    pub const fn new(idle_label: &'static str, busy_label: &'static str) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            idle_label,
            busy_label,
        }
    }

    /// Mark the control busy until the returned guard is dropped.
    pub fn begin(&self) -> ControlGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        ControlGuard { control: self }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn view(&self) -> ControlView {
        let busy = self.is_busy();
        ControlView {
            busy,
            label: if busy { self.busy_label } else { self.idle_label },
        }
    }
}

/// RAII guard returned by [`Control::begin`].
pub struct ControlGuard<'a> {
    control: &'a Control,
}

impl Drop for ControlGuard<'_> {
    fn drop(&mut self) {
        self.control.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_reverts_on_drop() {
        let save = Control::new("Save", "Saving…");
        assert_eq!(save.view().label, "Save");
        {
            let _guard = save.begin();
            assert!(save.is_busy());
            assert_eq!(save.view().label, "Saving…");
        }
        assert!(!save.is_busy());
    }

    #[test]
    fn overlapping_actions_keep_control_busy() {
        let refresh = Control::new("Refresh", "Loading…");
        let first = refresh.begin();
        let second = refresh.begin();
        drop(first);
        assert!(refresh.view().busy);
        drop(second);
        assert!(!refresh.view().busy);
    }

    #[test]
    fn guard_reverts_on_error_path() {
        let save = Control::new("Save", "Saving…");
        let attempt = || -> Result<(), &'static str> {
            let _guard = save.begin();
            Err("backend down")
        };
        assert!(attempt().is_err());
        assert!(!save.is_busy());
    }
}

// Listener bookkeeping.
//
// `ListenerRegistry` lives on the surface and plays the part of the native
// addEventListener/removeEventListener table. `ListenerManager` lives in the
// canvas and remembers which handler version is bound to which surface, so a
// re-render either leaves the binding untouched or swaps it wholesale.

use crate::event::{EventKind, Transition};
use crate::surface::{Surface, SurfaceId};
use crate::types::StrokeStyle;
use tracing::debug;

pub type ListenerId = u64;

/// What a bound listener does when its event fires.
/// The style is captured at bind time, like a closure over the current configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handler {
    pub transition: Transition,
    pub version: u64,
    pub style: StrokeStyle,
}

#[derive(Debug)]
struct Listener {
    id: ListenerId,
    kind: EventKind,
    handler: Handler,
}

/// Per-surface listener table.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: ListenerId,
    listeners: Vec<Listener>,
}

impl ListenerRegistry {
    pub fn add(&mut self, kind: EventKind, handler: Handler) -> ListenerId {
        self.next_id += 1;
        let id = self.next_id;
        self.listeners.push(Listener { id, kind, handler });
        id
    }

    /// Remove one listener; unknown ids are ignored.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Handlers registered for `kind`, in registration order.
    pub fn handlers_for(&self, kind: EventKind) -> impl Iterator<Item = &Handler> + '_ {
        self.listeners
            .iter()
            .filter(move |l| l.kind == kind)
            .map(|l| &l.handler)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// The binding currently in force.
#[derive(Debug)]
struct Binding {
    surface: SurfaceId,
    version: u64,
    ids: Vec<ListenerId>,
}

/// Subscription manager: one binding per (handler version, surface) pair.
#[derive(Debug, Default)]
pub struct ListenerManager {
    bound: Option<Binding>,
}

impl ListenerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure handlers of `version` are bound to `surface`, exactly once.
    ///
    /// Returns `true` when listeners were (re)bound. With no surface this only
    /// forgets the stale binding.
    pub fn sync(
        &mut self,
        surface: Option<&mut Surface>,
        version: u64,
        style: StrokeStyle,
    ) -> bool {
        let Some(surface) = surface else {
            self.bound = None;
            return false;
        };

        if let Some(b) = &self.bound {
            if b.surface == surface.id() && b.version == version {
                return false;
            }
        }

        // Unbind and rebind under the same &mut borrow, so no dispatch can land in between.
        self.unbind(Some(&mut *surface));

        let registry = surface.listeners_mut();
        let ids = EventKind::ALL
            .iter()
            .map(|&kind| {
                let handler = Handler { transition: kind.transition(), version, style };
                registry.add(kind, handler)
            })
            .collect::<Vec<_>>();

        debug!(surface = surface.id().0, version, listeners = ids.len(), "listeners bound");
        self.bound = Some(Binding { surface: surface.id(), version, ids });
        true
    }

    /// Remove every listener of the current binding. A missing surface is a no-op.
    pub fn unbind(&mut self, surface: Option<&mut Surface>) {
        let Some(binding) = self.bound.take() else {
            return;
        };
        let Some(surface) = surface else {
            return;
        };
        // A binding made against some other surface died with that surface.
        if binding.surface != surface.id() {
            return;
        }

        let registry = surface.listeners_mut();
        let removed = binding.ids.iter().filter(|&&id| registry.remove(id)).count();
        debug!(
            surface = binding.surface.0,
            version = binding.version,
            removed,
            "listeners unbound"
        );
    }

    pub fn bound_version(&self) -> Option<u64> {
        self.bound.as_ref().map(|b| b.version)
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_add_remove() {
        let mut registry = ListenerRegistry::default();
        let handler = Handler {
            transition: Transition::Move,
            version: 0,
            style: StrokeStyle::default(),
        };
        let a = registry.add(EventKind::MouseMove, handler);
        let b = registry.add(EventKind::TouchMove, handler);
        assert_eq!(registry.handlers_for(EventKind::MouseMove).count(), 1);
        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert_eq!(registry.handlers_for(EventKind::MouseMove).count(), 0);
        assert!(registry.remove(b));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sync_is_idempotent_for_same_version() {
        let mut surface = Surface::new(4, 4);
        let mut manager = ListenerManager::new();
        assert!(manager.sync(Some(&mut surface), 1, StrokeStyle::default()));
        for _ in 0..5 {
            assert!(!manager.sync(Some(&mut surface), 1, StrokeStyle::default()));
        }
        assert_eq!(surface.listeners().len(), EventKind::ALL.len());
        for kind in EventKind::ALL {
            assert_eq!(surface.listeners().handlers_for(kind).count(), 1);
        }
    }

    #[test]
    fn test_new_version_replaces_old_handlers() {
        let mut surface = Surface::new(4, 4);
        let mut manager = ListenerManager::new();
        manager.sync(Some(&mut surface), 1, StrokeStyle::default());
        let thin = StrokeStyle::default().with_width(1.0);
        assert!(manager.sync(Some(&mut surface), 2, thin));

        assert_eq!(surface.listeners().len(), EventKind::ALL.len());
        let handler = surface.listeners().handlers_for(EventKind::MouseMove).next().unwrap();
        assert_eq!(handler.version, 2);
        assert_eq!(handler.style.width, 1.0);
        assert_eq!(manager.bound_version(), Some(2));
    }

    #[test]
    fn test_unbind_clears_surface() {
        let mut surface = Surface::new(4, 4);
        let mut manager = ListenerManager::new();
        manager.sync(Some(&mut surface), 1, StrokeStyle::default());
        manager.unbind(Some(&mut surface));
        assert!(surface.listeners().is_empty());
        assert!(!manager.is_bound());
    }

    #[test]
    fn test_missing_surface_is_noop() {
        let mut manager = ListenerManager::new();
        assert!(!manager.sync(None, 1, StrokeStyle::default()));
        manager.unbind(None);
        assert!(!manager.is_bound());
    }

    #[test]
    fn test_foreign_surface_untouched_by_unbind() {
        let mut first = Surface::new(4, 4);
        let mut second = Surface::new(4, 4);
        let mut manager = ListenerManager::new();
        manager.sync(Some(&mut first), 1, StrokeStyle::default());
        manager.unbind(Some(&mut second));
        assert_eq!(first.listeners().len(), EventKind::ALL.len());
    }
}

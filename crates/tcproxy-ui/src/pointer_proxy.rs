//! Multi-pointer to proxy pointer mapping.
//!
//! Host pointers are identified by whatever the host assigns; the proxy wants
//! small sequential ids and positions normalised to the surface. Each first
//! contact gets the next id, moves resend that id with the new position, and
//! release frees it.

use std::rc::Rc;

use tcproxy_core::collections::map::HashMap;
use tcproxy_core::Receiver;
use tcproxy_foundation::{PointerChange, PointerEvent, PointerEventKind, PointerId, Size};

/// Pointer id as the proxy sees it.
pub type ProxyPointerId = u32;

/// Receiver of proxy pointer updates. `add_pointer` doubles as "move".
pub trait PointerTarget {
    fn add_pointer(&self, id: ProxyPointerId, x: f32, y: f32);
    fn remove_pointer(&self, id: ProxyPointerId);
}

/// Read-only access to the current surface size in device pixels.
pub trait SurfaceMetrics {
    fn surface_size(&self) -> Size;
}

#[derive(Debug)]
pub struct PointerProxyMapper {
    active: HashMap<PointerId, ProxyPointerId>,
    next_id: ProxyPointerId,
}

impl PointerProxyMapper {
    pub fn new() -> Self {
        Self {
            active: HashMap::default(),
            next_id: 1,
        }
    }

    pub fn handle_event(
        &mut self,
        event: &PointerEvent,
        target: &dyn PointerTarget,
        metrics: &dyn SurfaceMetrics,
    ) {
        for change in &event.changes {
            if change.changed_to_down() {
                if self.active.contains_key(&change.id) {
                    continue;
                }
                let id = self.next_id;
                self.next_id += 1;
                self.active.insert(change.id, id);
                let (x, y) = normalize(change, metrics);
                target.add_pointer(id, x, y);
            } else if change.changed_to_up() {
                match self.active.remove(&change.id) {
                    Some(id) => target.remove_pointer(id),
                    None => log::warn!("release for untracked pointer {}", change.id),
                }
            } else if change.pressed && event.kind == PointerEventKind::Move {
                if let Some(&id) = self.active.get(&change.id) {
                    let (x, y) = normalize(change, metrics);
                    target.add_pointer(id, x, y);
                }
            }
        }
    }

    pub fn proxy_id(&self, pointer: PointerId) -> Option<ProxyPointerId> {
        self.active.get(&pointer).copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Forgets every tracked pointer. Ids keep counting up.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

impl Default for PointerProxyMapper {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(change: &PointerChange, metrics: &dyn SurfaceMetrics) -> (f32, f32) {
    let size = metrics.surface_size();
    (
        change.position.x / size.width,
        change.position.y / size.height,
    )
}

/// Consumes pointer events until every sender is gone.
pub async fn run_pointer_proxy(
    events: Receiver<PointerEvent>,
    target: Rc<dyn PointerTarget>,
    metrics: Rc<dyn SurfaceMetrics>,
) {
    let mut mapper = PointerProxyMapper::new();
    while let Some(event) = events.recv().await {
        mapper.handle_event(&event, target.as_ref(), metrics.as_ref());
    }
    log::debug!(
        "pointer stream closed with {} pointers down",
        mapper.active_count()
    );
    mapper.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tcproxy_core::{channel, Runtime};
    use tcproxy_foundation::Point;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Add(ProxyPointerId, f32, f32),
        Remove(ProxyPointerId),
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Call>>);

    impl PointerTarget for Recorder {
        fn add_pointer(&self, id: ProxyPointerId, x: f32, y: f32) {
            self.0.borrow_mut().push(Call::Add(id, x, y));
        }

        fn remove_pointer(&self, id: ProxyPointerId) {
            self.0.borrow_mut().push(Call::Remove(id));
        }
    }

    struct Fixed(Size);

    impl SurfaceMetrics for Fixed {
        fn surface_size(&self) -> Size {
            self.0
        }
    }

    const SURFACE: Fixed = Fixed(Size {
        width: 1000.0,
        height: 500.0,
    });

    fn down(id: PointerId, x: f32, y: f32) -> PointerEvent {
        PointerEvent::single(PointerEventKind::Press, PointerChange::down(id, Point::new(x, y)))
    }

    fn moved(id: PointerId, x: f32, y: f32) -> PointerEvent {
        PointerEvent::single(PointerEventKind::Move, PointerChange::moved(id, Point::new(x, y)))
    }

    fn up(id: PointerId) -> PointerEvent {
        PointerEvent::single(PointerEventKind::Release, PointerChange::up(id, Point::ZERO))
    }

    #[test]
    fn ids_are_sequential_and_survive_other_releases() {
        let target = Recorder::default();
        let mut mapper = PointerProxyMapper::new();
        mapper.handle_event(&down(70, 100.0, 50.0), &target, &SURFACE);
        mapper.handle_event(&down(71, 200.0, 100.0), &target, &SURFACE);
        mapper.handle_event(&up(70), &target, &SURFACE);
        mapper.handle_event(&moved(71, 500.0, 250.0), &target, &SURFACE);

        assert_eq!(
            *target.0.borrow(),
            vec![
                Call::Add(1, 0.1, 0.1),
                Call::Add(2, 0.2, 0.2),
                Call::Remove(1),
                Call::Add(2, 0.5, 0.5),
            ]
        );
        assert_eq!(mapper.proxy_id(71), Some(2));
        assert_eq!(mapper.proxy_id(70), None);
    }

    #[test]
    fn duplicate_down_keeps_first_id() {
        let target = Recorder::default();
        let mut mapper = PointerProxyMapper::new();
        mapper.handle_event(&down(5, 0.0, 0.0), &target, &SURFACE);
        mapper.handle_event(&down(5, 10.0, 10.0), &target, &SURFACE);
        assert_eq!(target.0.borrow().len(), 1);
        assert_eq!(mapper.active_count(), 1);
    }

    #[test]
    fn unknown_release_and_move_are_ignored() {
        let target = Recorder::default();
        let mut mapper = PointerProxyMapper::new();
        mapper.handle_event(&up(9), &target, &SURFACE);
        mapper.handle_event(&moved(9, 1.0, 1.0), &target, &SURFACE);
        assert!(target.0.borrow().is_empty());
    }

    #[test]
    fn move_requires_move_event_kind() {
        let target = Recorder::default();
        let mut mapper = PointerProxyMapper::new();
        mapper.handle_event(&down(1, 0.0, 0.0), &target, &SURFACE);
        let other = PointerEvent::single(
            PointerEventKind::Other,
            PointerChange::moved(1, Point::new(10.0, 10.0)),
        );
        mapper.handle_event(&other, &target, &SURFACE);
        assert_eq!(target.0.borrow().len(), 1);
    }

    #[test]
    fn coordinates_are_not_clamped() {
        let target = Recorder::default();
        let mut mapper = PointerProxyMapper::new();
        mapper.handle_event(&down(1, 1500.0, -250.0), &target, &SURFACE);
        assert_eq!(*target.0.borrow(), vec![Call::Add(1, 1.5, -0.5)]);
    }

    #[test]
    fn ids_are_not_reused_after_release() {
        let target = Recorder::default();
        let mut mapper = PointerProxyMapper::new();
        mapper.handle_event(&down(1, 0.0, 0.0), &target, &SURFACE);
        mapper.handle_event(&up(1), &target, &SURFACE);
        mapper.handle_event(&down(1, 0.0, 0.0), &target, &SURFACE);
        assert_eq!(mapper.proxy_id(1), Some(2));
    }

    #[test]
    fn loop_consumes_events_in_order_until_closed() {
        let runtime = Runtime::new();
        let target = Rc::new(Recorder::default());
        let (sender, receiver) = channel();
        runtime.spawn(run_pointer_proxy(
            receiver,
            target.clone(),
            Rc::new(Fixed(Size::new(100.0, 100.0))),
        ));

        sender.send(down(3, 10.0, 20.0)).expect("receiver alive");
        sender.send(moved(3, 30.0, 40.0)).expect("receiver alive");
        runtime.run_until_idle();
        assert_eq!(
            *target.0.borrow(),
            vec![Call::Add(1, 0.1, 0.2), Call::Add(1, 0.3, 0.4)]
        );

        drop(sender);
        runtime.run_until_idle();
        assert_eq!(runtime.task_count(), 0);
    }
}

use super::*;
use crate::Runtime;
use std::cell::RefCell;

#[test]
fn set_ignores_equal_values() {
    let cell = StateCell::new(Some(3));
    assert_eq!(cell.version(), 0);
    assert!(!cell.set(Some(3)));
    assert_eq!(cell.version(), 0);
    assert!(cell.set(None));
    assert_eq!(cell.version(), 1);
    assert_eq!(cell.get(), None);
}

#[test]
fn replace_always_bumps_version() {
    let cell = StateCell::new(1);
    assert_eq!(cell.replace(1), 1);
    assert_eq!(cell.version(), 1);
}

#[test]
fn changed_since_wakes_observer_once_per_burst() {
    let runtime = Runtime::new();
    let cell = StateCell::new(0u32);
    let observed = Rc::new(RefCell::new(Vec::new()));
    let observed_for_task = Rc::clone(&observed);
    let watched = cell.clone();
    runtime.spawn(async move {
        loop {
            let seen = watched.version();
            watched.changed_since(seen).await;
            observed_for_task.borrow_mut().push(watched.get());
        }
    });
    runtime.run_until_idle();
    assert!(observed.borrow().is_empty());

    cell.set(1);
    cell.set(2);
    runtime.run_until_idle();
    assert_eq!(*observed.borrow(), vec![2]);
}

#[test]
fn collect_latest2_emits_initial_pair_then_every_change() {
    let runtime = Runtime::new();
    let left = StateCell::new(None::<i32>);
    let right = StateCell::new(None::<i32>);
    let pairs = Rc::new(RefCell::new(Vec::new()));
    let pairs_for_task = Rc::clone(&pairs);
    let task = runtime.spawn(collect_latest2(left.clone(), right.clone(), move |a, b| {
        pairs_for_task.borrow_mut().push((a, b));
    }));

    runtime.run_until_idle();
    left.set(Some(1));
    runtime.run_until_idle();
    right.set(Some(2));
    runtime.run_until_idle();
    assert_eq!(
        *pairs.borrow(),
        vec![(None, None), (Some(1), None), (Some(1), Some(2))]
    );

    task.cancel();
    left.set(Some(5));
    runtime.run_until_idle();
    assert_eq!(pairs.borrow().len(), 3);
}

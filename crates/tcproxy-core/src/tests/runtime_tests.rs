use super::*;
use crate::channel;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn spawned_task_runs_to_completion_on_drain() {
    let runtime = Runtime::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let log_for_task = Rc::clone(&log);
    runtime.spawn(async move {
        log_for_task.borrow_mut().push("ran");
    });

    assert!(log.borrow().is_empty(), "tasks only run when drained");
    assert!(runtime.run_until_idle());
    assert_eq!(*log.borrow(), vec!["ran"]);
    assert_eq!(runtime.task_count(), 0);
}

#[test]
fn parked_task_resumes_when_woken_by_channel() {
    let runtime = Runtime::new();
    let (tx, rx) = channel::<u32>();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_for_task = Rc::clone(&seen);
    runtime.spawn(async move {
        while let Some(value) = rx.recv().await {
            seen_for_task.borrow_mut().push(value);
        }
    });

    runtime.run_until_idle();
    assert_eq!(runtime.task_count(), 1);

    tx.send(1).unwrap();
    tx.send(2).unwrap();
    assert!(!runtime.is_idle());
    runtime.run_until_idle();
    assert_eq!(*seen.borrow(), vec![1, 2]);

    drop(tx);
    runtime.run_until_idle();
    assert_eq!(runtime.task_count(), 0);
}

#[test]
fn cancelled_task_is_dropped_and_never_resumes() {
    struct DropFlag(Rc<RefCell<bool>>);
    impl Drop for DropFlag {
        fn drop(&mut self) {
            *self.0.borrow_mut() = true;
        }
    }

    let runtime = Runtime::new();
    let (tx, rx) = channel::<u32>();
    let dropped = Rc::new(RefCell::new(false));
    let received = Rc::new(RefCell::new(0));
    let flag = DropFlag(Rc::clone(&dropped));
    let received_for_task = Rc::clone(&received);
    let handle = runtime.spawn(async move {
        let _flag = flag;
        while rx.recv().await.is_some() {
            *received_for_task.borrow_mut() += 1;
        }
    });
    runtime.run_until_idle();

    handle.cancel();
    assert!(*dropped.borrow());
    assert!(tx.send(7).is_err(), "receiver went away with the task");
    runtime.run_until_idle();
    assert_eq!(*received.borrow(), 0);
    assert_eq!(runtime.task_count(), 0);
}

#[test]
fn task_can_cancel_a_sibling_mid_pass() {
    let runtime = Runtime::new();
    let ran = Rc::new(RefCell::new(Vec::new()));

    let (tx, rx) = channel::<()>();
    let ran_second = Rc::clone(&ran);
    let victim = runtime.spawn(async move {
        while rx.recv().await.is_some() {
            ran_second.borrow_mut().push("victim");
        }
    });
    runtime.run_until_idle();

    let victim_slot = Rc::new(RefCell::new(Some(victim)));
    let slot_for_task = Rc::clone(&victim_slot);
    let ran_first = Rc::clone(&ran);
    runtime.spawn(async move {
        ran_first.borrow_mut().push("killer");
        if let Some(victim) = slot_for_task.borrow_mut().take() {
            victim.cancel();
        }
    });
    tx.send(()).ok();
    runtime.run_until_idle();

    assert!(ran.borrow().contains(&"killer"));
    assert_eq!(runtime.task_count(), 0);
}

#[test]
fn handle_spawn_fails_after_runtime_dropped() {
    let runtime = Runtime::new();
    let handle = runtime.handle();
    assert!(handle.is_alive());
    drop(runtime);
    assert!(!handle.is_alive());
    assert!(handle.spawn(async {}).is_none());
}

use super::*;
use crate::Runtime;
use std::cell::RefCell;

#[test]
fn values_arrive_in_send_order() {
    let (tx, rx) = channel();
    for value in 0..5 {
        tx.send(value).unwrap();
    }
    assert_eq!(rx.len(), 5);
    let drained: Vec<_> = std::iter::from_fn(|| rx.try_recv()).collect();
    assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    assert!(rx.is_empty());
}

#[test]
fn recv_resolves_none_after_last_sender_drops() {
    let runtime = Runtime::new();
    let (tx, rx) = channel::<&'static str>();
    let tx2 = tx.clone();
    let out = Rc::new(RefCell::new(Vec::new()));
    let out_for_task = Rc::clone(&out);
    runtime.spawn(async move {
        loop {
            let next = rx.recv().await;
            let done = next.is_none();
            out_for_task.borrow_mut().push(next);
            if done {
                break;
            }
        }
    });

    tx.send("a").unwrap();
    drop(tx);
    runtime.run_until_idle();
    assert_eq!(*out.borrow(), vec![Some("a")], "one sender is still alive");

    drop(tx2);
    runtime.run_until_idle();
    assert_eq!(*out.borrow(), vec![Some("a"), None]);
}

#[test]
fn send_fails_once_receiver_is_gone() {
    let (tx, rx) = channel::<u8>();
    assert!(!tx.is_closed());
    drop(rx);
    assert!(tx.is_closed());
    assert_eq!(tx.send(3), Err(3));
}

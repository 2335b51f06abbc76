//! A compare-and-set spinlock with bounded retry: mutual exclusion must hold on every explored
//! interleaving, and the checker must exercise both lock-acquisition orders.

use {
    std::{cell::RefCell, collections::BTreeSet, rc::Rc},
    weft::Fiber,
    weft_checker::{Checker, ScheduleStep},
    weft_core::{Op, Pid},
};

#[test]
fn mutual_exclusion_holds_in_every_interleaving() {
    let winners = Rc::new(RefCell::new(BTreeSet::new()));
    let mut checker = Checker::new(|cfg| {
        let lock = cfg.make(0);
        let in_crit = cfg.make(0);
        for _ in 0..2 {
            let lock = lock.clone();
            let in_crit = in_crit.clone();
            cfg.spawn(Fiber::new(move |sdk| {
                for _ in 0..2 {
                    if sdk.compare_and_set(&lock, 0, 1) {
                        sdk.incr(&in_crit);
                        sdk.decr(&in_crit);
                        sdk.set(&lock, 0);
                        break;
                    }
                }
            }));
        }
        let in_crit = in_crit.clone();
        cfg.every(move |probe| probe.check(|| in_crit.get() <= 1));
    })
    .visitor({
        let winners = Rc::clone(&winners);
        move |schedule: &[ScheduleStep], complete: bool| {
            if complete {
                // The first compare_and_swap in a schedule always wins the free lock.
                let first_cas = schedule
                    .iter()
                    .find(|step| step.op == Op::CompareAndSwap)
                    .unwrap();
                winners.borrow_mut().insert(first_cas.pid);
            }
        }
    });
    checker.assert_ok();

    assert_eq!(
        *winners.borrow(),
        BTreeSet::from([Pid::from(0), Pid::from(1)]),
    );
}

#[test]
fn finds_the_race_when_locking_is_removed() {
    let mut checker = Checker::new(|cfg| {
        let in_crit = cfg.make(0);
        for _ in 0..2 {
            let in_crit = in_crit.clone();
            cfg.spawn(Fiber::new(move |sdk| {
                sdk.incr(&in_crit);
                sdk.decr(&in_crit);
            }));
        }
        let in_crit = in_crit.clone();
        cfg.every(move |probe| probe.check(|| in_crit.get() <= 1));
    });
    let (run, schedule) = checker.assert_violation();
    assert_eq!(run, 11);
    assert_eq!(
        schedule.last().unwrap().to_string(),
        "Process 1: fetch_and_add 1",
    );
}

//! A counter shared by two incrementing processes: the checker must explore both orders of the
//! racing `fetch_and_add` operations, and the final value is 2 on every complete run.

use {
    std::{cell::RefCell, rc::Rc},
    weft::Fiber,
    weft_checker::{assert_schedules, Checker, ScheduleRecordingVisitor},
};

#[test]
fn explores_both_orders_of_racing_increments() {
    let (record, replay) = ScheduleRecordingVisitor::new_with_replay();
    let complete_runs = Rc::new(RefCell::new(Vec::new()));
    let mut checker = Checker::new({
        let complete_runs = Rc::clone(&complete_runs);
        move |cfg| {
            let counter = cfg.make(0);
            for _ in 0..2 {
                let counter = counter.clone();
                cfg.spawn(Fiber::new(move |sdk| {
                    sdk.incr(&counter);
                }));
            }
            let counter = counter.clone();
            let complete_runs = Rc::clone(&complete_runs);
            cfg.finally(move |probe| {
                probe.check(|| counter.get() == 2);
                complete_runs.borrow_mut().push(probe.run());
            });
        }
    })
    .visitor(record);
    checker.assert_ok();

    assert_schedules![
        replay(),
        ["Process 0: start"],
        ["Process 0: start", "Process 0: fetch_and_add 1"],
        [
            "Process 0: start",
            "Process 0: fetch_and_add 1",
            "Process 1: start",
        ],
        [
            "Process 0: start",
            "Process 0: fetch_and_add 1",
            "Process 1: start",
            "Process 1: fetch_and_add 1",
        ],
        ["Process 0: start", "Process 1: start"],
        [
            "Process 0: start",
            "Process 1: start",
            "Process 0: fetch_and_add 1",
        ],
        [
            "Process 0: start",
            "Process 1: start",
            "Process 0: fetch_and_add 1",
            "Process 1: fetch_and_add 1",
        ],
        [
            "Process 0: start",
            "Process 1: start",
            "Process 1: fetch_and_add 1",
        ],
        [
            "Process 0: start",
            "Process 1: start",
            "Process 1: fetch_and_add 1",
            "Process 0: fetch_and_add 1",
        ],
    ];
    // The run counter names complete runs by their position in the exploration.
    assert_eq!(*complete_runs.borrow(), vec![4, 7, 9]);
}

#[test]
fn disjoint_cells_do_not_branch() {
    let (record, replay) = ScheduleRecordingVisitor::new_with_replay();
    let mut checker = Checker::new(|cfg| {
        for _ in 0..2 {
            cfg.spawn(Fiber::new(|sdk| {
                let own = sdk.make(0);
                sdk.get(&own);
            }));
        }
    })
    .visitor(record);
    checker.assert_ok();

    // Each process touches only its own cell, so a single maximal interleaving suffices; the
    // remaining runs are the prefixes the search extends one step at a time.
    assert_schedules![
        replay(),
        ["Process 0: start"],
        ["Process 0: start", "Process 0: make"],
        ["Process 0: start", "Process 0: make", "Process 0: get 1"],
        [
            "Process 0: start",
            "Process 0: make",
            "Process 0: get 1",
            "Process 1: start",
        ],
        [
            "Process 0: start",
            "Process 0: make",
            "Process 0: get 1",
            "Process 1: start",
            "Process 1: make",
        ],
        [
            "Process 0: start",
            "Process 0: make",
            "Process 0: get 1",
            "Process 1: start",
            "Process 1: make",
            "Process 1: get 2",
        ],
    ];
}

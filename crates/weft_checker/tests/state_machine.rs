//! A process can be an explicit state machine instead of a fiber: anything implementing the
//! resumable-step interface is schedulable, and an equivalent state machine must explore
//! exactly the same schedules as the fiber it mirrors.

use {
    weft::Fiber,
    weft_checker::{Checker, ScheduleRecordingVisitor},
    weft_core::{Atom, Command, Event},
};

fn incr_machine(counter: Atom) -> impl FnMut(Event) -> Command {
    move |event| match event {
        Event::SpawnOk(_) => Command::FetchAndAdd(counter.clone(), 1),
        Event::FetchAndAddOk(_) => Command::Exit,
        _ => unreachable!(),
    }
}

#[test]
fn state_machines_explore_like_the_equivalent_fibers() {
    let (record_machines, replay_machines) = ScheduleRecordingVisitor::new_with_replay();
    let mut machines = Checker::new(|cfg| {
        let counter = cfg.make(0);
        for _ in 0..2 {
            cfg.spawn(incr_machine(counter.clone()));
        }
    })
    .visitor(record_machines);
    machines.assert_ok();

    let (record_fibers, replay_fibers) = ScheduleRecordingVisitor::new_with_replay();
    let mut fibers = Checker::new(|cfg| {
        let counter = cfg.make(0);
        for _ in 0..2 {
            let counter = counter.clone();
            cfg.spawn(Fiber::new(move |sdk| {
                sdk.incr(&counter);
            }));
        }
    })
    .visitor(record_fibers);
    fibers.assert_ok();

    assert_eq!(replay_machines(), replay_fibers());
}

//! A fiber holds a scoped resource across its suspensions. Most runs end with the fiber
//! suspended mid-schedule, so the end-of-run discontinue must unwind it and release the
//! resource, exactly once per run in which it was acquired.

use {
    weft::Fiber,
    weft_checker::Checker,
    weft_core::{Atom, ObjId},
};

struct Guard {
    alive: Atom,
}

impl Guard {
    fn hold(alive: &Atom, acquired: &Atom) -> Self {
        acquired.incr();
        alive.incr();
        Guard {
            alive: alive.clone(),
        }
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        self.alive.decr();
    }
}

#[test]
fn releases_fiber_held_resources_at_the_end_of_every_run() {
    let alive = Atom::new(ObjId::from(0), 0);
    let acquired = Atom::new(ObjId::from(0), 0);
    let mut checker = Checker::new({
        let alive = alive.clone();
        let acquired = acquired.clone();
        move |cfg| {
            let cell = cfg.make(0);
            cfg.spawn(Fiber::new({
                let alive = alive.clone();
                let acquired = acquired.clone();
                let cell = cell.clone();
                move |sdk| {
                    let _guard = Guard::hold(&alive, &acquired);
                    sdk.get(&cell);
                    sdk.get(&cell);
                }
            }));
            cfg.spawn(Fiber::new({
                let cell = cell.clone();
                move |sdk| {
                    sdk.set(&cell, 5);
                }
            }));
        }
    });
    checker.assert_ok();

    assert!(acquired.get() > 0);
    assert_eq!(alive.get(), 0);
}

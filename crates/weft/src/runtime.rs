use {
    tracing::{debug, info},
    weft_core::{Atom, Command, Event, ObjId, Pid, Step},
};

/// A runtime that runs [`Step`] processes to completion without any interception: each yielded
/// operation is performed directly on the real cell and the process is resumed at once, so the
/// behavior is that of plain sequentially consistent atomics under round-robin scheduling.
///
/// This is the non-checking embedding of the same process bodies that
/// [`weft_checker`](https://docs.rs/weft_checker/) explores exhaustively.
pub struct Runtime {
    next_obj_id: u64,
    processes: Vec<Box<dyn Step>>,
}

impl Runtime {
    pub fn new() -> Self {
        Runtime {
            next_obj_id: 0,
            processes: Vec::new(),
        }
    }

    pub fn spawn(&mut self, behavior: impl Step + 'static) -> Pid {
        let pid = self.processes.len().into();
        self.processes.push(Box::new(behavior));
        pid
    }

    /// Runs every process to completion and returns the process count.
    pub fn run(&mut self) -> usize {
        let count = self.processes.len();
        let mut pending: Vec<Option<Command>> = vec![None; count];
        let mut finished = vec![false; count];
        info!(count, "runtime starting");
        while finished.iter().any(|done| !done) {
            for index in 0..count {
                if finished[index] {
                    continue;
                }
                let pid = Pid::from(index);
                let event = match pending[index].take() {
                    None => Event::SpawnOk(pid),
                    Some(command) => self.perform(command),
                };
                match self.processes[index].step(event) {
                    Command::Exit => {
                        debug!(%pid, "process finished");
                        finished[index] = true;
                    }
                    command => pending[index] = Some(command),
                }
            }
        }
        for process in &mut self.processes {
            process.discontinue();
        }
        info!(count, "runtime finished");
        count
    }

    fn perform(&mut self, command: Command) -> Event {
        match command {
            Command::Make(value) => {
                self.next_obj_id += 1;
                Event::MakeOk(Atom::new(ObjId::from(self.next_obj_id), value))
            }
            Command::Get(atom) => Event::GetOk(atom.get()),
            Command::Set(atom, value) => {
                atom.set(value);
                Event::SetOk
            }
            Command::Exchange(atom, value) => Event::ExchangeOk(atom.exchange(value)),
            Command::CompareAndSwap(atom, seen, new) => {
                Event::CompareAndSwapOk(atom.compare_and_set(seen, new))
            }
            Command::FetchAndAdd(atom, n) => Event::FetchAndAddOk(atom.fetch_and_add(n)),
            _ => unimplemented!(),
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, feature = "fibers"))]
mod test {
    use {super::*, crate::Fiber};

    #[test]
    fn runs_fibers_to_completion() {
        let shared = Atom::new(ObjId::from(0), 0);
        let mut rt = Runtime::new();
        for _ in 0..2 {
            let shared = shared.clone();
            rt.spawn(Fiber::new(move |sdk| {
                sdk.incr(&shared);
            }));
        }
        assert_eq!(rt.run(), 2);
        assert_eq!(shared.get(), 2);
    }

    #[test]
    fn forwards_operation_results_into_the_fiber() {
        let outcome = Atom::new(ObjId::from(0), 0);
        let mut rt = Runtime::new();
        let outcome_ = outcome.clone();
        rt.spawn(Fiber::new(move |sdk| {
            let cell = sdk.make(3);
            assert_eq!(sdk.exchange(&cell, 5), 3);
            assert!(sdk.compare_and_set(&cell, 5, 8));
            assert!(!sdk.compare_and_set(&cell, 5, 9));
            assert_eq!(sdk.fetch_and_add(&cell, 2), 8);
            outcome_.set(sdk.get(&cell));
        }));
        rt.run();
        assert_eq!(outcome.get(), 10);
    }

    #[test]
    fn early_exit_finishes_the_process() {
        let reached = Atom::new(ObjId::from(0), 0);
        let mut rt = Runtime::new();
        let reached_ = reached.clone();
        rt.spawn(Fiber::new(move |sdk| {
            reached_.set(1);
            sdk.exit();
        }));
        assert_eq!(rt.run(), 1);
        assert_eq!(reached.get(), 1);
    }
}

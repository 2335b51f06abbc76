use {
    corosensei::Yielder,
    weft_core::{Atom, Command, Event, Pid},
};

/// The traced atomics façade handed to each fiber body. Every operation suspends the fiber
/// with the matching [`Command`] and unwraps the scheduler's answering [`Event`], so the
/// operation takes effect at its scheduled position rather than at the call site.
pub struct Sdk<'a>(pub(crate) &'a Yielder<Event, Command>, pub(crate) Pid);

impl Sdk<'_> {
    pub fn id(&self) -> Pid {
        self.1
    }

    pub fn make(&self, value: i64) -> Atom {
        match self.0.suspend(Command::Make(value)) {
            Event::MakeOk(atom) => atom,
            _ => unreachable!(),
        }
    }

    pub fn get(&self, atom: &Atom) -> i64 {
        match self.0.suspend(Command::Get(atom.clone())) {
            Event::GetOk(value) => value,
            _ => unreachable!(),
        }
    }

    pub fn set(&self, atom: &Atom, value: i64) {
        let input = self.0.suspend(Command::Set(atom.clone(), value));
        assert!(matches!(input, Event::SetOk));
    }

    pub fn exchange(&self, atom: &Atom, value: i64) -> i64 {
        match self.0.suspend(Command::Exchange(atom.clone(), value)) {
            Event::ExchangeOk(prev) => prev,
            _ => unreachable!(),
        }
    }

    pub fn compare_and_set(&self, atom: &Atom, seen: i64, new: i64) -> bool {
        match self.0.suspend(Command::CompareAndSwap(atom.clone(), seen, new)) {
            Event::CompareAndSwapOk(swapped) => swapped,
            _ => unreachable!(),
        }
    }

    pub fn fetch_and_add(&self, atom: &Atom, n: i64) -> i64 {
        match self.0.suspend(Command::FetchAndAdd(atom.clone(), n)) {
            Event::FetchAndAddOk(prev) => prev,
            _ => unreachable!(),
        }
    }

    pub fn incr(&self, atom: &Atom) {
        self.fetch_and_add(atom, 1);
    }

    pub fn decr(&self, atom: &Atom) {
        self.fetch_and_add(atom, -1);
    }

    pub fn exit(&self) -> ! {
        self.0.suspend(Command::Exit);
        unreachable!();
    }
}

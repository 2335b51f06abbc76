use {
    std::fmt::{self, Display, Formatter},
    weft_core::Pid,
};

/// Per-process record of the last state index at which that process ran. The search records it
/// on every expansion step and the debug dump displays it; it is not consulted for pruning,
/// mirroring the clock of the classical DPOR presentation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Clock(Vec<usize>);

impl Clock {
    pub(crate) fn new() -> Self {
        Clock(Vec::new())
    }

    pub(crate) fn set(&mut self, pid: Pid, time: usize) {
        let index = usize::from(pid);
        if index >= self.0.len() {
            self.0.resize(1 + index, 0);
        }
        self.0[index] = time;
    }
}

impl Display for Clock {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "<")?;
        let mut iter = self.0.iter();
        if let Some(mut next) = iter.next() {
            loop {
                write!(f, "{}", next)?;
                next = match iter.next() {
                    None => break,
                    Some(next) => {
                        write!(f, " ")?;
                        next
                    }
                }
            }
        }
        write!(f, ">")
    }
}

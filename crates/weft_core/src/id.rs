use core::fmt::{Debug, Display, Formatter};
use std::ops::{Index, IndexMut};

/// A dense process id, assigned by insertion order into the process table.
#[derive(Clone, Copy, Default, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Pid(usize);

impl Debug for Pid {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), core::fmt::Error> {
        Display::fmt(self, f)
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<Pid> for usize {
    fn from(pid: Pid) -> Self {
        pid.0
    }
}

impl From<usize> for Pid {
    fn from(n: usize) -> Self {
        Pid(n)
    }
}

impl<T> Index<Pid> for [T] {
    type Output = T;
    fn index(&self, pid: Pid) -> &Self::Output {
        self.index(usize::from(pid))
    }
}

impl<T> IndexMut<Pid> for [T] {
    fn index_mut(&mut self, pid: Pid) -> &mut Self::Output {
        self.index_mut(usize::from(pid))
    }
}

impl<T> Index<Pid> for Vec<T> {
    type Output = T;
    fn index(&self, pid: Pid) -> &Self::Output {
        self.index(usize::from(pid))
    }
}

impl<T> IndexMut<Pid> for Vec<T> {
    fn index_mut(&mut self, pid: Pid) -> &mut Self::Output {
        self.index_mut(usize::from(pid))
    }
}

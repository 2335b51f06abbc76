use {
    core::fmt::{Debug, Display, Formatter},
    std::sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

/// A dense id naming one shared cell within a run. Ids are assigned in schedule order by the
/// owning scheduler and reset between runs, so a replay of the same schedule reproduces them.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ObjId(u64);

impl Debug for ObjId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), core::fmt::Error> {
        Display::fmt(self, f)
    }
}

impl Display for ObjId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<ObjId> for u64 {
    fn from(id: ObjId) -> Self {
        id.0
    }
}

impl From<u64> for ObjId {
    fn from(n: u64) -> Self {
        ObjId(n)
    }
}

/// A handle on one shared atomic cell: the real cell plus the object id the scheduler knows it
/// by. The inherent methods forward directly to the cell with sequentially consistent ordering.
/// Process bodies running under a scheduler must instead go through their `Sdk`, which suspends
/// the fiber so the operation lands at its scheduled position; the direct methods are for hooks
/// and for code running outside any scheduler.
#[derive(Clone)]
pub struct Atom {
    cell: Arc<AtomicI64>,
    id: ObjId,
}

impl Atom {
    /// Ids are handed out by the owning scheduler; cells it did not create are fine as long as
    /// their ids do not collide with scheduled ones.
    pub fn new(id: ObjId, value: i64) -> Self {
        Atom {
            cell: Arc::new(AtomicI64::new(value)),
            id,
        }
    }

    pub fn id(&self) -> ObjId {
        self.id
    }

    pub fn get(&self) -> i64 {
        self.cell.load(Ordering::SeqCst)
    }

    pub fn set(&self, value: i64) {
        self.cell.store(value, Ordering::SeqCst);
    }

    pub fn exchange(&self, value: i64) -> i64 {
        self.cell.swap(value, Ordering::SeqCst)
    }

    pub fn compare_and_set(&self, seen: i64, new: i64) -> bool {
        self.cell
            .compare_exchange(seen, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn fetch_and_add(&self, n: i64) -> i64 {
        self.cell.fetch_add(n, Ordering::SeqCst)
    }

    pub fn incr(&self) {
        self.fetch_and_add(1);
    }

    pub fn decr(&self) {
        self.fetch_and_add(-1);
    }
}

impl Debug for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(f, "Atom({})", self.id)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

use {
    std::fmt::{Display, Formatter},
    weft_core::{ObjId, Op, Pid},
};

/// One step of a schedule: which process runs, the atomic operation it is expected to be
/// blocked on, and the object that operation references (absent for `Start` and `Make`).
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ScheduleStep {
    pub pid: Pid,
    pub op: Op,
    pub obj: Option<ObjId>,
}

impl Display for ScheduleStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "Process {}: {}", self.pid, self.op)?;
        if let Some(obj) = self.obj {
            write!(f, " {obj}")?;
        }
        Ok(())
    }
}

pub(crate) fn print_schedule(schedule: &[ScheduleStep]) {
    for step in schedule {
        println!("{step}");
    }
}

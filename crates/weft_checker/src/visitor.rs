use {
    crate::ScheduleStep,
    std::sync::{Arc, Mutex},
};

/// Observes the checker: called at the end of every run with the schedule that was executed.
/// `complete` is true when every process finished, i.e. the schedule was maximal.
pub trait Visitor {
    fn on_run(&mut self, schedule: &[ScheduleStep], complete: bool);
}

impl<F> Visitor for F
where
    F: FnMut(&[ScheduleStep], bool),
{
    fn on_run(&mut self, schedule: &[ScheduleStep], complete: bool) {
        self(schedule, complete);
    }
}

/// Records every executed schedule so tests can replay and count them.
pub struct ScheduleRecordingVisitor(Arc<Mutex<Vec<Vec<ScheduleStep>>>>);

impl ScheduleRecordingVisitor {
    pub fn new_with_replay() -> (Self, impl Fn() -> Vec<Vec<ScheduleStep>>) {
        let visitor = ScheduleRecordingVisitor(Arc::new(Mutex::new(Vec::new())));
        let schedules = Arc::clone(&visitor.0);
        let replay = move || schedules.lock().unwrap().clone();
        (visitor, replay)
    }
}

impl Visitor for ScheduleRecordingVisitor {
    fn on_run(&mut self, schedule: &[ScheduleStep], _complete: bool) {
        self.0.lock().unwrap().push(schedule.to_vec());
    }
}

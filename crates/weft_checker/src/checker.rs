use {
    crate::{clock::Clock, schedule::print_schedule, ScheduleStep, Visitor},
    colorful::Colorful,
    std::{
        collections::{BTreeMap, BTreeSet},
        panic::{catch_unwind, panic_any, resume_unwind, AssertUnwindSafe},
    },
    weft_core::{Atom, Command, Event, ObjId, Op, Pid, Step},
};

struct Process {
    behavior: Box<dyn Step>,
    finished: bool,
    obj: Option<ObjId>,
    op: Op,
    pending: Option<Command>,
}

/// Metadata about one executed schedule prefix: the step that produced it, every process's
/// pending operation at that point, which processes are still unfinished, and which of those
/// the search still has to run from here.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StateCell {
    pub(crate) backtrack: BTreeSet<Pid>,
    pub(crate) enabled: BTreeSet<Pid>,
    pub(crate) procs: Vec<(Op, Option<ObjId>)>,
    pub(crate) run: ScheduleStep,
}

/// Panic payload for a failed [`Probe::check`]. Distinguishes a verdict from a malfunction so
/// the checker does not waste a verbose replay on it.
struct CheckFailed {
    run: u64,
    schedule: Vec<ScheduleStep>,
}

#[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
pub enum RunResult {
    Complete { runs: u64 },
    Panic { message: String, schedule: Vec<ScheduleStep> },
    Violation { run: u64, schedule: Vec<ScheduleStep> },
}

/// Collects the processes, cells, and hooks of one run. The checker re-invokes the config
/// closure at the start of every run, which is what makes replays recreate all atomics
/// deterministically.
pub struct CheckerConfig {
    atoms_made: u64,
    behaviors: Vec<Box<dyn Step>>,
    #[allow(clippy::type_complexity)]
    every_hooks: Vec<Box<dyn FnMut(&Probe<'_>)>>,
    #[allow(clippy::type_complexity)]
    final_hooks: Vec<Box<dyn FnMut(&Probe<'_>)>>,
}

impl CheckerConfig {
    fn new(cfg_fn: &impl Fn(&mut CheckerConfig)) -> Self {
        let mut cfg = CheckerConfig {
            atoms_made: 0,
            behaviors: Vec::new(),
            every_hooks: Vec::new(),
            final_hooks: Vec::new(),
        };
        cfg_fn(&mut cfg);
        cfg
    }

    pub fn spawn(&mut self, behavior: impl Step + 'static) -> Pid {
        let pid = self.behaviors.len().into();
        self.behaviors.push(Box::new(behavior));
        pid
    }

    /// Creates a cell during init, outside any process. Scheduled `Make` operations continue
    /// the same id sequence, so ids are identical on every replay of a schedule.
    pub fn make(&mut self, value: i64) -> Atom {
        self.atoms_made += 1;
        Atom::new(ObjId::from(self.atoms_made), value)
    }

    /// Installs a hook invoked between schedule steps.
    pub fn every(&mut self, hook: impl FnMut(&Probe<'_>) + 'static) {
        self.every_hooks.push(Box::new(hook));
    }

    /// Installs a hook invoked at the end of each run on which every process finished.
    /// (`final` is reserved in Rust.)
    pub fn finally(&mut self, hook: impl FnMut(&Probe<'_>) + 'static) {
        self.final_hooks.push(Box::new(hook));
    }
}

/// Handed to `every`/`finally` hooks. Hooks hold no `Sdk`, so their cell reads go directly to
/// the real cells and are never intercepted or recorded as schedule steps; hooks observe, they
/// do not participate.
pub struct Probe<'a> {
    run: u64,
    schedule: &'a [ScheduleStep],
}

impl Probe<'_> {
    pub fn run(&self) -> u64 {
        self.run
    }

    /// Evaluates an invariant. On `false` the offending schedule is printed and the whole
    /// checker run aborts.
    pub fn check(&self, pred: impl FnOnce() -> bool) {
        if pred() {
            return;
        }
        println!("Found assertion violation at run {}:", self.run);
        print_schedule(self.schedule);
        panic_any(CheckFailed {
            run: self.run,
            schedule: self.schedule.to_vec(),
        });
    }
}

/// A checker that explores every meaningfully distinct interleaving of the atomic operations
/// performed by a set of cooperating processes.
///
/// # Purpose
///
/// A conventional runtime executes one schedule of atomic operations. If processes
/// _p<sub>A</sub>_ and _p<sub>B</sub>_ both `fetch_and_add` a shared counter, a typical run
/// exercises one order of the two additions; this checker exercises both, and invokes the
/// user's invariant hooks along every explored schedule. Any assertion that holds during
/// checking therefore holds under every possible cooperative interleaving.
///
/// # Internal Implementation Details
///
/// ```text
/// You can safely ignore this section if you only want to use the library. It is only
/// included as documentation for library contributors.
/// ```
///
/// The search is the classic depth-first dynamic partial-order reduction of _[Dynamic
/// Partial-Order Reduction for Model Checking Software](https://doi.org/10.1145/1040305.1040315)_
/// in its conservative last-access form:
///
/// 1. Every run replays a schedule prefix from scratch: the config closure recreates the
///    processes and cells, then each step resumes the named fiber, which runs until its next
///    atomic operation and suspends, handing the scheduler that operation as a [`Command`].
/// 2. Each executed prefix leaves behind a state cell recording every process's pending
///    operation and the set of unfinished processes.
/// 3. When a pending operation targets an object that an earlier step touched, the state
///    before that step must also try running the pending operation's process: it is added to
///    that state's backtrack set (or, if it was not runnable there, the whole enabled set is).
/// 4. Expansion from the newest state seeds its backtrack set with the least enabled process
///    and keeps extending the schedule by one step per backtracked process until the
///    backtrack set is exhausted, recursing after each extension.
///
/// A run ends when its schedule is exhausted; a schedule on which every process finished is
/// maximal and simply unwinds the recursion.
pub struct Checker {
    #[allow(clippy::type_complexity)]
    cfg_fn: Box<dyn Fn(&mut CheckerConfig)>,
    debug: bool,
    finished: usize,
    next_obj_id: u64,
    procs: Vec<Process>,
    runs: u64,
    schedule: Vec<ScheduleStep>,
    verbose: bool,
    visitors: Vec<Box<dyn Visitor>>,
}

impl Checker {
    pub fn new(cfg_fn: impl Fn(&mut CheckerConfig) + 'static) -> Self {
        Checker {
            cfg_fn: Box::new(cfg_fn),
            debug: false,
            finished: 0,
            next_obj_id: 0,
            procs: Vec::new(),
            runs: 0,
            schedule: Vec::new(),
            verbose: false,
            visitors: Vec::new(),
        }
    }

    pub fn visitor(mut self, visitor: impl Visitor + 'static) -> Self {
        self.visitors.push(Box::new(visitor));
        self
    }

    /// Enables a colored dump of every schedule the search is about to run.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn run(&mut self) -> RunResult {
        let initial = vec![ScheduleStep {
            pid: Pid::from(0),
            op: Op::Start,
            obj: None,
        }];
        match catch_unwind(AssertUnwindSafe(|| {
            let mut states = vec![self.do_run(&initial)];
            self.explore(&mut states, &Clock::new(), &BTreeMap::new());
        })) {
            Ok(()) => RunResult::Complete { runs: self.runs },
            Err(panic) => {
                if let Some(check) = panic.downcast_ref::<CheckFailed>() {
                    return RunResult::Violation {
                        run: check.run,
                        schedule: check.schedule.clone(),
                    };
                }
                let message = if let Some(panic) = panic.downcast_ref::<&'static str>() {
                    panic.to_string()
                } else if let Some(panic) = panic.downcast_ref::<String>() {
                    panic.clone()
                } else {
                    "UNKNOWN".to_string()
                };
                RunResult::Panic {
                    message,
                    schedule: self.schedule.clone(),
                }
            }
        }
    }

    pub fn assert_ok(&mut self) {
        match self.run() {
            RunResult::Complete { .. } => (),
            RunResult::Panic { message, schedule } => {
                println!("Schedule reaching panic:");
                let mut i = 1;
                for step in &schedule {
                    println!("\t{i}. {step}");
                    i += 1;
                }
                panic!("Panic {message:?}");
            }
            RunResult::Violation { run, schedule } => {
                println!("Schedule reaching violation:");
                let mut i = 1;
                for step in &schedule {
                    println!("\t{i}. {step}");
                    i += 1;
                }
                panic!("Assertion violation at run {run}");
            }
        }
    }

    pub fn assert_violation(&mut self) -> (u64, Vec<ScheduleStep>) {
        match self.run() {
            RunResult::Complete { .. } => panic!("Done, but expected an assertion violation."),
            RunResult::Panic { message, schedule } => {
                println!("Schedule reaching panic:");
                let mut i = 1;
                for step in &schedule {
                    println!("\t{i}. {step}");
                    i += 1;
                }
                panic!("Panic {message:?}");
            }
            RunResult::Violation { run, schedule } => (run, schedule),
        }
    }

    pub fn assert_panic(&mut self) -> (String, Vec<ScheduleStep>) {
        match self.run() {
            RunResult::Complete { .. } => panic!("Done, but expected a process to panic."),
            RunResult::Panic { message, schedule } => (message, schedule),
            RunResult::Violation { run, schedule } => {
                println!("Schedule reaching violation:");
                let mut i = 1;
                for step in &schedule {
                    println!("\t{i}. {step}");
                    i += 1;
                }
                panic!("Assertion violation at run {run}");
            }
        }
    }

    /// Replays one schedule from a fresh init and harvests the resulting state cell. On the
    /// first user panic the same schedule is replayed once more with per-step logging before
    /// the unwind continues.
    fn do_run(&mut self, schedule: &[ScheduleStep]) -> StateCell {
        match catch_unwind(AssertUnwindSafe(|| self.execute(schedule))) {
            Ok(state) => state,
            Err(panic) => {
                self.teardown();
                if !self.verbose && !panic.is::<CheckFailed>() {
                    self.verbose = true;
                    println!("Schedule: {} length", schedule.len());
                    print_schedule(schedule);
                    let _ = catch_unwind(AssertUnwindSafe(|| self.execute(schedule)));
                    self.teardown();
                }
                resume_unwind(panic)
            }
        }
    }

    fn execute(&mut self, schedule: &[ScheduleStep]) -> StateCell {
        assert!(!schedule.is_empty(), "Schedule is empty.");
        assert_eq!(
            schedule[0],
            ScheduleStep {
                pid: Pid::from(0),
                op: Op::Start,
                obj: None,
            },
            "Schedule must begin with process 0's start step.",
        );

        let mut cfg = CheckerConfig::new(&self.cfg_fn);
        assert!(!cfg.behaviors.is_empty(), "Config spawned no processes.");
        self.procs = cfg
            .behaviors
            .drain(..)
            .map(|behavior| Process {
                behavior,
                finished: false,
                obj: None,
                op: Op::Start,
                pending: None,
            })
            .collect();
        self.next_obj_id = cfg.atoms_made;
        self.finished = 0;
        self.schedule = schedule.to_vec();
        let mut every_hooks = cfg.every_hooks;
        let mut final_hooks = cfg.final_hooks;
        let run = self.runs + 1;

        for step in schedule {
            if self.finished == self.procs.len() {
                print_schedule(schedule);
                panic!("No enabled processes, but schedule names {step}.");
            }
            let proc = &self.procs[step.pid];
            if proc.finished || proc.op != step.op || proc.obj != step.obj {
                print_schedule(schedule);
                panic!(
                    "Schedule step {step} does not match pending operation {} {:?}.",
                    proc.op, proc.obj
                );
            }
            if self.verbose {
                println!("{step}");
            }
            let command = self.procs[step.pid].pending.take();
            let event = self.effect(command, step.pid);
            let outcome =
                catch_unwind(AssertUnwindSafe(|| self.procs[step.pid].behavior.step(event)));
            let command = match outcome {
                Ok(command) => command,
                Err(panic) => {
                    if self.verbose {
                        let message = if let Some(panic) = panic.downcast_ref::<&'static str>() {
                            panic.to_string()
                        } else if let Some(panic) = panic.downcast_ref::<String>() {
                            panic.clone()
                        } else {
                            "UNKNOWN".to_string()
                        };
                        println!("Process {} raised {message:?}", step.pid);
                    }
                    resume_unwind(panic);
                }
            };
            match command {
                Command::Exit => self.finish_process(step.pid),
                command => self.update_process_data(step.pid, command),
            }
            for hook in &mut every_hooks {
                hook(&Probe { run, schedule });
            }
        }
        if self.finished == self.procs.len() {
            for hook in &mut final_hooks {
                hook(&Probe { run, schedule });
            }
        }

        let state = StateCell {
            backtrack: BTreeSet::new(),
            enabled: self
                .procs
                .iter()
                .enumerate()
                .filter(|(_, proc)| !proc.finished)
                .map(|(index, _)| Pid::from(index))
                .collect(),
            procs: self.procs.iter().map(|proc| (proc.op, proc.obj)).collect(),
            run: schedule.last().cloned().unwrap(),
        };
        self.teardown();
        self.runs += 1;
        if self.runs % 100_000 == 0 {
            println!("run: {}", self.runs);
        }
        let complete = state.enabled.is_empty();
        for visitor in &mut self.visitors {
            visitor.on_run(schedule, complete);
        }
        state
    }

    /// Performs the real atomic effect of a pending command and wraps the result in the event
    /// that resumes the fiber. `None` means the process has not started yet.
    fn effect(&mut self, command: Option<Command>, pid: Pid) -> Event {
        match command {
            None => Event::SpawnOk(pid),
            Some(Command::Make(value)) => {
                self.next_obj_id += 1;
                Event::MakeOk(Atom::new(ObjId::from(self.next_obj_id), value))
            }
            Some(Command::Get(atom)) => Event::GetOk(atom.get()),
            Some(Command::Set(atom, value)) => {
                atom.set(value);
                Event::SetOk
            }
            Some(Command::Exchange(atom, value)) => Event::ExchangeOk(atom.exchange(value)),
            Some(Command::CompareAndSwap(atom, seen, new)) => {
                Event::CompareAndSwapOk(atom.compare_and_set(seen, new))
            }
            Some(Command::FetchAndAdd(atom, n)) => Event::FetchAndAddOk(atom.fetch_and_add(n)),
            Some(_) => unimplemented!(),
        }
    }

    fn update_process_data(&mut self, pid: Pid, command: Command) {
        let (op, obj) = match &command {
            Command::Make(_) => (Op::Make, None),
            Command::Get(atom) => (Op::Get, Some(atom.id())),
            Command::Set(atom, _) => (Op::Set, Some(atom.id())),
            Command::Exchange(atom, _) => (Op::Exchange, Some(atom.id())),
            Command::CompareAndSwap(atom, _, _) => (Op::CompareAndSwap, Some(atom.id())),
            Command::FetchAndAdd(atom, _) => (Op::FetchAndAdd, Some(atom.id())),
            _ => unimplemented!(),
        };
        let proc = &mut self.procs[pid];
        proc.op = op;
        proc.obj = obj;
        proc.pending = Some(command);
    }

    fn finish_process(&mut self, pid: Pid) {
        let proc = &mut self.procs[pid];
        proc.finished = true;
        proc.pending = None;
        self.finished += 1;
    }

    fn teardown(&mut self) {
        for proc in &mut self.procs {
            proc.behavior.discontinue();
        }
        self.procs.clear();
        self.next_obj_id = 0;
    }

    fn explore(
        &mut self,
        states: &mut Vec<StateCell>,
        clock: &Clock,
        last_access: &BTreeMap<ObjId, usize>,
    ) {
        let end = states.len() - 1;

        for (index, (_, obj)) in states[end].procs.clone().into_iter().enumerate() {
            let pid = Pid::from(index);
            let ptr = match obj {
                None => continue, // b/c Start and Make reference no object
                Some(ptr) => ptr,
            };
            let i = last_access.get(&ptr).copied().unwrap_or(0);
            if i == 0 {
                continue; // b/c nothing on the path touched the object
            }
            // The step at states[i] raced with this pending operation, so the state it was
            // taken from must also schedule the pending operation's process.
            let pre = &mut states[i - 1];
            if pre.enabled.contains(&pid) {
                pre.backtrack.insert(pid);
            } else {
                let enabled = pre.enabled.clone();
                pre.backtrack.extend(enabled); // b/c not runnable back then
            }
        }

        if states[end].enabled.is_empty() {
            return;
        }
        // The least element makes the search reproducible; any deterministic choice suffices.
        let seed = *states[end].enabled.iter().next().unwrap();
        states[end].backtrack = BTreeSet::from([seed]);
        let mut done = BTreeSet::new();
        loop {
            let j = match states[end].backtrack.difference(&done).next().copied() {
                None => break,
                Some(j) => j,
            };
            done.insert(j);
            let (op, obj) = states[end].procs[j];
            let mut schedule: Vec<ScheduleStep> =
                states.iter().map(|state| state.run.clone()).collect();
            schedule.push(ScheduleStep { pid: j, op, obj });
            if self.debug {
                self.print_debug(&schedule, clock);
            }
            let state = self.do_run(&schedule);
            states.push(state);
            let time = states.len() - 1;
            let mut last_access = last_access.clone();
            if let Some(ptr) = obj {
                last_access.insert(ptr, time);
            }
            let mut clock = clock.clone();
            clock.set(j, time);
            self.explore(states, &clock, &last_access);
            states.pop();
        }
    }

    fn print_debug(&self, schedule: &[ScheduleStep], clock: &Clock) {
        println!("=== run {} clock {clock} ===", self.runs + 1);
        for (k, step) in schedule.iter().enumerate() {
            let line = format!("{k: >3}. {step}");
            if k + 1 == schedule.len() {
                println!("{}", line.color(colorful::Color::Red));
            } else {
                println!("{line}");
            }
        }
    }
}

//! Weft Checker is a model checker for [Weft](https://docs.rs/weft/) programs: it explores
//! every meaningfully distinct interleaving of the atomic operations a set of cooperating
//! processes performs, pruning equivalent interleavings with dynamic partial-order reduction.
//!
//! # Example
//!
//! ```toml
//! [dependencies]
//! weft = "0"
//!
//! [dev-dependencies]
//! weft_checker = "0"
//! ```
//!
//! ```rust
//! use weft::Fiber;
//! use weft_checker::{Checker, RunResult};
//!
//! let mut checker = Checker::new(|cfg| {
//!     let cell = cfg.make(0);
//!     for value in 1..=2 {
//!         let cell = cell.clone();
//!         cfg.spawn(Fiber::new(move |sdk| sdk.set(&cell, value)));
//!     }
//!     let cell = cell.clone();
//!     cfg.finally(move |probe| probe.check(|| cell.get() == 1)); // truth depends on race winner
//! });
//! match checker.run() {
//!     RunResult::Violation { schedule, .. } => {
//!         assert_eq!(schedule.last().unwrap().to_string(), "Process 1: set 1");
//!     }
//!     result => panic!("Unexpected result: {result:?}"),
//! }
//! ```
//!
//! TIP: alternatively use `checker.assert_violation()`, or `checker.assert_ok()` for programs
//! whose invariants are expected to hold on every interleaving.

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod checker;
mod clock;
mod schedule;
mod visitor;

/// Asserts that a recorded list of run schedules matches the given step strings, one bracketed
/// group per run in exploration order.
#[macro_export]
macro_rules! assert_schedules {
    // Case 1: No expected schedules specified.
    [$schedules:expr $(,)?] => {{
        let schedules = &$schedules;
        if !schedules.is_empty() {
            println!("Missing some schedules:");
            for schedule in schedules.iter() {
                let steps: Vec<String> = schedule.iter().map(|step| step.to_string()).collect();
                println!("{steps:?},");
            }
            panic!("^");
        }
    }};
    // Case 2: Expected schedule(s) specified.
    [$schedules:expr, $([$($step:expr),* $(,)?]),+ $(,)?] => {{
        let schedules = &$schedules;
        let expected: Vec<Vec<&str>> = vec![$(vec![$($step),*]),+];
        if schedules.len() > expected.len() {
            println!("Missing some schedules:");
            for schedule in schedules.iter().skip(expected.len()) {
                let steps: Vec<String> = schedule.iter().map(|step| step.to_string()).collect();
                println!("{steps:?},");
            }
            panic!("^");
        }
        assert_eq!(schedules.len(), expected.len(), "fewer runs than expected");
        for (i, (schedule, want)) in schedules.iter().zip(expected.iter()).enumerate() {
            let got: Vec<String> = schedule.iter().map(|step| step.to_string()).collect();
            let want: Vec<String> = want.iter().map(|step| step.to_string()).collect();
            assert_eq!(got, want, "at run [{i}]");
        }
    }};
}

pub use checker::Checker;

pub use checker::CheckerConfig;

pub use checker::Probe;

pub use checker::RunResult;

pub use schedule::ScheduleStep;

pub use visitor::ScheduleRecordingVisitor;

pub use visitor::Visitor;

//! This module specifies the core types for the [Weft](https://docs.rs/weft/) library.
//!
//! # Usage
//!
//! Please see [the `weft_checker` docs](https://docs.rs/weft_checker/).
//!
//! # Features
//!
//! - `serde`: Implement `Serialize` and `Deserialize` where applicable.

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

mod atom;
mod id;

use core::fmt::{Display, Formatter};

/// A pending atomic operation yielded by a suspended process. The scheduler answers with the
/// matching [`Event`] after performing the real effect, so the moment of resumption is the
/// moment the operation takes place.
///
/// `Exit` doubles as the normal-return signal: [`Step`] implementations report completion by
/// returning it, which is also how a fiber that ran off the end of its behavior appears to the
/// scheduler.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Command {
    Exit,
    Make(i64),
    Get(Atom),
    Set(Atom, i64),
    Exchange(Atom, i64),
    CompareAndSwap(Atom, i64, i64),
    FetchAndAdd(Atom, i64),
}

/// The scheduler's answer to a [`Command`], carrying the result of the performed operation.
/// `SpawnOk` is the initial input that starts a process.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Event {
    SpawnOk(Pid),
    MakeOk(Atom),
    GetOk(i64),
    SetOk,
    ExchangeOk(i64),
    CompareAndSwapOk(bool),
    FetchAndAddOk(i64),
}

/// The atomic operation a process is blocked on, by tag alone. `Start` is the synthetic tag for
/// a process that has not yet been resumed.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Op {
    Start,
    Make,
    Get,
    Set,
    Exchange,
    CompareAndSwap,
    FetchAndAdd,
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Op::Start => "start",
            Op::Make => "make",
            Op::Get => "get",
            Op::Set => "set",
            Op::Exchange => "exchange",
            Op::CompareAndSwap => "compare_and_swap",
            Op::FetchAndAdd => "fetch_and_add",
        })
    }
}

pub use atom::Atom;

pub use atom::ObjId;

pub use id::Pid;

/// A resumable process: each call delivers the answer to the previously yielded [`Command`] and
/// runs the process up to its next one. [`discontinue`](Step::discontinue) is the abort channel,
/// unwinding a suspended fiber so resources it holds are released; state machines that hold no
/// stack can ignore it.
pub trait Step {
    fn step(&mut self, event: Event) -> Command;

    fn discontinue(&mut self) {}
}
impl<F> Step for F
where
    F: FnMut(Event) -> Command,
{
    fn step(&mut self, event: Event) -> Command {
        self(event)
    }
}

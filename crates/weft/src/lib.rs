//! Weft is a library for implementing concurrent programs as cooperating fibers that
//! communicate through atomic shared-memory cells.
//!
//! # Usage
//!
//! Please see [the `weft_checker` docs](https://docs.rs/weft_checker/).

#![deny(unused_must_use)]
#![warn(rust_2018_idioms, unreachable_pub)]

#[cfg(feature = "fibers")]
mod fiber;
#[cfg(feature = "rt")]
mod runtime;
#[cfg(feature = "fibers")]
mod sdk;

#[cfg(feature = "fibers")]
pub use fiber::Fiber;

pub use weft_core::{Atom, ObjId, Pid};

#[cfg(feature = "rt")]
pub use runtime::Runtime;

#[cfg(feature = "fibers")]
pub use sdk::Sdk;

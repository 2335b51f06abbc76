use {
    crate::Sdk,
    corosensei::{stack::DefaultStack, CoroutineResult, ScopedCoroutine},
    weft_core::{Command, Event, Step},
};

#[cfg(feature = "tracing")]
use tracing::{event, span, Level};

/// A stackful coroutine running one process body. Between suspensions the body runs
/// straight-line code; it suspends exactly when it performs an atomic operation through its
/// [`Sdk`].
pub struct Fiber<'a>(ScopedCoroutine<'a, Event, Command, (), DefaultStack>);

impl<'a> Fiber<'a> {
    pub fn new(behavior: impl FnOnce(Sdk<'_>) + 'a) -> Self {
        Self(ScopedCoroutine::new(move |yielder, spawn_ok| {
            let pid = match spawn_ok {
                Event::SpawnOk(pid) => pid,
                _ => unreachable!(),
            };

            #[cfg(feature = "tracing")]
            event!(Level::TRACE, "fiber pid: {}", pid);

            behavior(Sdk(yielder, pid))
        }))
    }
}
impl Step for Fiber<'_> {
    fn step(&mut self, event: Event) -> Command {
        #[cfg(feature = "tracing")]
        let span = span!(Level::TRACE, "step");
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        match self.0.resume(event) {
            CoroutineResult::Yield(command) => command,
            CoroutineResult::Return(()) => Command::Exit,
        }
    }

    fn discontinue(&mut self) {
        // A completed coroutine has nothing left to unwind. A never-started one drops its
        // closure without running it.
        if !self.0.done() {
            self.0.force_unwind();
        }
    }
}

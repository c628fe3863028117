//! Turn observation callbacks

/// Receives what happens during a turn as it happens
///
/// Only `on_text` is required. A step is one model call; a turn that uses
/// tools spans several steps.
pub trait TurnSink: Send + Sync {
    /// A streamed text increment
    fn on_text(&self, chunk: &str);

    /// A model call is about to start
    fn on_step_start(&self, _step: usize) {}

    /// A model call finished with this text
    fn on_step_complete(&self, _step: usize, _text: &str) {}
}

impl<F> TurnSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_text(&self, chunk: &str) {
        self(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_closure_is_a_sink() {
        let seen = Mutex::new(String::new());
        let sink = |chunk: &str| seen.lock().push_str(chunk);

        let dyn_sink: &dyn TurnSink = &sink;
        dyn_sink.on_step_start(1);
        dyn_sink.on_text("Hel");
        dyn_sink.on_text("lo");
        dyn_sink.on_step_complete(1, "Hello");

        assert_eq!(*seen.lock(), "Hello");
    }
}

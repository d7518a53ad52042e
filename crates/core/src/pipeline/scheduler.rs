/// Drives the pipeline's cycle cadence.
///
/// The pipeline hands the scheduler a tick closure that executes exactly one
/// cycle and returns whether another should follow. The scheduler decides
/// when ticks fire and never overlaps them; stopping means simply not
/// invoking the closure again, so a running cycle always finishes.
pub trait CycleScheduler {
    fn run(&mut self, tick: &mut dyn FnMut() -> bool);
}

use rand::{Rng, RngCore};

/// Uniform `[0, 1)` draws consumed by the process state machine.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

impl<R: RngCore> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Returns the same value on every draw.
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub f64);

impl RandomSource for Constant {
    fn next_f64(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct Scripted {
    values: Vec<f64>,
    cursor: usize,
}

impl Scripted {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "Scripted source needs at least one value");
        debug_assert!(
            values.iter().all(|v| (0.0..1.0).contains(v)),
            "Scripted draws must lie in [0, 1)"
        );
        Self { values, cursor: 0 }
    }
}

impl RandomSource for Scripted {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }
}

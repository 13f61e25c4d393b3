//! Cooperative randomized-interleaving executor (§4.G "Cooperative-executor
//! semantics", §5). A reference executor drives a fixed set of threads one
//! suspension point at a time in randomized order, surfacing ordering bugs
//! in the parallel primitives that any single fixed schedule would hide.
//!
//! Scoped down from the full per-operation suspension model (`start`,
//! `workgroupBarrier`, `storageBarrier`, and every storage/workgroup array
//! `get`/`set`) to barrier-separated phases: a thread is a sequence of
//! closures ("phases"), and no thread may start phase `i + 1` before every
//! thread in the executor has finished phase `i` — a `workgroupBarrier`
//! coarsened to the whole dispatch. Within one phase, threads run in an
//! order shuffled per `run` call. This is enough to fuzz the interleavings
//! the parallel primitives above actually depend on for correctness.

use rand::seq::SliceRandom;
use rand::Rng;

/// A fixed set of threads, each a sequence of phases run in lockstep.
pub struct CooperativeExecutor<F> {
    threads: Vec<Vec<F>>,
}

impl<F: FnMut()> CooperativeExecutor<F> {
    pub fn new(threads: Vec<Vec<F>>) -> Self {
        Self { threads }
    }

    /// Run every thread's phases under `rng`. For each phase index, shuffle
    /// the threads that still have a phase at that index and run them in
    /// that order; no thread advances past phase `i` until this loop moves
    /// on to phase `i + 1`, matching `workgroupBarrier`'s guarantee that a
    /// phase's writes are visible to every thread in the next one.
    pub fn run(&mut self, rng: &mut impl Rng) {
        let num_phases = self.threads.iter().map(|t| t.len()).max().unwrap_or(0);
        for phase in 0..num_phases {
            let mut ready: Vec<usize> = (0..self.threads.len()).filter(|&t| phase < self.threads[t].len()).collect();
            ready.shuffle(rng);
            for t in ready {
                (self.threads[t][phase])();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn every_thread_runs_every_phase_regardless_of_seed() {
        for seed in 0..16u64 {
            let counter = Rc::new(RefCell::new(0u32));
            let c1 = counter.clone();
            let c2 = counter.clone();
            let c3 = counter.clone();
            let threads: Vec<Vec<Box<dyn FnMut()>>> = vec![
                vec![Box::new(move || *c1.borrow_mut() += 1), Box::new(move || *c1.borrow_mut() += 10)],
                vec![Box::new(move || *c2.borrow_mut() += 1)],
                vec![Box::new(move || *c3.borrow_mut() += 1), Box::new(move || *c3.borrow_mut() += 10)],
            ];
            let mut executor = CooperativeExecutor::new(threads);
            executor.run(&mut StdRng::seed_from_u64(seed));
            assert_eq!(*counter.borrow(), 23);
        }
    }

    #[test]
    fn phase_boundary_acts_as_a_barrier() {
        // Thread A writes `shared` in phase 0; thread B only reads it in
        // phase 1. Every seed must see the write.
        let shared = Rc::new(RefCell::new(0i32));
        let observed = Rc::new(RefCell::new(Vec::new()));
        for seed in 0..16u64 {
            shared.replace(0);
            observed.borrow_mut().clear();
            let (sa, sb) = (shared.clone(), shared.clone());
            let ob = observed.clone();
            let threads: Vec<Vec<Box<dyn FnMut()>>> = vec![
                vec![Box::new(move || *sa.borrow_mut() = 42), Box::new(|| {})],
                vec![Box::new(move || {}), Box::new(move || ob.borrow_mut().push(*sb.borrow()))],
            ];
            let mut executor = CooperativeExecutor::new(threads);
            executor.run(&mut StdRng::seed_from_u64(seed));
            assert_eq!(observed.borrow()[0], 42);
        }
    }
}

//! Generation construction: random placement plus soma assignment.
//!
//! Soma assignment walks neurons in id order. For neuron `i` the first other
//! neuron seeds the candidate; a later neuron only replaces it when it is
//! strictly closer AND already has a soma of its own. Because somas are
//! assigned in id order, "already has a soma" means "was processed earlier",
//! which biases the graph towards chains hanging off low ids. The result
//! therefore depends on processing order.

use rand::Rng;
use tracing::debug;

use crate::config::BASE_CYCLE;
use crate::geometry::{Bounds, Point};
use crate::neuron::Neuron;

/// Integer in `[0, max)`, or `0` when `max <= 0`.
pub fn random_max<R: Rng + ?Sized>(rng: &mut R, max: i32) -> i32 {
    if max <= 0 {
        0
    } else {
        rng.gen_range(0..max)
    }
}

/// Curve offset along one axis, within `[-2 * spread, spread)`.
pub fn curve_component<R: Rng + ?Sized>(rng: &mut R, spread: u32) -> f32 {
    let spread = spread.min(i32::MAX as u32 / 2) as i32;
    (random_max(rng, spread) - random_max(rng, 2 * spread)) as f32
}

pub fn random_curve_offset<R: Rng + ?Sized>(rng: &mut R, spread: u32) -> Point {
    let dx = curve_component(rng, spread);
    let dy = curve_component(rng, spread);
    Point::new(dx, dy)
}

/// Cycle period in `[BASE_CYCLE, BASE_CYCLE + spread)`.
pub fn random_cycle_period<R: Rng + ?Sized>(rng: &mut R, spread: u32) -> u32 {
    let spread = spread.min(i32::MAX as u32) as i32;
    BASE_CYCLE + random_max(rng, spread) as u32
}

/// Epoch-qualified reference to a neuron.
///
/// Handles from a replaced generation never resolve against its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NeuronHandle {
    pub epoch: u64,
    pub index: u32,
}

/// One complete set of neurons and their soma links.
#[derive(Debug, Clone)]
pub struct Generation {
    epoch: u64,
    neurons: Vec<Neuron>,
}

impl Generation {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    pub fn neuron(&self, index: u32) -> Option<&Neuron> {
        self.neurons.get(index as usize)
    }

    pub fn handle(&self, index: u32) -> Option<NeuronHandle> {
        self.neuron(index).map(|_| NeuronHandle {
            epoch: self.epoch,
            index,
        })
    }

    pub fn resolve(&self, handle: NeuronHandle) -> Option<&Neuron> {
        if handle.epoch != self.epoch {
            return None;
        }
        self.neuron(handle.index)
    }

    /// The neuron that `index` links to.
    pub fn soma_of(&self, index: u32) -> Option<&Neuron> {
        self.neuron(index)
            .and_then(|n| n.soma())
            .and_then(|soma| self.neuron(soma))
    }

    /// Number of neurons with a soma (one drawn link each).
    pub fn link_count(&self) -> usize {
        self.neurons.iter().filter(|n| n.soma().is_some()).count()
    }

    pub fn active_count(&self) -> usize {
        self.neurons.iter().filter(|n| n.is_active()).count()
    }

    /// Re-draw every curve offset; the soma graph is untouched.
    pub fn reroll_curves<R: Rng + ?Sized>(&mut self, spread: u32, rng: &mut R) {
        for neuron in &mut self.neurons {
            neuron.set_curve_offset(random_curve_offset(rng, spread));
        }
        debug!(epoch = self.epoch, spread, "Curve offsets recomputed");
    }

    /// Re-draw every cycle period; counters and states are kept.
    pub fn reroll_cycles<R: Rng + ?Sized>(&mut self, spread: u32, rng: &mut R) {
        for neuron in &mut self.neurons {
            neuron.set_cycle_period(random_cycle_period(rng, spread));
        }
        debug!(epoch = self.epoch, spread, "Cycle periods recomputed");
    }
}

/// Link every neuron to its soma, in id order.
pub fn assign_somas(neurons: &mut [Neuron]) {
    for i in 0..neurons.len() {
        let origin = neurons[i].position();
        let own_id = neurons[i].id();
        let mut picked: Option<usize> = None;

        for j in 0..neurons.len() {
            if i == j {
                continue;
            }
            let current = *picked.get_or_insert(j);
            let closer = origin.distance(neurons[j].position())
                < origin.distance(neurons[current].position());
            if closer && neurons[j].soma().is_some() && neurons[j].id() != own_id {
                picked = Some(j);
            }
        }

        let soma = picked.filter(|&p| p != i).map(|p| p as u32);
        neurons[i].set_soma(soma);
    }
}

/// Builds generations inside a placement region.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    bounds: Bounds,
    curve_spread: u32,
    cycle_spread: u32,
    next_epoch: u64,
}

impl GraphBuilder {
    pub fn new(bounds: Bounds) -> Self {
        GraphBuilder {
            bounds,
            curve_spread: 50,
            cycle_spread: 300,
            next_epoch: 1,
        }
    }

    pub fn with_curve_spread(mut self, spread: u32) -> Self {
        self.curve_spread = spread;
        self
    }

    pub fn with_cycle_spread(mut self, spread: u32) -> Self {
        self.cycle_spread = spread;
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_curve_spread(&mut self, spread: u32) {
        self.curve_spread = spread;
    }

    pub fn set_cycle_spread(&mut self, spread: u32) {
        self.cycle_spread = spread;
    }

    /// Place `count` neurons uniformly inside the bounds and link them.
    pub fn build<R: Rng + ?Sized>(&mut self, count: u32, rng: &mut R) -> Generation {
        let positions: Vec<Point> = (0..count)
            .map(|_| {
                let x = self.bounds.x_begin + random_max(rng, self.bounds.width());
                let y = self.bounds.y_begin + random_max(rng, self.bounds.height());
                Point::new(x as f32, y as f32)
            })
            .collect();
        self.build_from_positions(&positions, rng)
    }

    /// Link neurons at fixed positions; curves and cycles are still random.
    pub fn build_from_positions<R: Rng + ?Sized>(
        &mut self,
        positions: &[Point],
        rng: &mut R,
    ) -> Generation {
        let mut neurons: Vec<Neuron> = positions
            .iter()
            .enumerate()
            .map(|(id, &position)| {
                let curve = random_curve_offset(rng, self.curve_spread);
                let period = random_cycle_period(rng, self.cycle_spread);
                Neuron::new(id as u32, position, curve, period)
            })
            .collect();

        assign_somas(&mut neurons);

        let epoch = self.next_epoch;
        self.next_epoch += 1;

        let generation = Generation { epoch, neurons };
        debug!(
            epoch,
            count = generation.len(),
            links = generation.link_count(),
            "Generation built"
        );
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SurfaceSize;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn builder() -> GraphBuilder {
        GraphBuilder::new(Bounds::inset(SurfaceSize::new(800.0, 600.0), 0.1))
    }

    #[test]
    fn test_never_self_linked() {
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let generation = builder().build(2 + seed as u32 * 7, &mut rng);
            for n in generation.neurons() {
                assert_ne!(n.soma(), Some(n.id()), "{}", n);
                assert!(n.soma().is_some());
            }
        }
    }

    #[test]
    fn test_tiny_generations_have_no_links() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(builder().build(0, &mut rng).is_empty());
        let single = builder().build(1, &mut rng);
        assert_eq!(single.len(), 1);
        assert_eq!(single.link_count(), 0);
    }

    #[test]
    fn test_triangle_ordering_rule() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let positions = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        let generation = builder().build_from_positions(&positions, &mut rng);
        // Neuron 2 is as close to 0 as neuron 1, but 1 seeds the candidate
        // and 2 has no soma yet when 0 is processed.
        assert_eq!(generation.neuron(0).unwrap().soma(), Some(1));
        assert_eq!(generation.neuron(1).unwrap().soma(), Some(0));
        assert_eq!(generation.neuron(2).unwrap().soma(), Some(0));
    }

    #[test]
    fn test_closer_unlinked_neuron_is_skipped() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // Neuron 2 is closest to 1 but unlinked when 1 is processed
        let positions = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(101.0, 0.0),
        ];
        let generation = builder().build_from_positions(&positions, &mut rng);
        assert_eq!(generation.neuron(1).unwrap().soma(), Some(0));
        assert_eq!(generation.neuron(2).unwrap().soma(), Some(1));
    }

    #[test]
    fn test_links_point_backwards() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let generation = builder().build(150, &mut rng);
        assert_eq!(generation.neuron(0).unwrap().soma(), Some(1));
        for n in generation.neurons().iter().skip(1) {
            assert!(n.soma().unwrap() < n.id());
        }
    }

    #[test]
    fn test_same_seed_same_generation() {
        let a = builder().build(60, &mut ChaCha8Rng::seed_from_u64(42));
        let b = builder().build(60, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a.neurons(), b.neurons());
    }

    #[test]
    fn test_placement_and_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut b = builder().with_curve_spread(10).with_cycle_spread(40);
        let generation = b.build(300, &mut rng);
        for n in generation.neurons() {
            assert!(b.bounds().contains(n.position()));
            let c = n.curve_offset();
            assert!(c.x >= -20.0 && c.x < 10.0);
            assert!(c.y >= -20.0 && c.y < 10.0);
            assert!((60..100).contains(&n.cycle_period()));
        }
    }

    #[test]
    fn test_zero_cycle_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let generation = builder().with_cycle_spread(0).build(10, &mut rng);
        assert!(generation.neurons().iter().all(|n| n.cycle_period() == BASE_CYCLE));
    }

    #[test]
    fn test_epochs_and_stale_handles() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut b = builder();
        let first = b.build(10, &mut rng);
        let handle = first.handle(3).unwrap();
        assert!(first.resolve(handle).is_some());
        assert!(first.handle(10).is_none());

        let second = b.build(10, &mut rng);
        assert!(second.epoch() > first.epoch());
        assert!(second.resolve(handle).is_none());
    }

    #[test]
    fn test_reroll_keeps_links() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut generation = builder().build(40, &mut rng);
        let links: Vec<_> = generation.neurons().iter().map(|n| n.soma()).collect();
        generation.reroll_curves(5, &mut rng);
        generation.reroll_cycles(0, &mut rng);
        let after: Vec<_> = generation.neurons().iter().map(|n| n.soma()).collect();
        assert_eq!(links, after);
        for n in generation.neurons() {
            assert!(n.curve_offset().x >= -10.0 && n.curve_offset().x < 5.0);
            assert_eq!(n.cycle_period(), BASE_CYCLE);
        }
    }
}

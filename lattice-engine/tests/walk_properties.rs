use lattice_engine::presets::TETRAHEDRON;
use lattice_engine::{Graph, LatticeError, Phase, Preset, Scheduler, MIN_WAIT_SECS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn scenario_a() -> Graph {
    Graph::seeded(TETRAHEDRON, &[300, 420, 610, 990]).unwrap()
}

#[test]
fn scenario_a_tetrahedron_wiring() {
    let g = scenario_a();
    assert_eq!(g.len(), 4);
    assert_eq!(g.edges_of(0).unwrap(), &[1, 2, 3]);

    let last = g.edges_of(3).unwrap();
    assert_eq!(last.len(), 3);
    let mut sorted = last.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2]);
}

#[test]
fn scenario_b_thousand_steps_stay_in_preset() {
    let mut s = Scheduler::new(scenario_a());
    s.restart_at(0).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let allowed: HashSet<u8> = TETRAHEDRON.iter().copied().collect();

    let mut clock = 0.0;
    for _ in 0..1000 {
        let step = s.step(clock, &mut rng).unwrap();
        assert!(allowed.contains(&step.pitch), "pitch {} not in preset", step.pitch);
        assert!(step.wait_secs >= MIN_WAIT_SECS);
        assert!(!step.terminated);
        assert_eq!(step.phase, Phase::On);
        clock += step.wait_secs;
    }
}

#[test]
fn restart_mid_walk_leaves_one_sounding_node() {
    let mut s = Scheduler::new(scenario_a());
    let mut rng = StdRng::seed_from_u64(77);
    let on_count = |s: &Scheduler| s.graph().nodes().iter().filter(|n| n.phase().is_on()).count();

    let first = s.step(0.0, &mut rng).unwrap().node;
    assert_eq!(on_count(&s), 1);
    s.restart_at((first + 1) % 4).unwrap();
    assert_eq!(s.graph().node(first).unwrap().phase(), Phase::Off);

    let mut clock = 0.0;
    for _ in 0..50 {
        let step = s.step(clock, &mut rng).unwrap();
        assert_eq!(on_count(&s), 1, "after stepping to {}", step.node);
        clock += step.wait_secs;
    }
}

#[test]
fn scenario_c_empty_preset_refuses() {
    let mut rng = StdRng::seed_from_u64(0);
    let g = Preset::new("EMPTY", vec![]).seed_graph(&mut rng, 300, 1000).unwrap();
    let mut s = Scheduler::new(g);
    assert_eq!(s.step(0.0, &mut rng), Err(LatticeError::EmptyGraph));
}

#[test]
fn single_node_is_terminal() {
    let g = Graph::seeded(&[67], &[400]).unwrap();
    assert!(g.edges_of(0).unwrap().is_empty());
    let step = Scheduler::new(g).step(0.0, &mut StdRng::seed_from_u64(0)).unwrap();
    assert!(step.terminated);
}

/// Random registration sequences over a small pitch/phase alphabet, so dedup
/// hits are frequent.
fn random_graph(rng: &mut StdRng) -> Graph {
    let mut g = Graph::new();
    let calls = rng.gen_range(0..40);
    for _ in 0..calls {
        let phase = if rng.gen_bool(0.3) { Phase::On } else { Phase::Off };
        g.register_node(phase, rng.gen_range(60..66), rng.gen_range(0..1000));
    }
    g
}

#[test]
fn registration_never_duplicates_equivalent_nodes() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let mut g = random_graph(&mut rng);
        let keys: HashSet<(Phase, u8)> = g.nodes().iter().map(|n| (n.phase(), n.pitch())).collect();
        assert_eq!(keys.len(), g.len());
        assert_eq!(g.edges().len(), g.len());

        if let Some(n) = g.nodes().first().cloned() {
            let before = g.len();
            let id = g.register_node(n.phase(), n.pitch(), 1);
            assert_eq!(id, n.id());
            assert_eq!(g.len(), before);
        }
    }
}

#[test]
fn no_self_loops_and_full_reciprocity() {
    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..200 {
        let g = random_graph(&mut rng);
        for (i, dests) in g.edges().iter().enumerate() {
            assert!(!dests.contains(&i), "self-loop at {i}");
            for j in 0..g.len() {
                if j != i {
                    assert!(dests.contains(&j), "missing edge {i}->{j}");
                }
            }
        }
    }
}

#[test]
fn repeated_registration_weights_transitions() {
    let mut g = Graph::seeded(&[60, 62, 64], &[300; 3]).unwrap();
    for _ in 0..8 {
        g.register_node(Phase::Off, 62, 300);
    }
    g.restart_at(0).unwrap();
    // edges[0] = [1, 2, 1 x8]: node 1 should dominate transitions out of 0
    assert_eq!(g.edges_of(0).unwrap().iter().filter(|&&d| d == 1).count(), 9);

    let mut rng = StdRng::seed_from_u64(5);
    let mut hits = [0usize; 3];
    for _ in 0..2000 {
        let mut s = Scheduler::new(g.clone());
        hits[s.step(0.0, &mut rng).unwrap().node] += 1;
    }
    assert!(hits[1] > hits[2] * 4, "hits={hits:?}");
}

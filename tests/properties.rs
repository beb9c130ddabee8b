use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use hexworld::{hex::Coords, Lottery};

fn coords() -> impl Strategy<Value = Coords> {
    (-200_i32..=200, -200_i32..=200).prop_map(|(x, y)| Coords::new(x, y))
}

#[derive(Debug, Clone)]
enum Op {
    Enter(u8, usize),
    Remove(u8, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0_u8..6, 1_usize..20).prop_map(|(entrant, tickets)| Op::Enter(entrant, tickets)),
        (0_u8..6, 0_usize..20).prop_map(|(entrant, tickets)| Op::Remove(entrant, tickets)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn hex_distance_is_a_metric(a in coords(), b in coords(), c in coords()) {
        prop_assert_eq!(a.distance(a), 0);
        prop_assert_eq!(a.distance(b), b.distance(a));
        prop_assert!(a.distance(b) <= a.distance(c) + c.distance(b));
    }

    #[test]
    fn tickets_are_conserved(ops in prop::collection::vec(op(), 0..40), seed in any::<u64>()) {
        let mut lottery = Lottery::new(seed);
        let mut expected: HashMap<u8, usize> = HashMap::new();
        for op in ops {
            match op {
                Op::Enter(entrant, tickets) => {
                    lottery.enter(entrant, tickets).unwrap();
                    *expected.entry(entrant).or_default() += tickets;
                }
                Op::Remove(entrant, tickets) => {
                    lottery.remove(&entrant, tickets);
                    let held = expected.entry(entrant).or_default();
                    *held = held.saturating_sub(tickets);
                }
            }
        }
        for entrant in 0..6 {
            prop_assert_eq!(
                lottery.get_tickets(&entrant),
                expected.get(&entrant).copied().unwrap_or(0)
            );
        }
        prop_assert_eq!(lottery.total_tickets(), expected.values().sum::<usize>());
    }

    #[test]
    fn batch_draws_never_repeat(
        weights in prop::collection::vec(1_usize..10, 1..12),
        extra in 0_usize..4,
        seed in any::<u64>()
    ) {
        let mut lottery = Lottery::new(seed);
        for (entrant, tickets) in weights.iter().enumerate() {
            lottery.enter(entrant, *tickets).unwrap();
        }
        let before = lottery.state();

        lottery.start_batch_draw();
        let drawn = lottery.draw_many(weights.len() + extra).unwrap();
        lottery.end_batch_draw();

        let hits: Vec<usize> = drawn.iter().flatten().copied().collect();
        let unique: HashSet<usize> = hits.iter().copied().collect();
        prop_assert_eq!(hits.len(), weights.len());
        prop_assert_eq!(unique.len(), weights.len());
        prop_assert_eq!(lottery.state(), before);
    }

    #[test]
    fn blacklisted_entrants_are_never_drawn(
        weights in prop::collection::vec(1_usize..10, 2..10),
        mask in prop::collection::vec(any::<bool>(), 10),
        seed in any::<u64>()
    ) {
        let mut lottery = Lottery::new(seed);
        for (entrant, tickets) in weights.iter().enumerate() {
            lottery.enter(entrant, *tickets).unwrap();
        }
        let mut blacklist: HashSet<usize> = (0..weights.len()).filter(|i| mask[*i]).collect();
        blacklist.remove(&0);

        for _ in 0..50 {
            let drawn = lottery.draw_excluding(&blacklist);
            prop_assert!(drawn.is_some());
            prop_assert!(!blacklist.contains(&drawn.unwrap()));
        }
    }
}

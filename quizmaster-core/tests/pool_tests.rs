use quizmaster_core::{build_pool_with_rng, copies_for, Flashcard};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn count(pool: &[usize], idx: usize) -> usize {
    pool.iter().filter(|&&i| i == idx).count()
}

#[test]
fn copies_follow_mistakes_with_cap() {
    let fresh = Flashcard::with_counters("a?", "a", 0, 0);
    let one = Flashcard::with_counters("b?", "b", 3, 2);
    let three = Flashcard::with_counters("c?", "c", 3, 0);
    let many = Flashcard::with_counters("d?", "d", 9, 1);
    assert_eq!(copies_for(&fresh), 1);
    assert_eq!(copies_for(&one), 2);
    assert_eq!(copies_for(&three), 4);
    assert_eq!(copies_for(&many), 4);
}

#[test]
fn pool_bounds_and_membership() {
    let cards: Vec<Flashcard> = (0..12)
        .map(|i| Flashcard::with_counters(format!("q{i}?"), "x", i, i / 3))
        .collect();
    let mut rng = StdRng::seed_from_u64(7);
    let pool = build_pool_with_rng(&cards, &mut rng);

    assert!(pool.len() >= cards.len());
    assert!(pool.len() <= 4 * cards.len());
    for (i, card) in cards.iter().enumerate() {
        assert!(count(&pool, i) >= 1);
        assert_eq!(count(&pool, i), copies_for(card));
        if card.mistakes() == 0 {
            assert_eq!(count(&pool, i), 1);
        }
        if card.mistakes() >= 3 {
            assert_eq!(count(&pool, i), 4);
        }
    }
}

#[test]
fn bad_counters_still_yield_one_copy() {
    let cards = vec![Flashcard::with_counters("q?", "a", 1, 5)];
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(build_pool_with_rng(&cards, &mut rng), vec![0]);
}

#[test]
fn empty_set_gives_empty_pool() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(build_pool_with_rng(&[], &mut rng).is_empty());
}

use crate::{CardIdx, Flashcard, MAX_EXTRA_COPIES};
use rand::seq::SliceRandom;
use rand::Rng;

/// One copy per card plus one per mistake, capped at `MAX_EXTRA_COPIES` extra.
pub fn copies_for(card: &Flashcard) -> usize {
    1 + card.mistakes().min(MAX_EXTRA_COPIES) as usize
}

pub fn build_pool(cards: &[Flashcard]) -> Vec<CardIdx> {
    build_pool_with_rng(cards, &mut rand::rng())
}

pub fn build_pool_with_rng<R: Rng + ?Sized>(cards: &[Flashcard], rng: &mut R) -> Vec<CardIdx> {
    let mut pool: Vec<CardIdx> = cards
        .iter()
        .enumerate()
        .flat_map(|(idx, card)| std::iter::repeat(idx).take(copies_for(card)))
        .collect();
    pool.shuffle(rng);
    pool
}

//! Policy deck tests.

use super::super::{Party, PolicyDeck, DECK_SIZE};
use super::test_utils::rng;

#[test]
fn draw_is_top_first() {
    let deck = PolicyDeck::new(vec![Party::Fascist, Party::Liberal]);
    let (drawn, rest) = deck.draw(0, 0, 1, &mut rng(1));
    assert_eq!(drawn, vec![Party::Liberal]);
    assert_eq!(rest.len(), 1);
    assert_eq!(rest.count(Party::Fascist), 1);
}

#[test]
fn peek_is_a_draw_with_putback() {
    let deck = PolicyDeck::new(vec![
        Party::Fascist,
        Party::Liberal,
        Party::Liberal,
        Party::Fascist,
    ]);
    let (peeked, after_peek) = deck.peek(0, 0, 3, &mut rng(1));
    let (drawn, _) = deck.draw(0, 0, 3, &mut rng(2));
    assert_eq!(peeked, drawn);
    assert_eq!(after_peek, deck);
}

#[test]
fn short_deck_is_rebuilt_before_drawing() {
    let deck = PolicyDeck::new(vec![Party::Fascist, Party::Liberal]);
    let (drawn, rest) = deck.draw(2, 4, 3, &mut rng(3));
    assert_eq!(drawn.len(), 3);
    assert_eq!(rest.len(), DECK_SIZE - 2 - 4 - 3);

    let libs = rest.count(Party::Liberal)
        + drawn.iter().filter(|p| **p == Party::Liberal).count();
    let fascists = rest.count(Party::Fascist)
        + drawn.iter().filter(|p| **p == Party::Fascist).count();
    assert_eq!(libs, 4);
    assert_eq!(fascists, 7);
}

#[test]
fn peek_rebuilds_short_decks_too() {
    let deck = PolicyDeck::new(vec![Party::Liberal]);
    let (peeked, after) = deck.peek(0, 0, 3, &mut rng(4));
    assert_eq!(peeked.len(), 3);
    assert_eq!(after.len(), DECK_SIZE);

    let top: Vec<Party> = after.cards().iter().rev().take(3).copied().collect();
    assert_eq!(top, peeked);
}

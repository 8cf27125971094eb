//! Eight Player Bracket Example
//!
//! Builds an eight-player single-elimination bracket, seeds it and plays it
//! through to the final.

use seat_bracket::{Bracket, BracketConfig, Match};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Eight Player Bracket Example ===\n");

    let config = BracketConfig::default()
        .with_match(Match::new(1, 2).with_winner_to(9))
        .with_match(Match::new(3, 4).with_winner_to(10))
        .with_match(Match::new(5, 6).with_winner_to(11))
        .with_match(Match::new(7, 8).with_winner_to(12))
        .with_match(Match::new(9, 10).with_winner_to(13).with_loser_to(15))
        .with_match(Match::new(11, 12).with_winner_to(14).with_loser_to(16))
        .with_match(Match::new(13, 14).with_winner_to(17))
        .with_match(Match::new(15, 16).with_winner_to(18))
        .with_seed_order(vec![1, 8, 5, 4, 3, 6, 7, 2]);

    let mut bracket = Bracket::with_config(config);
    for position in 1..=18 {
        bracket.add(position, String::from("-"));
    }

    let players = ["Ann", "Hal", "Eve", "Dan", "Cat", "Fay", "Gus", "Bea"];
    bracket.seed(players.iter().map(|p| p.to_string()))?;

    println!("Matches:");
    for m in bracket.matches() {
        println!("  {m}");
    }

    // Left seat of every pair wins
    for seat in [1, 3, 5, 7, 9, 11, 13, 15] {
        assert!(bracket.match_winner(seat), "seat {seat} should play a match");
    }

    // The champion's seat feeds nowhere, so there is no match to resolve
    if !bracket.match_winner(17) {
        println!("\nSeat 17 plays in no match");
    }

    println!("\nSeats in bracket order:");
    for seat in bracket.seats() {
        println!("  {:>2}: {}", seat.position(), seat.payload());
    }

    println!("\nTree export:\n{}", bracket.to_json()?);
    Ok(())
}

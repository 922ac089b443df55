//! Seat selection logic: the set-difference over taken seats and the pick.

use rand::seq::IndexedRandom;
use thiserror::Error;

use crate::dao::models::PredefinedSeats;

/// Error returned when a draw is attempted against a full session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("all seats are taken")]
pub struct AllSeatsTaken;

/// Case-fold a participant name for predefined lookups and one-draw-per-name
/// enforcement. Matches the frontends: trim, then uppercase.
pub fn name_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Seats of `1..=total_seats` that no assignment holds yet, ascending.
pub fn available_seats(total_seats: u16, taken: &[u16]) -> Vec<u16> {
    (1..=total_seats)
        .filter(|seat| !taken.contains(seat))
        .collect()
}

/// Select a seat for a participant.
///
/// A predefined entry for the case-folded name wins when its target seat is
/// still free; otherwise the pick is uniform over the available set.
pub fn select_seat(
    total_seats: u16,
    taken: &[u16],
    participant: &str,
    predefined: &PredefinedSeats,
) -> Result<u16, AllSeatsTaken> {
    let available = available_seats(total_seats, taken);

    if let Some(seat) = predefined.get(&name_key(participant)) {
        if available.contains(seat) {
            return Ok(*seat);
        }
    }

    let mut rng = rand::rng();
    available.choose(&mut rng).copied().ok_or(AllSeatsTaken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predefined(entries: &[(&str, u16)]) -> PredefinedSeats {
        entries
            .iter()
            .map(|(name, seat)| (name.to_string(), *seat))
            .collect()
    }

    #[test]
    fn available_count_is_total_minus_taken() {
        for taken_count in 0..=10u16 {
            let taken: Vec<u16> = (1..=taken_count).collect();
            assert_eq!(
                available_seats(10, &taken).len(),
                usize::from(10 - taken_count)
            );
        }
    }

    #[test]
    fn available_seats_excludes_exactly_the_taken_ones() {
        assert_eq!(available_seats(5, &[2, 4]), vec![1, 3, 5]);
        assert_eq!(available_seats(1, &[]), vec![1]);
        assert!(available_seats(2, &[1, 2]).is_empty());
    }

    #[test]
    fn full_session_fails_instead_of_crashing() {
        assert_eq!(
            select_seat(2, &[1, 2], "alice", &PredefinedSeats::default()),
            Err(AllSeatsTaken)
        );
    }

    #[test]
    fn selected_seat_is_always_free() {
        let taken = [2, 4];
        for _ in 0..50 {
            let seat = select_seat(5, &taken, "alice", &PredefinedSeats::default()).unwrap();
            assert!((1..=5).contains(&seat));
            assert!(!taken.contains(&seat));
        }
    }

    #[test]
    fn predefined_entry_wins_case_insensitively() {
        let mapping = predefined(&[("YT", 3)]);
        assert_eq!(select_seat(5, &[2, 4], "yt", &mapping), Ok(3));
        assert_eq!(select_seat(5, &[2, 4], " Yt ", &mapping), Ok(3));
    }

    #[test]
    fn taken_predefined_seat_falls_back_to_random() {
        let mapping = predefined(&[("YT", 3)]);
        for _ in 0..50 {
            let seat = select_seat(5, &[3], "yt", &mapping).unwrap();
            assert_ne!(seat, 3);
            assert!((1..=5).contains(&seat));
        }
    }

    #[test]
    fn name_key_trims_and_uppercases() {
        assert_eq!(name_key("  yt "), "YT");
        assert_eq!(name_key("Alice"), "ALICE");
    }
}

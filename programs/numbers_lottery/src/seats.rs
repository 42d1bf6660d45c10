//! Seat state rules: `ABSENT -> HOLD(owner, until) -> BOOKED(owner)`.
use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    state::{Seat, SeatStatus},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldDecision {
    /// No seat account yet.
    Create,
    /// Same user re-holds; only `hold_until` moves.
    Refresh,
    /// Previous holder's hold elapsed.
    Takeover,
}

pub fn hold_elapsed(seat: &Seat, now: i64) -> bool {
    seat.hold_until < now
}

/// Whether `user` may hold a number whose current seat is `seat`.
pub fn check_holdable(seat: Option<&Seat>, user: &Pubkey, now: i64) -> Result<HoldDecision> {
    let Some(seat) = seat else {
        return Ok(HoldDecision::Create);
    };
    match seat.status {
        SeatStatus::Booked => err!(LotteryError::SeatAlreadyBooked),
        SeatStatus::Hold if seat.owner == *user => Ok(HoldDecision::Refresh),
        SeatStatus::Hold if hold_elapsed(seat, now) => Ok(HoldDecision::Takeover),
        SeatStatus::Hold => err!(LotteryError::NumberUnavailable),
    }
}

/// A purchase needs a live hold owned by the buyer.
pub fn check_purchasable(seat: Option<&Seat>, user: &Pubkey, now: i64) -> Result<()> {
    let seat = seat.ok_or_else(|| error!(LotteryError::SeatNotFound))?;
    require!(seat.status == SeatStatus::Hold, LotteryError::SeatNotOnHold);
    require_keys_eq!(seat.owner, *user, LotteryError::SeatHeldByOther);
    require!(!hold_elapsed(seat, now), LotteryError::HoldExpired);
    Ok(())
}

/// Expired holds can be swept back to ABSENT.
pub fn is_reclaimable(seat: &Seat, now: i64) -> bool {
    seat.status == SeatStatus::Hold && hold_elapsed(seat, now)
}

pub fn apply_hold(seat: &mut Seat, user: &Pubkey, hold_until: i64) {
    seat.status = SeatStatus::Hold;
    seat.owner = *user;
    seat.hold_until = hold_until;
}

pub fn apply_booking(seat: &mut Seat, now: i64) {
    seat.status = SeatStatus::Booked;
    seat.hold_until = 0;
    seat.booked_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(owner: Pubkey, hold_until: i64) -> Seat {
        Seat {
            slot: Pubkey::default(),
            bump: 255,
            number: "0729".to_string(),
            status: SeatStatus::Hold,
            owner,
            hold_until,
            rent_payer: owner,
            booked_at: 0,
        }
    }

    #[test]
    fn live_hold_blocks_other_users_until_it_elapses() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let seat = held(a, 1_060);

        let err = check_holdable(Some(&seat), &b, 1_030).unwrap_err();
        assert_eq!(err, LotteryError::NumberUnavailable.into());
        // still live at the exact instant
        assert!(check_holdable(Some(&seat), &b, 1_060).is_err());
        assert_eq!(check_holdable(Some(&seat), &b, 1_061).unwrap(), HoldDecision::Takeover);
    }

    #[test]
    fn same_user_refreshes_and_absent_creates() {
        let a = Pubkey::new_unique();
        let seat = held(a, 1_060);
        assert_eq!(check_holdable(Some(&seat), &a, 1_030).unwrap(), HoldDecision::Refresh);
        assert_eq!(check_holdable(None, &a, 0).unwrap(), HoldDecision::Create);
    }

    #[test]
    fn booked_seat_is_never_holdable() {
        let a = Pubkey::new_unique();
        let mut seat = held(a, 1_060);
        apply_booking(&mut seat, 1_000);
        let err = check_holdable(Some(&seat), &a, 5_000).unwrap_err();
        assert_eq!(err, LotteryError::SeatAlreadyBooked.into());
        assert!(!is_reclaimable(&seat, 5_000));
    }

    #[test]
    fn purchase_revalidates_hold() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let seat = held(a, 1_060);

        assert!(check_purchasable(Some(&seat), &a, 1_059).is_ok());
        assert_eq!(
            check_purchasable(Some(&seat), &a, 1_061).unwrap_err(),
            LotteryError::HoldExpired.into()
        );
        assert_eq!(
            check_purchasable(Some(&seat), &b, 1_000).unwrap_err(),
            LotteryError::SeatHeldByOther.into()
        );
        assert_eq!(
            check_purchasable(None, &a, 1_000).unwrap_err(),
            LotteryError::SeatNotFound.into()
        );
    }

    #[test]
    fn at_most_one_booking_per_seat() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let mut seat = held(a, 1_060);
        check_purchasable(Some(&seat), &a, 1_000).unwrap();
        apply_booking(&mut seat, 1_000);
        assert!(check_purchasable(Some(&seat), &a, 1_000).is_err());
        assert!(check_purchasable(Some(&seat), &b, 1_000).is_err());
        assert!(check_holdable(Some(&seat), &b, 9_999).is_err());
    }

    #[test]
    fn expired_hold_is_reclaimable() {
        let seat = held(Pubkey::new_unique(), 100);
        assert!(!is_reclaimable(&seat, 100));
        assert!(is_reclaimable(&seat, 101));
    }
}

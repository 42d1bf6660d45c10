//! Wallet/bonus split for seat-reserved purchases and FIFO bonus consumption.
use anchor_lang::prelude::*;

use crate::{
    constants::MAX_BPS,
    errors::LotteryError,
    state::{BonusGrant, BonusStatus},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FundingSplit {
    pub total: u64,
    pub bonus_to_use: u64,
    pub wallet_to_use: u64,
}

/// `bonus_to_use = min(bonus_balance, floor(total * cap_bps / 10000))`; the rest
/// must be covered by the available wallet balance.
pub fn split_funding(
    total: u64,
    bonus_balance: u64,
    available_balance: u64,
    bonus_cap_bps: u16,
) -> Result<FundingSplit> {
    require!(total > 0, LotteryError::InvalidAmount);
    require!(bonus_cap_bps <= MAX_BPS, LotteryError::InvalidBps);

    let cap = (total as u128)
        .checked_mul(bonus_cap_bps as u128)
        .ok_or(LotteryError::MathOverflow)?
        / MAX_BPS as u128;
    let bonus_to_use = bonus_balance.min(cap as u64);
    let wallet_to_use = total - bonus_to_use;

    require!(
        wallet_to_use <= available_balance,
        LotteryError::InsufficientAvailableBalance
    );

    Ok(FundingSplit {
        total,
        bonus_to_use,
        wallet_to_use,
    })
}

/// Sum of `remaining` over grants that are active and not yet expired at `now`.
pub fn spendable_bonus(grants: &[BonusGrant], now: i64) -> u64 {
    grants
        .iter()
        .filter(|g| g.status == BonusStatus::Active && g.expires_at > now)
        .map(|g| g.remaining)
        .fold(0u64, |acc, r| acc.saturating_add(r))
}

/// Draws `amount` from active grants, soonest expiry first, ties by grant seq.
///
/// Grants that reach zero become `Used`. Returns how many grants were used up.
/// On error no grant is modified.
pub fn consume_bonus_fifo(grants: &mut [BonusGrant], amount: u64, now: i64) -> Result<u32> {
    if amount == 0 {
        return Ok(0);
    }
    require!(
        spendable_bonus(grants, now) >= amount,
        LotteryError::InsufficientBonus
    );

    let mut order: Vec<usize> = (0..grants.len())
        .filter(|&i| grants[i].status == BonusStatus::Active && grants[i].expires_at > now)
        .collect();
    order.sort_by_key(|&i| (grants[i].expires_at, grants[i].seq));

    let mut left = amount;
    let mut used_up = 0u32;
    for i in order {
        if left == 0 {
            break;
        }
        let g = &mut grants[i];
        let take = g.remaining.min(left);
        g.remaining -= take;
        left -= take;
        if g.remaining == 0 {
            g.status = BonusStatus::Used;
            used_up += 1;
        }
    }
    Ok(used_up)
}

/// Marks grants expired at `now`. Returns (grants expired, remaining removed).
pub fn expire_grants(grants: &mut [BonusGrant], now: i64) -> Result<(u32, u64)> {
    let mut count = 0u32;
    let mut removed = 0u64;
    for g in grants.iter_mut() {
        if g.status == BonusStatus::Active && g.expires_at <= now {
            removed = removed
                .checked_add(g.remaining)
                .ok_or(LotteryError::MathOverflow)?;
            g.remaining = 0;
            g.status = BonusStatus::Expired;
            count += 1;
        }
    }
    Ok((count, removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(seq: u64, remaining: u64, expires_at: i64) -> BonusGrant {
        BonusGrant {
            user: Pubkey::default(),
            seq,
            bump: 255,
            amount: remaining,
            remaining,
            status: BonusStatus::Active,
            expires_at,
            created_at: 0,
        }
    }

    #[test]
    fn bonus_blend_uses_capped_bonus() {
        let s = split_funding(1_000, 50, 10_000, 1_000).unwrap();
        assert_eq!(s.bonus_to_use, 50);
        assert_eq!(s.wallet_to_use, 950);

        let s = split_funding(1_000, 500, 10_000, 1_000).unwrap();
        assert_eq!(s.bonus_to_use, 100);
        assert_eq!(s.wallet_to_use, 900);
    }

    #[test]
    fn bonus_cap_floors() {
        // floor(99 * 0.1) = 9
        let s = split_funding(99, 1_000, 1_000, 1_000).unwrap();
        assert_eq!(s.bonus_to_use, 9);
        assert!(s.bonus_to_use <= 1_000);
        assert_eq!(s.bonus_to_use + s.wallet_to_use, 99);
    }

    #[test]
    fn wallet_remainder_must_be_available() {
        let err = split_funding(1_000, 50, 949, 1_000).unwrap_err();
        assert_eq!(err, LotteryError::InsufficientAvailableBalance.into());
        assert!(split_funding(1_000, 50, 950, 1_000).is_ok());
    }

    #[test]
    fn fifo_consumes_soonest_expiry_first() {
        let mut grants = vec![grant(0, 30, 500), grant(1, 30, 200), grant(2, 30, 300)];
        let used = consume_bonus_fifo(&mut grants, 40, 100).unwrap();
        assert_eq!(used, 1);
        assert_eq!(grants[1].remaining, 0);
        assert_eq!(grants[1].status, BonusStatus::Used);
        assert_eq!(grants[2].remaining, 20);
        assert_eq!(grants[0].remaining, 30);
    }

    #[test]
    fn fifo_ties_break_by_seq() {
        let mut grants = vec![grant(5, 10, 200), grant(3, 10, 200)];
        consume_bonus_fifo(&mut grants, 10, 0).unwrap();
        assert_eq!(grants[1].remaining, 0);
        assert_eq!(grants[0].remaining, 10);
    }

    #[test]
    fn fifo_skips_expired_and_rejects_shortfall() {
        let mut grants = vec![grant(0, 100, 50), grant(1, 10, 500)];
        assert!(consume_bonus_fifo(&mut grants, 20, 100).is_err());
        assert_eq!(grants[1].remaining, 10);
        assert_eq!(spendable_bonus(&grants, 100), 10);
    }

    #[test]
    fn expiry_sweep_is_reentrant() {
        let mut grants = vec![grant(0, 40, 100), grant(1, 10, 500)];
        assert_eq!(expire_grants(&mut grants, 100).unwrap(), (1, 40));
        assert_eq!(grants[0].status, BonusStatus::Expired);
        assert_eq!(expire_grants(&mut grants, 100).unwrap(), (0, 0));
        assert_eq!(grants[1].status, BonusStatus::Active);
    }
}

//! Prize tier matching and payout rules.
//!
//! Tier 1 is an exact match, tier 2 matches the last N-1 digits, tier 3 the
//! last N-2 digits. A tier whose suffix would be empty does not exist, so a 2D
//! draw has tiers 1 and 2 only. The highest matching tier wins.
use anchor_lang::prelude::*;

use crate::{
    constants::DIGIT_TIERS,
    errors::LotteryError,
    state::{PrizeTier, TicketStatus},
};

/// Best tier (1-based) for `number` against `winning`, both `digits` long.
pub fn match_tier(number: &str, winning: &str) -> Option<u8> {
    let n = winning.len();
    if number.len() != n || n == 0 {
        return None;
    }
    (1..=DIGIT_TIERS as u8)
        .filter(|tier| (*tier as usize) <= n)
        .find(|tier| {
            let suffix = n - (*tier as usize - 1);
            number[n - suffix..] == winning[n - suffix..]
        })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub status: TicketStatus,
    pub tier: u8,
    pub win_amount: u64,
}

impl Outcome {
    pub const LOST: Outcome = Outcome {
        status: TicketStatus::Lost,
        tier: 0,
        win_amount: 0,
    };

    fn won(tier: u8, win_amount: u64) -> Self {
        if win_amount == 0 {
            return Self::LOST;
        }
        Self {
            status: TicketStatus::Won,
            tier,
            win_amount,
        }
    }
}

/// Fixed-multiplier payout: `stake * multipliers[tier - 1]`.
pub fn digit_outcome(
    number: &str,
    winning: &str,
    stake: u64,
    multipliers: &[u32; 3],
) -> Result<Outcome> {
    let Some(tier) = match_tier(number, winning) else {
        return Ok(Outcome::LOST);
    };
    let win = stake
        .checked_mul(multipliers[(tier - 1) as usize] as u64)
        .ok_or(LotteryError::MathOverflow)?;
    Ok(Outcome::won(tier, win))
}

/// Number of trailing digits two equal-length numbers share.
pub fn common_suffix_len(number: &str, winning: &str) -> usize {
    number
        .bytes()
        .rev()
        .zip(winning.bytes().rev())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Jackpot payout: the best tier the ticket qualifies for that still has
/// winner capacity pays `prize_per_winner`. `tier_winners` is advanced.
/// `tiers` must be sorted by `match_digits`, highest first.
pub fn jackpot_outcome(
    number: &str,
    winning: &str,
    tiers: &[PrizeTier],
    tier_winners: &mut [u32],
) -> Result<Outcome> {
    require!(tiers.len() == tier_winners.len(), LotteryError::InvalidPrizeTiers);
    let matched = common_suffix_len(number, winning);

    for (i, t) in tiers.iter().enumerate() {
        if (t.match_digits as usize) > matched || tier_winners[i] >= t.winners_count {
            continue;
        }
        tier_winners[i] += 1;
        return Ok(Outcome::won((i + 1) as u8, t.prize_per_winner));
    }
    Ok(Outcome::LOST)
}

/// Tiers must name distinct digit counts within `1..=digits`, each paying
/// something to at least one winner.
pub fn validate_prize_tiers(tiers: &[PrizeTier], digits: u8) -> Result<()> {
    require!(!tiers.is_empty(), LotteryError::InvalidPrizeTiers);
    require!(
        tiers.len() <= crate::constants::MAX_JACKPOT_TIERS,
        LotteryError::InvalidPrizeTiers
    );
    for (i, t) in tiers.iter().enumerate() {
        require!(
            t.match_digits >= 1 && t.match_digits <= digits,
            LotteryError::InvalidPrizeTiers
        );
        require!(
            t.winners_count > 0 && t.prize_per_winner > 0,
            LotteryError::InvalidPrizeTiers
        );
        require!(
            !tiers[..i].iter().any(|o| o.match_digits == t.match_digits),
            LotteryError::InvalidPrizeTiers
        );
    }
    Ok(())
}

/// Highest `match_digits` first.
pub fn sort_prize_tiers(tiers: &mut [PrizeTier]) {
    tiers.sort_by(|a, b| b.match_digits.cmp(&a.match_digits));
}

pub fn validate_multipliers(multipliers: &[u32; 3], digits: u8) -> Result<()> {
    require!(multipliers[0] > 0, LotteryError::InvalidMultipliers);
    // tiers past the number length never match
    for (i, m) in multipliers.iter().enumerate() {
        if i >= digits as usize {
            require!(*m == 0, LotteryError::InvalidMultipliers);
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct PreviewTotals {
    pub total_sales: u64,
    pub total_payout: u64,
    pub estimated_profit: i64,
    pub winners: [u32; 3],
    pub tier_payout: [u64; 3],
}

impl PreviewTotals {
    pub fn add_sale(&mut self, amount: u64) -> Result<()> {
        self.total_sales = self
            .total_sales
            .checked_add(amount)
            .ok_or(LotteryError::MathOverflow)?;
        Ok(())
    }

    pub fn add_winner(&mut self, tier: u8, payout: u64) -> Result<()> {
        let i = (tier as usize)
            .checked_sub(1)
            .filter(|i| *i < DIGIT_TIERS)
            .ok_or(LotteryError::InvalidPrizeTiers)?;
        self.winners[i] += 1;
        self.tier_payout[i] = self.tier_payout[i]
            .checked_add(payout)
            .ok_or(LotteryError::MathOverflow)?;
        self.total_payout = self
            .total_payout
            .checked_add(payout)
            .ok_or(LotteryError::MathOverflow)?;
        Ok(())
    }

    pub fn finish(&mut self) {
        self.estimated_profit = (self.total_sales as i128 - self.total_payout as i128)
            .clamp(i64::MIN as i128, i64::MAX as i128) as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_tiers_for_four_digits() {
        assert_eq!(match_tier("0729", "0729"), Some(1));
        assert_eq!(match_tier("1729", "0729"), Some(2));
        assert_eq!(match_tier("1129", "0729"), Some(3));
        assert_eq!(match_tier("1119", "0729"), None);
    }

    #[test]
    fn two_digit_draw_has_two_tiers() {
        assert_eq!(match_tier("42", "42"), Some(1));
        assert_eq!(match_tier("12", "42"), Some(2));
        assert_eq!(match_tier("17", "42"), None);
        // no zero-length suffix tier
        assert_eq!(match_tier("11", "42"), None);
    }

    #[test]
    fn two_d_settlement_scenario() {
        let multipliers = [90, 0, 0];
        let win = digit_outcome("42", "42", 10, &multipliers).unwrap();
        assert_eq!(win.status, TicketStatus::Won);
        assert_eq!(win.win_amount, 900);
        assert_eq!(win.tier, 1);

        let lose = digit_outcome("17", "42", 10, &multipliers).unwrap();
        assert_eq!(lose, Outcome::LOST);

        // tier 2 with a zero multiplier pays nothing
        assert_eq!(digit_outcome("12", "42", 10, &multipliers).unwrap(), Outcome::LOST);
    }

    #[test]
    fn same_number_tickets_win_independently() {
        let m = [900, 90, 9];
        let a = digit_outcome("0729", "0729", 10, &m).unwrap();
        let b = digit_outcome("0729", "0729", 25, &m).unwrap();
        assert_eq!(a.win_amount, 9_000);
        assert_eq!(b.win_amount, 22_500);
    }

    #[test]
    fn jackpot_tier_overflow_falls_through() {
        let mut tiers = vec![
            PrizeTier { match_digits: 2, winners_count: 5, prize_per_winner: 10 },
            PrizeTier { match_digits: 4, winners_count: 1, prize_per_winner: 1_000 },
        ];
        sort_prize_tiers(&mut tiers);
        validate_prize_tiers(&tiers, 4).unwrap();
        let mut paid = vec![0u32; 2];

        let first = jackpot_outcome("1234", "1234", &tiers, &mut paid).unwrap();
        assert_eq!((first.tier, first.win_amount), (1, 1_000));
        let second = jackpot_outcome("1234", "1234", &tiers, &mut paid).unwrap();
        assert_eq!((second.tier, second.win_amount), (2, 10));
        let miss = jackpot_outcome("9999", "1234", &tiers, &mut paid).unwrap();
        assert_eq!(miss, Outcome::LOST);
        assert_eq!(paid, vec![1, 1]);
    }

    #[test]
    fn prize_tier_validation() {
        let t = |d, w, p| PrizeTier { match_digits: d, winners_count: w, prize_per_winner: p };
        assert!(validate_prize_tiers(&[], 4).is_err());
        assert!(validate_prize_tiers(&[t(5, 1, 1)], 4).is_err());
        assert!(validate_prize_tiers(&[t(4, 0, 1)], 4).is_err());
        assert!(validate_prize_tiers(&[t(4, 1, 1), t(4, 2, 1)], 4).is_err());
        assert!(validate_prize_tiers(&[t(4, 1, 100), t(3, 2, 10)], 4).is_ok());
    }

    #[test]
    fn multipliers_beyond_number_length_rejected() {
        assert!(validate_multipliers(&[90, 9, 0], 2).is_ok());
        assert!(validate_multipliers(&[90, 9, 1], 2).is_err());
        assert!(validate_multipliers(&[0, 9, 1], 3).is_err());
    }

    #[test]
    fn preview_totals() {
        let mut t = PreviewTotals::default();
        t.add_sale(100).unwrap();
        t.add_sale(50).unwrap();
        t.add_winner(1, 900).unwrap();
        t.add_winner(2, 90).unwrap();
        t.finish();
        assert_eq!(t.total_payout, 990);
        assert_eq!(t.estimated_profit, -840);
        assert_eq!(t.winners, [1, 1, 0]);
        assert!(t.add_winner(0, 1).is_err());
    }
}

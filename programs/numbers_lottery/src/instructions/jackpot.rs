use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    events::{DrawResultDeclared, JackpotSaved, JackpotStatusChanged},
    instructions::admin::require_operator,
    settlement::{sort_prize_tiers, validate_prize_tiers},
    state::{JackpotDraw, JackpotStatus, PrizeTier},
    utils::{
        load_program_account, result_digest, store_program_account, validate_name, validate_number,
        JackpotArgs, JackpotPatch,
    },
    CreateJackpotDraw, ManageJackpot, RefreshJackpotGuarantee, MAX_JACKPOT_DIGITS, MAX_SWEEP_BATCH,
    MIN_DIGITS,
};

fn validate_pct(pct: u8) -> Result<()> {
    require!((1..=100).contains(&pct), LotteryError::InvalidPercentage);
    Ok(())
}

fn prepared_tiers(mut tiers: Vec<PrizeTier>, digits: u8) -> Result<Vec<PrizeTier>> {
    validate_prize_tiers(&tiers, digits)?;
    sort_prize_tiers(&mut tiers);
    Ok(tiers)
}

fn set_status(jp: &mut JackpotDraw, jackpot_key: Pubkey, to: JackpotStatus, actor: Pubkey, now: i64) -> Result<()> {
    let from = jp.status;
    require!(from.can_advance_to(to), LotteryError::InvalidStatusTransition);
    jp.status = to;
    if to == JackpotStatus::Locked {
        jp.locked_at = now;
    }
    emit!(JackpotStatusChanged {
        actor,
        jackpot: jackpot_key,
        from,
        to,
    });
    Ok(())
}

pub fn create_jackpot_draw(
    ctx: Context<CreateJackpotDraw>,
    jackpot_id: u64,
    args: JackpotArgs,
) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    validate_name(&args.name)?;
    require!(
        (MIN_DIGITS..=MAX_JACKPOT_DIGITS).contains(&args.digits),
        LotteryError::InvalidDigits
    );
    require!(args.ticket_price > 0, LotteryError::InvalidAmount);
    require!(args.total_capacity > 0, LotteryError::InvalidAmount);
    validate_pct(args.guaranteed_sales_pct)?;
    let tiers = prepared_tiers(args.tiers, args.digits)?;

    let now = Clock::get()?.unix_timestamp;
    require!(args.draw_at > now, LotteryError::InvalidDrawTime);

    let jp = &mut ctx.accounts.jackpot;
    jp.jackpot_id = jackpot_id;
    jp.bump = ctx.bumps.jackpot;
    jp.name = args.name;
    jp.digits = args.digits;
    jp.ticket_price = args.ticket_price;
    jp.total_capacity = args.total_capacity;
    jp.guaranteed_sales_pct = args.guaranteed_sales_pct;
    jp.tier_winners = vec![0; tiers.len()];
    jp.tiers = tiers;
    jp.status = JackpotStatus::Created;
    jp.draw_at = args.draw_at;
    jp.winning_number = 0;
    jp.result_declared = false;
    jp.result_digest = [0u8; 32];
    jp.ticket_count = 0;
    jp.sales = 0;
    jp.settled_count = 0;
    jp.total_payout = 0;
    jp.created_at = now;
    jp.updated_at = now;
    jp.locked_at = 0;
    jp.settled_at = 0;

    emit!(JackpotSaved {
        actor,
        jackpot: jp.key(),
        status: jp.status,
    });
    Ok(())
}

/// Field edits are allowed until the draw locks. Status only moves forward and
/// never to Settled here; settlement owns that edge.
pub fn update_jackpot_draw(ctx: Context<ManageJackpot>, patch: JackpotPatch) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let now = Clock::get()?.unix_timestamp;
    let jackpot_key = ctx.accounts.jackpot.key();
    let jp = &mut ctx.accounts.jackpot;
    require!(jp.status != JackpotStatus::Settled, LotteryError::DrawAlreadySettled);
    require!(jp.status != JackpotStatus::Locked, LotteryError::DrawImmutable);

    if let Some(name) = patch.name {
        validate_name(&name)?;
        jp.name = name;
    }
    if let Some(price) = patch.ticket_price {
        require!(price > 0, LotteryError::InvalidAmount);
        require!(jp.ticket_count == 0, LotteryError::DrawImmutable);
        jp.ticket_price = price;
    }
    if let Some(capacity) = patch.total_capacity {
        require!(capacity > 0, LotteryError::InvalidAmount);
        require!(capacity >= jp.ticket_count, LotteryError::CapacityReached);
        jp.total_capacity = capacity;
    }
    if let Some(pct) = patch.guaranteed_sales_pct {
        validate_pct(pct)?;
        jp.guaranteed_sales_pct = pct;
    }
    if let Some(tiers) = patch.tiers {
        let tiers = prepared_tiers(tiers, jp.digits)?;
        jp.tier_winners = vec![0; tiers.len()];
        jp.tiers = tiers;
    }
    if let Some(draw_at) = patch.draw_at {
        require!(draw_at > now, LotteryError::InvalidDrawTime);
        jp.draw_at = draw_at;
    }
    if let Some(to) = patch.status {
        require!(to != JackpotStatus::Settled, LotteryError::InvalidStatusTransition);
        if to != jp.status {
            set_status(jp, jackpot_key, to, actor, now)?;
        }
    }
    jp.updated_at = now;

    emit!(JackpotSaved {
        actor,
        jackpot: jackpot_key,
        status: jp.status,
    });
    Ok(())
}

/// Scheduled: marks every supplied Open jackpot that reached its guaranteed
/// sales threshold as Guaranteed.
pub fn refresh_jackpot_guarantee<'info>(
    ctx: Context<'_, '_, 'info, 'info, RefreshJackpotGuarantee<'info>>,
) -> Result<()> {
    let remaining = ctx.remaining_accounts;
    require!(remaining.len() <= MAX_SWEEP_BATCH, LotteryError::BatchTooLarge);

    let now = Clock::get()?.unix_timestamp;
    let actor = ctx.accounts.cranker.key();

    let mut due: Vec<(usize, JackpotDraw)> = Vec::new();
    for (i, ai) in remaining.iter().enumerate() {
        let jp: JackpotDraw = load_program_account(ai, ctx.program_id)?;
        if jp.status == JackpotStatus::Open && jp.guarantee_reached() {
            due.push((i, jp));
        }
    }

    let guaranteed = due.len();
    for (i, mut jp) in due {
        let ai = &remaining[i];
        set_status(&mut jp, *ai.key, JackpotStatus::Guaranteed, actor, now)?;
        jp.updated_at = now;
        store_program_account(ai, &jp)?;
    }

    msg!("{} jackpots reached their guarantee", guaranteed);
    Ok(())
}

/// Records the winning number of a locked jackpot. Declared once.
pub fn declare_jackpot_result(ctx: Context<ManageJackpot>, number: String) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let jackpot_key = ctx.accounts.jackpot.key();
    let jp = &mut ctx.accounts.jackpot;
    validate_number(&number, jp.digits)?;
    require!(jp.status == JackpotStatus::Locked, LotteryError::DrawNotLocked);
    require!(!jp.result_declared, LotteryError::DrawImmutable);

    let winning: u32 = number
        .parse()
        .map_err(|_| error!(LotteryError::InvalidNumber))?;
    jp.winning_number = winning;
    jp.result_declared = true;
    jp.result_digest = result_digest(&jackpot_key, &[winning]);
    jp.updated_at = Clock::get()?.unix_timestamp;

    emit!(DrawResultDeclared {
        actor,
        draw: jackpot_key,
        results: vec![winning],
        result_digest: jp.result_digest,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_validated_then_sorted() {
        let t = |d, w, p| PrizeTier { match_digits: d, winners_count: w, prize_per_winner: p };
        let sorted = prepared_tiers(vec![t(2, 10, 5), t(6, 1, 100_000), t(4, 3, 500)], 6).unwrap();
        let order: Vec<u8> = sorted.iter().map(|x| x.match_digits).collect();
        assert_eq!(order, vec![6, 4, 2]);

        assert!(prepared_tiers(vec![t(7, 1, 1)], 6).is_err());
        assert!(prepared_tiers(vec![t(3, 1, 1), t(3, 2, 1)], 6).is_err());
    }

    #[test]
    fn guaranteed_pct_bounds() {
        assert!(validate_pct(0).is_err());
        assert!(validate_pct(1).is_ok());
        assert!(validate_pct(100).is_ok());
        assert!(validate_pct(101).is_err());
    }
}

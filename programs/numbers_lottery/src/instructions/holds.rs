use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    events::{HoldsReleased, NumbersHeld},
    instructions::admin::require_not_paused,
    seats::{apply_hold, check_holdable, is_reclaimable, HoldDecision},
    state::{Seat, SeatStatus},
    utils::{
        create_pda_account, is_uninitialized, load_program_account, store_program_account,
        validate_number_set, HoldReceipt, SEAT_SEED,
    },
    HoldNumbers, ReleaseExpiredHolds, MAX_SWEEP_BATCH,
};

/// Reserves every requested number for the caller, or none of them.
///
/// remaining_accounts: one seat PDA `[SEAT_SEED, slot, number]` per number.
pub fn hold_kuber_gold_numbers<'info>(
    ctx: Context<'_, '_, 'info, 'info, HoldNumbers<'info>>,
    numbers: Vec<String>,
) -> Result<HoldReceipt> {
    let slot = &ctx.accounts.slot;
    validate_number_set(numbers.iter().map(|s| s.as_str()), slot.digits)?;
    let seat_ais = ctx.remaining_accounts;
    require!(seat_ais.len() == numbers.len(), LotteryError::AccountListMismatch);

    let cfg = &ctx.accounts.config;
    require_not_paused(cfg)?;
    let now = Clock::get()?.unix_timestamp;
    slot.check_selling(now)?;

    let slot_key = slot.key();
    let user_key = ctx.accounts.user.key();

    // pass 1: read every seat, reject the batch on the first conflict
    let mut plan: Vec<(HoldDecision, u8, Option<Seat>)> = Vec::with_capacity(numbers.len());
    for (ai, number) in seat_ais.iter().zip(numbers.iter()) {
        let (expected, bump) = Pubkey::find_program_address(
            &[SEAT_SEED, slot_key.as_ref(), number.as_bytes()],
            ctx.program_id,
        );
        require_keys_eq!(expected, *ai.key, LotteryError::PdaMismatch);

        let seat = if is_uninitialized(ai) {
            None
        } else {
            Some(load_program_account::<Seat>(ai, ctx.program_id)?)
        };
        let decision = check_holdable(seat.as_ref(), &user_key, now)?;
        plan.push((decision, bump, seat));
    }

    // pass 2: write
    let hold_duration = cfg.hold_duration_secs;
    let hold_until = now
        .checked_add(hold_duration)
        .ok_or(LotteryError::MathOverflow)?;
    let payer = ctx.accounts.user.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();

    for ((ai, number), (decision, bump, seat)) in seat_ais.iter().zip(numbers.iter()).zip(plan) {
        match (decision, seat) {
            (HoldDecision::Create, _) => {
                create_pda_account(
                    &payer,
                    ai,
                    &system_program,
                    &[SEAT_SEED, slot_key.as_ref(), number.as_bytes(), &[bump]],
                    8 + Seat::INIT_SPACE,
                    ctx.program_id,
                )?;
                let seat = Seat {
                    slot: slot_key,
                    bump,
                    number: number.clone(),
                    status: SeatStatus::Hold,
                    owner: user_key,
                    hold_until,
                    rent_payer: user_key,
                    booked_at: 0,
                };
                store_program_account(ai, &seat)?;
            }
            (_, Some(mut seat)) => {
                apply_hold(&mut seat, &user_key, hold_until);
                store_program_account(ai, &seat)?;
            }
            (_, None) => return err!(LotteryError::SeatNotFound),
        }
    }

    emit!(NumbersHeld {
        slot: slot_key,
        user: user_key,
        numbers,
        hold_until,
    });

    Ok(HoldReceipt {
        hold_until,
        hold_duration_seconds: hold_duration,
    })
}

/// Scheduled: returns expired holds to ABSENT, refunding rent to whoever paid it.
///
/// remaining_accounts: pairs of (seat, rent receiver). Seats already closed or
/// still live are skipped, so overlapping sweeps are harmless.
pub fn release_expired_holds<'info>(
    ctx: Context<'_, '_, 'info, 'info, ReleaseExpiredHolds<'info>>,
) -> Result<()> {
    let remaining = ctx.remaining_accounts;
    require!(remaining.len() % 2 == 0, LotteryError::AccountListMismatch);
    require!(remaining.len() / 2 <= MAX_SWEEP_BATCH, LotteryError::BatchTooLarge);

    let now = Clock::get()?.unix_timestamp;

    let mut expired: Vec<(Account<'info, Seat>, &'info AccountInfo<'info>)> = Vec::new();
    for pair in remaining.chunks(2) {
        let (seat_ai, receiver_ai) = (&pair[0], &pair[1]);
        if is_uninitialized(seat_ai) || seat_ai.owner != ctx.program_id {
            continue;
        }
        let seat = Account::<Seat>::try_from(seat_ai)?;
        if !is_reclaimable(&seat, now) {
            continue;
        }
        require_keys_eq!(seat.rent_payer, *receiver_ai.key, LotteryError::AccountListMismatch);
        expired.push((seat, receiver_ai));
    }

    let released = expired.len() as u32;
    for (seat, receiver_ai) in expired {
        seat.close(receiver_ai.clone())?;
    }

    msg!("released {} expired holds", released);
    emit!(HoldsReleased { released });
    Ok(())
}

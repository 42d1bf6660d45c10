use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    events::{DigitDrawPreview, DrawSettled, JackpotStatusChanged, TicketSettled, WinnerLine},
    instructions::admin::require_operator,
    instructions::draw::settle_transition,
    instructions::slots::complete_slot,
    ledger::{signed, BalanceField, LedgerDraft, LedgerWriter},
    settlement::{digit_outcome, jackpot_outcome, Outcome, PreviewTotals},
    state::{
        game_index, DigitSlot, DrawRun, DrawRunStatus, JackpotDraw, JackpotStatus, LedgerKind,
        LedgerReason, SlotStatus, Ticket, TicketStatus, UserAccount,
    },
    utils::{format_number, load_program_account, store_program_account, USER_SEED},
    DeclareDigitDrawWinners, PreviewDigitDrawWinners, SettleDrawRun, SettleJackpotDraw,
    MAX_SETTLEMENT_BATCH,
};

#[derive(Clone, Copy, Debug, Default)]
struct ShardTotals {
    settled: u64,
    payout: u64,
}

/// Settles one shard of tickets belonging to `draw`.
///
/// remaining_accounts: (ticket, owner user account, ledger entry) triples. The
/// ledger entry of a losing ticket is left untouched.
fn settle_shard<'info, F>(
    remaining: &'info [AccountInfo<'info>],
    draw: Pubkey,
    writer: &LedgerWriter<'_, 'info>,
    now: i64,
    mut outcome_of: F,
) -> Result<ShardTotals>
where
    F: FnMut(&Ticket) -> Result<Outcome>,
{
    require!(remaining.len() % 3 == 0, LotteryError::AccountListMismatch);
    require!(
        remaining.len() / 3 <= MAX_SETTLEMENT_BATCH,
        LotteryError::BatchTooLarge
    );
    let program_id = writer.program_id;

    // pass 1: validate every triple and decide outcomes
    let mut plan: Vec<(Ticket, Outcome)> = Vec::with_capacity(remaining.len() / 3);
    for (i, triple) in remaining.chunks(3).enumerate() {
        let (ticket_ai, user_ai) = (&triple[0], &triple[1]);
        require!(
            !remaining[..3 * i]
                .chunks(3)
                .any(|prev| prev[0].key == ticket_ai.key),
            LotteryError::AccountListMismatch
        );

        let ticket: Ticket = load_program_account(ticket_ai, program_id)?;
        require_keys_eq!(ticket.draw, draw, LotteryError::TicketDrawMismatch);
        require!(!ticket.status.is_settled(), LotteryError::TicketAlreadySettled);

        let (expected_user, _) =
            Pubkey::find_program_address(&[USER_SEED, ticket.owner.as_ref()], program_id);
        require_keys_eq!(expected_user, *user_ai.key, LotteryError::PdaMismatch);

        let outcome = outcome_of(&ticket)?;
        plan.push((ticket, outcome));
    }

    // pass 2: credit winners, close out tickets
    let mut totals = ShardTotals::default();
    for (triple, (mut ticket, outcome)) in remaining.chunks(3).zip(plan) {
        let (ticket_ai, user_ai, entry_ai) = (&triple[0], &triple[1], &triple[2]);

        if outcome.status == TicketStatus::Won {
            // reloaded per ticket: one owner may appear several times in a shard
            let mut ua: UserAccount = load_program_account(user_ai, program_id)?;
            writer.post(
                &mut ua,
                BalanceField::Wallet,
                signed(outcome.win_amount)?,
                LedgerDraft::new(LedgerKind::Credit, LedgerReason::Winnings, *ticket_ai.key),
                entry_ai,
                now,
            )?;
            store_program_account(user_ai, &ua)?;
            totals.payout = totals
                .payout
                .checked_add(outcome.win_amount)
                .ok_or(LotteryError::MathOverflow)?;
        }

        ticket.status = outcome.status;
        ticket.tier = outcome.tier;
        ticket.win_amount = outcome.win_amount;
        ticket.settled_at = now;
        store_program_account(ticket_ai, &ticket)?;
        totals.settled += 1;

        emit!(TicketSettled {
            draw,
            ticket: *ticket_ai.key,
            owner: ticket.owner,
            status: outcome.status,
            tier: outcome.tier,
            win_amount: outcome.win_amount,
        });
    }

    msg!("settled {} tickets, payout {}", totals.settled, totals.payout);
    Ok(totals)
}

fn add_totals(settled_count: &mut u64, total_payout: &mut u64, shard: ShardTotals) -> Result<()> {
    *settled_count = settled_count
        .checked_add(shard.settled)
        .ok_or(LotteryError::MathOverflow)?;
    *total_payout = total_payout
        .checked_add(shard.payout)
        .ok_or(LotteryError::MathOverflow)?;
    Ok(())
}

/// Outcome of a daily-run ticket against the run's declared results.
fn run_outcome(run: &DrawRun, ticket: &Ticket) -> Result<Outcome> {
    let idx = game_index(ticket.digits)?;
    let game = &run.games[idx];
    require!(game.enabled, LotteryError::GameNotEnabled);
    let winning = format_number(run.results[idx], ticket.digits)?;
    digit_outcome(&ticket.number, &winning, ticket.amount, &game.multipliers)
}

pub fn settle_draw_run<'info>(
    ctx: Context<'_, '_, 'info, 'info, SettleDrawRun<'info>>,
) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let run_key = ctx.accounts.draw_run.key();
    let run: &mut DrawRun = &mut ctx.accounts.draw_run;
    require!(run.status != DrawRunStatus::Settled, LotteryError::DrawAlreadySettled);
    require!(
        run.status == DrawRunStatus::Drawn && run.result_declared,
        LotteryError::ResultNotDeclared
    );

    let now = Clock::get()?.unix_timestamp;
    let payer = ctx.accounts.operator.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };

    let snapshot: DrawRun = (*run).clone();
    let shard = settle_shard(ctx.remaining_accounts, run_key, &writer, now, |t| {
        run_outcome(&snapshot, t)
    })?;

    add_totals(&mut run.settled_count, &mut run.total_payout, shard)?;
    require!(run.settled_count <= run.ticket_count, LotteryError::AccountListMismatch);

    if run.settled_count == run.ticket_count {
        settle_transition(run, run_key, actor, now)?;
        emit!(DrawSettled {
            draw: run_key,
            ticket_count: run.ticket_count,
            sales: run.sales,
            total_payout: run.total_payout,
        });
    }
    Ok(())
}

/// Dry run over the supplied slot tickets; nothing is written.
///
/// remaining_accounts: the slot's tickets.
pub fn preview_digit_draw_winners<'info>(
    ctx: Context<'_, '_, 'info, 'info, PreviewDigitDrawWinners<'info>>,
) -> Result<PreviewTotals> {
    require_operator(&ctx.accounts.config, &ctx.accounts.operator.key())?;

    let slot_key = ctx.accounts.slot.key();
    let slot = &ctx.accounts.slot;
    require!(slot.result_declared, LotteryError::ResultNotDeclared);

    let tickets = ctx.remaining_accounts;
    require!(tickets.len() <= MAX_SETTLEMENT_BATCH, LotteryError::BatchTooLarge);

    let winning = format_number(slot.winning_number, slot.digits)?;
    let mut totals = PreviewTotals::default();
    let mut lines: [Vec<WinnerLine>; 3] = Default::default();

    for (i, ai) in tickets.iter().enumerate() {
        require!(
            !tickets[..i].iter().any(|o| o.key == ai.key),
            LotteryError::AccountListMismatch
        );
        let ticket: Ticket = load_program_account(ai, ctx.program_id)?;
        require_keys_eq!(ticket.draw, slot_key, LotteryError::TicketDrawMismatch);

        totals.add_sale(ticket.amount)?;
        let outcome = digit_outcome(&ticket.number, &winning, ticket.amount, &slot.multipliers)?;
        if outcome.status != TicketStatus::Won {
            continue;
        }
        totals.add_winner(outcome.tier, outcome.win_amount)?;
        lines[(outcome.tier - 1) as usize].push(WinnerLine {
            ticket: *ai.key,
            owner: ticket.owner,
            number: ticket.number,
            amount: ticket.amount,
            payout: outcome.win_amount,
        });
    }
    totals.finish();

    let [exact_winners, minus_one_winners, minus_two_winners] = lines;
    emit!(DigitDrawPreview {
        slot: slot_key,
        winning_number: winning,
        prizes: slot.multipliers,
        exact_winners,
        minus_one_winners,
        minus_two_winners,
    });
    Ok(totals)
}

pub fn declare_digit_draw_winners<'info>(
    ctx: Context<'_, '_, 'info, 'info, DeclareDigitDrawWinners<'info>>,
) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let slot_key = ctx.accounts.slot.key();
    let slot: &mut DigitSlot = &mut ctx.accounts.slot;
    require!(slot.status != SlotStatus::Completed, LotteryError::DrawAlreadySettled);
    require!(
        slot.status == SlotStatus::Running && slot.result_declared,
        LotteryError::ResultNotDeclared
    );

    let now = Clock::get()?.unix_timestamp;
    let payer = ctx.accounts.operator.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };

    let winning = format_number(slot.winning_number, slot.digits)?;
    let multipliers = slot.multipliers;
    let shard = settle_shard(ctx.remaining_accounts, slot_key, &writer, now, |t| {
        digit_outcome(&t.number, &winning, t.amount, &multipliers)
    })?;

    add_totals(&mut slot.settled_count, &mut slot.total_payout, shard)?;
    require!(slot.settled_count <= slot.ticket_count, LotteryError::AccountListMismatch);

    if slot.settled_count == slot.ticket_count {
        complete_slot(slot, slot_key, actor, now)?;
        emit!(DrawSettled {
            draw: slot_key,
            ticket_count: slot.ticket_count,
            sales: slot.sales,
            total_payout: slot.total_payout,
        });
    }
    Ok(())
}

/// Tier capacity is consumed in settlement order across shards.
pub fn settle_jackpot_draw<'info>(
    ctx: Context<'_, '_, 'info, 'info, SettleJackpotDraw<'info>>,
) -> Result<()> {
    let actor = ctx.accounts.operator.key();
    require_operator(&ctx.accounts.config, &actor)?;

    let jackpot_key = ctx.accounts.jackpot.key();
    let jp: &mut JackpotDraw = &mut ctx.accounts.jackpot;
    require!(jp.status != JackpotStatus::Settled, LotteryError::DrawAlreadySettled);
    require!(jp.status == JackpotStatus::Locked, LotteryError::DrawNotLocked);
    require!(jp.result_declared, LotteryError::ResultNotDeclared);

    let now = Clock::get()?.unix_timestamp;
    let payer = ctx.accounts.operator.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };

    let winning = format_number(jp.winning_number, jp.digits)?;
    let tiers = jp.tiers.clone();
    let mut tier_winners = jp.tier_winners.clone();
    let shard = settle_shard(ctx.remaining_accounts, jackpot_key, &writer, now, |t| {
        jackpot_outcome(&t.number, &winning, &tiers, &mut tier_winners)
    })?;

    jp.tier_winners = tier_winners;
    add_totals(&mut jp.settled_count, &mut jp.total_payout, shard)?;
    require!(jp.settled_count <= jp.ticket_count, LotteryError::AccountListMismatch);
    jp.updated_at = now;

    if jp.settled_count == jp.ticket_count {
        jp.status = JackpotStatus::Settled;
        jp.settled_at = now;
        emit!(JackpotStatusChanged {
            actor,
            jackpot: jackpot_key,
            from: JackpotStatus::Locked,
            to: JackpotStatus::Settled,
        });
        emit!(DrawSettled {
            draw: jackpot_key,
            ticket_count: jp.ticket_count,
            sales: jp.sales,
            total_payout: jp.total_payout,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DigitGame, Product};

    fn run() -> DrawRun {
        DrawRun {
            template: Pubkey::new_unique(),
            template_id: 1,
            date: 20_261_020,
            bump: 255,
            status: DrawRunStatus::Drawn,
            draw_at: 0,
            games: [
                DigitGame { enabled: true, multipliers: [90, 9, 0] },
                DigitGame::default(),
                DigitGame { enabled: true, multipliers: [9_000, 900, 90] },
            ],
            results: [42, 0, 729],
            result_declared: true,
            result_digest: [0u8; 32],
            sales: 0,
            ticket_count: 0,
            settled_count: 0,
            total_payout: 0,
            created_at: 0,
            locked_at: 0,
            drawn_at: 0,
            settled_at: 0,
        }
    }

    fn ticket(digits: u8, number: &str, amount: u64) -> Ticket {
        Ticket {
            owner: Pubkey::new_unique(),
            draw: Pubkey::new_unique(),
            product: Product::DrawRun,
            index: 0,
            bump: 255,
            digits,
            number: number.to_string(),
            amount,
            status: TicketStatus::Pending,
            win_amount: 0,
            tier: 0,
            locked_at: 0,
            created_at: 0,
            settled_at: 0,
        }
    }

    #[test]
    fn run_tickets_use_their_own_digit_game() {
        let r = run();
        let two = run_outcome(&r, &ticket(2, "42", 10)).unwrap();
        assert_eq!((two.status, two.win_amount), (TicketStatus::Won, 900));

        // 4D result is rendered with its leading zero
        let four = run_outcome(&r, &ticket(4, "1729", 2)).unwrap();
        assert_eq!((four.tier, four.win_amount), (2, 1_800));

        assert_eq!(run_outcome(&r, &ticket(2, "17", 10)).unwrap(), Outcome::LOST);
        assert!(run_outcome(&r, &ticket(3, "729", 10)).is_err());
    }

    #[test]
    fn shard_totals_accumulate() {
        let (mut settled, mut payout) = (3u64, 100u64);
        add_totals(&mut settled, &mut payout, ShardTotals { settled: 2, payout: 900 }).unwrap();
        assert_eq!((settled, payout), (5, 1_000));

        let mut big = u64::MAX;
        assert!(add_totals(&mut settled, &mut big, ShardTotals { settled: 0, payout: 1 }).is_err());
    }

    #[test]
    fn shard_totals_land_on_the_run() {
        let mut r = run();
        let run: &mut DrawRun = &mut r;
        let snapshot: DrawRun = (*run).clone();
        add_totals(&mut run.settled_count, &mut run.total_payout, ShardTotals { settled: 4, payout: 1_800 })
            .unwrap();
        add_totals(&mut run.settled_count, &mut run.total_payout, ShardTotals { settled: 1, payout: 0 })
            .unwrap();
        assert_eq!((r.settled_count, r.total_payout), (5, 1_800));
        assert_eq!((snapshot.settled_count, snapshot.total_payout), (0, 0));
    }
}

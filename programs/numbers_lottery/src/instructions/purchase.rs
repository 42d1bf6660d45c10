use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    events::{JackpotStatusChanged, TicketsPurchased},
    funding::{consume_bonus_fifo, split_funding, spendable_bonus},
    instructions::admin::require_not_paused,
    instructions::bonus::{load_active_grants, store_grants},
    ledger::{signed, BalanceField, LedgerDraft, LedgerWriter},
    seats::{apply_booking, check_purchasable},
    state::{
        game_index, DigitSlot, DrawRun, DrawRunStatus, JackpotDraw, JackpotStatus, LedgerKind,
        LedgerReason, Product, Seat, Ticket, TicketStatus,
    },
    utils::{
        create_pda_account, is_uninitialized, load_program_account, store_program_account,
        validate_number_set, NumberStake, SEAT_SEED, TICKET_SEED,
    },
    PurchaseDrawTicket, PurchaseJackpotTicket, PurchaseSlotTicket,
};

/// Creates ticket PDAs `[TICKET_SEED, draw, index]` for one purchase.
pub(crate) struct TicketMint<'a, 'info> {
    pub payer: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
    pub program_id: &'a Pubkey,
    pub draw: Pubkey,
    pub owner: Pubkey,
    pub product: Product,
    pub digits: u8,
    pub status: TicketStatus,
    pub locked_at: i64,
    pub now: i64,
}

impl<'a, 'info> TicketMint<'a, 'info> {
    /// Checks every ticket slot before anything is written; returns the bumps.
    pub fn verify(&self, tickets: &[AccountInfo<'info>], first_index: u64) -> Result<Vec<u8>> {
        let mut bumps = Vec::with_capacity(tickets.len());
        for (i, ai) in tickets.iter().enumerate() {
            let index = first_index
                .checked_add(i as u64)
                .ok_or(LotteryError::MathOverflow)?;
            let (expected, bump) = Pubkey::find_program_address(
                &[TICKET_SEED, self.draw.as_ref(), &index.to_le_bytes()],
                self.program_id,
            );
            require_keys_eq!(expected, *ai.key, LotteryError::PdaMismatch);
            require!(is_uninitialized(ai), LotteryError::AlreadyExists);
            bumps.push(bump);
        }
        Ok(bumps)
    }

    pub fn create(
        &self,
        ai: &AccountInfo<'info>,
        index: u64,
        bump: u8,
        number: &str,
        amount: u64,
    ) -> Result<()> {
        let index_le = index.to_le_bytes();
        create_pda_account(
            self.payer,
            ai,
            self.system_program,
            &[TICKET_SEED, self.draw.as_ref(), &index_le, &[bump]],
            8 + Ticket::INIT_SPACE,
            self.program_id,
        )?;

        let ticket = Ticket {
            owner: self.owner,
            draw: self.draw,
            product: self.product,
            index,
            bump,
            digits: self.digits,
            number: number.to_string(),
            amount,
            status: self.status,
            win_amount: 0,
            tier: 0,
            locked_at: self.locked_at,
            created_at: self.now,
            settled_at: 0,
        };
        store_program_account(ai, &ticket)
    }
}

fn add_counts(sales: &mut u64, tickets: &mut u64, amount: u64, count: usize) -> Result<()> {
    *sales = sales.checked_add(amount).ok_or(LotteryError::MathOverflow)?;
    *tickets = tickets
        .checked_add(count as u64)
        .ok_or(LotteryError::MathOverflow)?;
    Ok(())
}

/// Validates an unconstrained stake map and returns the total stake.
pub(crate) fn total_stake(stakes: &[NumberStake], digits: u8) -> Result<u64> {
    validate_number_set(stakes.iter().map(|s| s.number.as_str()), digits)?;
    stakes.iter().try_fold(0u64, |acc, s| {
        require!(s.amount > 0, LotteryError::InvalidAmount);
        acc.checked_add(s.amount)
            .ok_or_else(|| error!(LotteryError::MathOverflow))
    })
}

/// Stake-per-number purchase on a daily draw run (2D/3D/4D).
pub fn purchase_draw_ticket<'info>(
    ctx: Context<'_, '_, 'info, 'info, PurchaseDrawTicket<'info>>,
    digits: u8,
    stakes: Vec<NumberStake>,
) -> Result<()> {
    let idx = game_index(digits)?;
    let total = total_stake(&stakes, digits)?;
    let tickets = ctx.remaining_accounts;
    require!(tickets.len() == stakes.len(), LotteryError::AccountListMismatch);

    require_not_paused(&ctx.accounts.config)?;
    let now = Clock::get()?.unix_timestamp;

    // (1) funds
    require!(
        ctx.accounts.user_account.available_balance() >= total,
        LotteryError::InsufficientAvailableBalance
    );

    // (2) draw state
    let run_key = ctx.accounts.draw_run.key();
    let run: &mut DrawRun = &mut ctx.accounts.draw_run;
    require!(run.status == DrawRunStatus::Open, LotteryError::DrawNotOpen);
    require!(now < run.draw_at, LotteryError::SalesClosed);
    require!(run.games[idx].enabled, LotteryError::GameNotEnabled);

    let user_key = ctx.accounts.user.key();
    let payer = ctx.accounts.user.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let mint = TicketMint {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
        draw: run_key,
        owner: user_key,
        product: Product::DrawRun,
        digits,
        status: TicketStatus::Pending,
        locked_at: run.locked_at,
        now,
    };
    let first_index = run.ticket_count;
    let bumps = mint.verify(tickets, first_index)?;

    // (3) one debit for the whole stake
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };
    writer.post(
        &mut ctx.accounts.user_account,
        BalanceField::Wallet,
        -signed(total)?,
        LedgerDraft::new(LedgerKind::Debit, LedgerReason::TicketPurchase, run_key),
        &ctx.accounts.ledger_entry.to_account_info(),
        now,
    )?;

    // (4) counters
    add_counts(&mut run.sales, &mut run.ticket_count, total, stakes.len())?;

    // (5) tickets
    for (i, s) in stakes.iter().enumerate() {
        mint.create(&tickets[i], first_index + i as u64, bumps[i], &s.number, s.amount)?;
    }

    emit!(TicketsPurchased {
        draw: run_key,
        user: user_key,
        ticket_count: stakes.len() as u32,
        wallet_amount: total,
        bonus_amount: 0,
    });
    Ok(())
}

pub fn purchase_2d_ticket<'info>(
    ctx: Context<'_, '_, 'info, 'info, PurchaseDrawTicket<'info>>,
    stakes: Vec<NumberStake>,
) -> Result<()> {
    purchase_draw_ticket(ctx, 2, stakes)
}

/// Seat-reserved purchase on a KuberGold slot.
///
/// remaining_accounts: seats (n), tickets (n), every ACTIVE bonus grant of the
/// user (`bonus_grant_count`), then one ledger entry per funding source used
/// (wallet first, then bonus).
pub fn purchase_kuber_gold_ticket<'info>(
    ctx: Context<'_, '_, 'info, 'info, PurchaseSlotTicket<'info>>,
    numbers: Vec<String>,
    bonus_grant_count: u8,
) -> Result<()> {
    let slot_key = ctx.accounts.slot.key();
    let digits = ctx.accounts.slot.digits;
    let n = validate_number_set(numbers.iter().map(|s| s.as_str()), digits)?;
    let k = bonus_grant_count as usize;

    let remaining = ctx.remaining_accounts;
    require!(remaining.len() >= 2 * n + k, LotteryError::AccountListMismatch);
    let (seat_ais, rest) = remaining.split_at(n);
    let (ticket_ais, rest) = rest.split_at(n);
    let (grant_ais, ledger_ais) = rest.split_at(k);

    let cfg = &ctx.accounts.config;
    require_not_paused(cfg)?;
    let now = Clock::get()?.unix_timestamp;
    let user_key = ctx.accounts.user.key();

    // (1) slot open
    let slot: &mut DigitSlot = &mut ctx.accounts.slot;
    slot.check_selling(now)?;

    // (2) amount
    let total = slot
        .ticket_price
        .checked_mul(n as u64)
        .ok_or(LotteryError::MathOverflow)?;

    // (3) bonus blend
    let ua = &mut ctx.accounts.user_account;
    let grants_before = load_active_grants(grant_ais, ua, ctx.program_id)?;
    let bonus_available = ua.bonus_balance.min(spendable_bonus(&grants_before, now));
    let split = split_funding(total, bonus_available, ua.available_balance(), cfg.bonus_cap_bps)?;

    // (4) seats: exist, held, owned, fresh
    let mut seats: Vec<Seat> = Vec::with_capacity(n);
    for (ai, number) in seat_ais.iter().zip(numbers.iter()) {
        let (expected, _) = Pubkey::find_program_address(
            &[SEAT_SEED, slot_key.as_ref(), number.as_bytes()],
            ctx.program_id,
        );
        require_keys_eq!(expected, *ai.key, LotteryError::PdaMismatch);
        let seat = if is_uninitialized(ai) {
            None
        } else {
            Some(load_program_account::<Seat>(ai, ctx.program_id)?)
        };
        check_purchasable(seat.as_ref(), &user_key, now)?;
        if let Some(seat) = seat {
            seats.push(seat);
        }
    }

    let payer = ctx.accounts.user.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let mint = TicketMint {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
        draw: slot_key,
        owner: user_key,
        product: Product::Slot,
        digits,
        status: TicketStatus::Booked,
        locked_at: 0,
        now,
    };
    let first_index = slot.ticket_count;
    let bumps = mint.verify(ticket_ais, first_index)?;

    let entries_needed = (split.wallet_to_use > 0) as usize + (split.bonus_to_use > 0) as usize;
    require!(
        ledger_ais.len() == entries_needed,
        LotteryError::LedgerAccountMissing
    );

    // ---- writes ----

    // (5) FIFO bonus consumption
    let mut grants_after = grants_before.clone();
    let used_up = consume_bonus_fifo(&mut grants_after, split.bonus_to_use, now)?;
    store_grants(grant_ais, &grants_before, &grants_after)?;
    ua.active_bonus_count = ua
        .active_bonus_count
        .checked_sub(used_up)
        .ok_or(LotteryError::BalanceUnderflow)?;

    // (6) + (8) debits, one entry per source used
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };
    let mut entries = ledger_ais.iter();
    if split.wallet_to_use > 0 {
        let ai = entries.next().ok_or(LotteryError::LedgerAccountMissing)?;
        writer.post(
            ua,
            BalanceField::Wallet,
            -signed(split.wallet_to_use)?,
            LedgerDraft::new(LedgerKind::Debit, LedgerReason::TicketPurchase, slot_key),
            ai,
            now,
        )?;
    }
    if split.bonus_to_use > 0 {
        let ai = entries.next().ok_or(LotteryError::LedgerAccountMissing)?;
        writer.post(
            ua,
            BalanceField::Bonus,
            -signed(split.bonus_to_use)?,
            LedgerDraft::new(LedgerKind::Debit, LedgerReason::TicketPurchase, slot_key),
            ai,
            now,
        )?;
    }

    // (7) seats -> booked
    for (ai, seat) in seat_ais.iter().zip(seats.iter_mut()) {
        apply_booking(seat, now);
        store_program_account(ai, seat)?;
    }

    // (9) counters
    add_counts(&mut slot.sales, &mut slot.ticket_count, total, n)?;

    // (10) tickets
    for (i, number) in numbers.iter().enumerate() {
        mint.create(&ticket_ais[i], first_index + i as u64, bumps[i], number, slot.ticket_price)?;
    }

    emit!(TicketsPurchased {
        draw: slot_key,
        user: user_key,
        ticket_count: n as u32,
        wallet_amount: split.wallet_to_use,
        bonus_amount: split.bonus_to_use,
    });
    Ok(())
}

/// Fixed-price purchase on a jackpot draw.
pub fn purchase_jackpot_ticket<'info>(
    ctx: Context<'_, '_, 'info, 'info, PurchaseJackpotTicket<'info>>,
    numbers: Vec<String>,
) -> Result<()> {
    let jackpot_key = ctx.accounts.jackpot.key();
    let digits = ctx.accounts.jackpot.digits;
    let n = validate_number_set(numbers.iter().map(|s| s.as_str()), digits)?;
    let tickets = ctx.remaining_accounts;
    require!(tickets.len() == n, LotteryError::AccountListMismatch);

    require_not_paused(&ctx.accounts.config)?;
    let now = Clock::get()?.unix_timestamp;

    let jp: &mut JackpotDraw = &mut ctx.accounts.jackpot;
    let total = jp
        .ticket_price
        .checked_mul(n as u64)
        .ok_or(LotteryError::MathOverflow)?;

    require!(
        ctx.accounts.user_account.available_balance() >= total,
        LotteryError::InsufficientAvailableBalance
    );
    require!(jp.status.is_selling(), LotteryError::DrawNotOpen);
    require!(now < jp.draw_at, LotteryError::SalesClosed);
    let sold_after = jp
        .ticket_count
        .checked_add(n as u64)
        .ok_or(LotteryError::MathOverflow)?;
    require!(sold_after <= jp.total_capacity, LotteryError::CapacityReached);

    let user_key = ctx.accounts.user.key();
    let payer = ctx.accounts.user.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let mint = TicketMint {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
        draw: jackpot_key,
        owner: user_key,
        product: Product::Jackpot,
        digits,
        status: TicketStatus::Pending,
        locked_at: 0,
        now,
    };
    let first_index = jp.ticket_count;
    let bumps = mint.verify(tickets, first_index)?;

    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };
    writer.post(
        &mut ctx.accounts.user_account,
        BalanceField::Wallet,
        -signed(total)?,
        LedgerDraft::new(LedgerKind::Debit, LedgerReason::TicketPurchase, jackpot_key),
        &ctx.accounts.ledger_entry.to_account_info(),
        now,
    )?;

    add_counts(&mut jp.sales, &mut jp.ticket_count, total, n)?;
    jp.updated_at = now;

    for (i, number) in numbers.iter().enumerate() {
        mint.create(&tickets[i], first_index + i as u64, bumps[i], number, jp.ticket_price)?;
    }

    if jp.status == JackpotStatus::Open && jp.guarantee_reached() {
        jp.status = JackpotStatus::Guaranteed;
        emit!(JackpotStatusChanged {
            actor: user_key,
            jackpot: jackpot_key,
            from: JackpotStatus::Open,
            to: JackpotStatus::Guaranteed,
        });
    }

    emit!(TicketsPurchased {
        draw: jackpot_key,
        user: user_key,
        ticket_count: n as u32,
        wallet_amount: total,
        bonus_amount: 0,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stake(number: &str, amount: u64) -> NumberStake {
        NumberStake {
            number: number.to_string(),
            amount,
        }
    }

    #[test]
    fn stake_totals_and_validation() {
        assert_eq!(total_stake(&[stake("42", 50), stake("17", 60)], 2).unwrap(), 110);
        assert!(total_stake(&[stake("42", 0)], 2).is_err());
        assert!(total_stake(&[stake("42", 5), stake("42", 5)], 2).is_err());
        assert!(total_stake(&[stake("421", 5)], 2).is_err());
        assert!(total_stake(&[], 2).is_err());
        assert!(total_stake(&[stake("42", u64::MAX), stake("17", 1)], 2).is_err());
    }

    #[test]
    fn sale_counters_accumulate_per_purchase() {
        let (mut sales, mut tickets) = (0u64, 0u64);
        add_counts(&mut sales, &mut tickets, 110, 2).unwrap();
        add_counts(&mut sales, &mut tickets, 30, 1).unwrap();
        assert_eq!((sales, tickets), (140, 3));

        let mut full = u64::MAX;
        assert!(add_counts(&mut full, &mut tickets, 1, 1).is_err());
        assert!(add_counts(&mut sales, &mut full, 0, 1).is_err());
    }
}

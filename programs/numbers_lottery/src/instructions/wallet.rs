// programs/numbers_lottery/src/instructions/wallet.rs
use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::{
    errors::LotteryError,
    events::{WithdrawResolved, WithdrawSubmitted},
    instructions::admin::{require_admin, require_not_paused},
    ledger::{signed, BalanceField, LedgerDraft, LedgerWriter},
    state::{LedgerKind, LedgerReason, WithdrawStatus},
    ApproveWithdraw, Deposit, InitUserAccount, RejectWithdraw, SubmitWithdraw,
};

/// Creates the caller's balance account.
pub fn init_user_account(ctx: Context<InitUserAccount>) -> Result<()> {
    let ua = &mut ctx.accounts.user_account;
    let now = Clock::get()?.unix_timestamp;

    ua.owner = ctx.accounts.user.key();
    ua.bump = ctx.bumps.user_account;
    ua.wallet_balance = 0;
    ua.locked_balance = 0;
    ua.bonus_balance = 0;
    ua.ledger_count = 0;
    ua.bonus_count = 0;
    ua.active_bonus_count = 0;
    ua.withdraw_count = 0;
    ua.created_at = now;
    ua.updated_at = now;

    Ok(())
}

/// User moves cash tokens into the treasury; credited to the wallet balance.
pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    require!(amount > 0, LotteryError::InvalidAmount);
    require_not_paused(&ctx.accounts.config)?;

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.user_cash_ata.to_account_info(),
                to: ctx.accounts.treasury.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        amount,
    )?;

    let now = Clock::get()?.unix_timestamp;
    let payer = ctx.accounts.user.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };
    let reference = ctx.accounts.user_cash_ata.key();

    writer.post(
        &mut ctx.accounts.user_account,
        BalanceField::Wallet,
        signed(amount)?,
        LedgerDraft::new(LedgerKind::Credit, LedgerReason::Deposit, reference),
        &ctx.accounts.ledger_entry.to_account_info(),
        now,
    )
}

/// Locks `amount` of the available balance against a new withdraw request.
pub fn submit_withdraw(ctx: Context<SubmitWithdraw>, amount: u64) -> Result<()> {
    require!(amount > 0, LotteryError::InvalidAmount);
    let cfg = &ctx.accounts.config;
    require_not_paused(cfg)?;
    if cfg.max_withdraw_per_request > 0 {
        require!(
            amount <= cfg.max_withdraw_per_request,
            LotteryError::WithdrawAboveLimit
        );
    }

    let ua = &mut ctx.accounts.user_account;
    require!(
        ua.available_balance() >= amount,
        LotteryError::InsufficientAvailableBalance
    );

    let now = Clock::get()?.unix_timestamp;
    let seq = ua.withdraw_count;
    let request_key = ctx.accounts.withdraw_request.key();

    let payer = ctx.accounts.user.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };
    writer.post(
        ua,
        BalanceField::Locked,
        signed(amount)?,
        LedgerDraft::new(LedgerKind::Lock, LedgerReason::WithdrawRequested, request_key),
        &ctx.accounts.ledger_entry.to_account_info(),
        now,
    )?;
    ua.withdraw_count = seq.checked_add(1).ok_or(LotteryError::MathOverflow)?;

    let req = &mut ctx.accounts.withdraw_request;
    req.user = ua.owner;
    req.seq = seq;
    req.bump = ctx.bumps.withdraw_request;
    req.amount = amount;
    req.status = WithdrawStatus::Pending;
    req.created_at = now;
    req.resolved_at = 0;

    emit!(WithdrawSubmitted {
        user: req.user,
        request: request_key,
        amount,
    });
    Ok(())
}

/// Pays a pending request out of the treasury: unlock, then debit.
pub fn approve_withdraw(ctx: Context<ApproveWithdraw>) -> Result<()> {
    let cfg = &ctx.accounts.config;
    require_admin(cfg, &ctx.accounts.admin.key())?;
    require!(
        ctx.accounts.withdraw_request.status == WithdrawStatus::Pending,
        LotteryError::WithdrawAlreadyResolved
    );

    let amount = ctx.accounts.withdraw_request.amount;
    let request_key = ctx.accounts.withdraw_request.key();
    let now = Clock::get()?.unix_timestamp;

    // Prepare signer seeds BEFORE CPI (no &mut borrow)
    let signer_seeds: &[&[&[u8]]] = &[&[crate::CONFIG_SEED, &[cfg.bump]]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.treasury.to_account_info(),
                to: ctx.accounts.user_cash_ata.to_account_info(),
                authority: cfg.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    let payer = ctx.accounts.admin.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };
    let delta = signed(amount)?;
    let ua = &mut ctx.accounts.user_account;

    writer.post(
        ua,
        BalanceField::Locked,
        -delta,
        LedgerDraft::new(LedgerKind::Unlock, LedgerReason::WithdrawPaid, request_key),
        &ctx.accounts.unlock_entry.to_account_info(),
        now,
    )?;
    writer.post(
        ua,
        BalanceField::Wallet,
        -delta,
        LedgerDraft::new(LedgerKind::Debit, LedgerReason::WithdrawPaid, request_key),
        &ctx.accounts.debit_entry.to_account_info(),
        now,
    )?;

    let req = &mut ctx.accounts.withdraw_request;
    req.status = WithdrawStatus::Approved;
    req.resolved_at = now;

    emit!(WithdrawResolved {
        actor: ctx.accounts.admin.key(),
        user: req.user,
        request: request_key,
        amount,
        status: req.status,
    });
    Ok(())
}

/// Releases the locked amount back to the available balance.
pub fn reject_withdraw(ctx: Context<RejectWithdraw>) -> Result<()> {
    require_admin(&ctx.accounts.config, &ctx.accounts.admin.key())?;
    require!(
        ctx.accounts.withdraw_request.status == WithdrawStatus::Pending,
        LotteryError::WithdrawAlreadyResolved
    );

    let amount = ctx.accounts.withdraw_request.amount;
    let request_key = ctx.accounts.withdraw_request.key();
    let now = Clock::get()?.unix_timestamp;

    let payer = ctx.accounts.admin.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };
    writer.post(
        &mut ctx.accounts.user_account,
        BalanceField::Locked,
        -signed(amount)?,
        LedgerDraft::new(LedgerKind::Unlock, LedgerReason::WithdrawRejected, request_key),
        &ctx.accounts.ledger_entry.to_account_info(),
        now,
    )?;

    let req = &mut ctx.accounts.withdraw_request;
    req.status = WithdrawStatus::Rejected;
    req.resolved_at = now;

    emit!(WithdrawResolved {
        actor: ctx.accounts.admin.key(),
        user: req.user,
        request: request_key,
        amount,
        status: req.status,
    });
    Ok(())
}

use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    events::{BonusGranted, BonusesExpired},
    funding::expire_grants,
    instructions::admin::require_operator,
    ledger::{signed, BalanceField, LedgerDraft, LedgerWriter},
    state::{BonusGrant, BonusStatus, LedgerKind, LedgerReason, UserAccount},
    utils::{load_program_account, store_program_account},
    ExpireUserBonuses, GrantBonus, MAX_ACTIVE_BONUS_GRANTS, MAX_SWEEP_BATCH,
};

fn check_grant_capacity(user: &UserAccount) -> Result<()> {
    require!(
        user.active_bonus_count < MAX_ACTIVE_BONUS_GRANTS,
        LotteryError::TooManyActiveBonusGrants
    );
    Ok(())
}

pub fn grant_bonus(ctx: Context<GrantBonus>, amount: u64, expires_at: i64) -> Result<()> {
    require_operator(&ctx.accounts.config, &ctx.accounts.operator.key())?;
    require!(amount > 0, LotteryError::InvalidAmount);
    check_grant_capacity(&ctx.accounts.user_account)?;

    let now = Clock::get()?.unix_timestamp;
    require!(expires_at > now, LotteryError::InvalidWindow);

    let grant_key = ctx.accounts.bonus_grant.key();
    let payer = ctx.accounts.operator.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let writer = LedgerWriter {
        payer: &payer,
        system_program: &system_program,
        program_id: ctx.program_id,
    };

    let ua = &mut ctx.accounts.user_account;
    let seq = ua.bonus_count;
    writer.post(
        ua,
        BalanceField::Bonus,
        signed(amount)?,
        LedgerDraft::new(LedgerKind::Credit, LedgerReason::BonusGranted, grant_key),
        &ctx.accounts.ledger_entry.to_account_info(),
        now,
    )?;
    ua.bonus_count = seq.checked_add(1).ok_or(LotteryError::MathOverflow)?;
    ua.active_bonus_count = ua
        .active_bonus_count
        .checked_add(1)
        .ok_or(LotteryError::MathOverflow)?;

    let g = &mut ctx.accounts.bonus_grant;
    g.user = ua.owner;
    g.seq = seq;
    g.bump = ctx.bumps.bonus_grant;
    g.amount = amount;
    g.remaining = amount;
    g.status = BonusStatus::Active;
    g.expires_at = expires_at;
    g.created_at = now;

    emit!(BonusGranted {
        actor: ctx.accounts.operator.key(),
        user: g.user,
        grant: grant_key,
        amount,
        expires_at,
    });
    Ok(())
}

/// Loads every ACTIVE grant of `user` from `accounts`.
///
/// The list must be complete (its length equals `active_bonus_count`) so the
/// grants always add up to the bonus balance being spent or expired.
pub(crate) fn load_active_grants(
    accounts: &[AccountInfo],
    user: &UserAccount,
    program_id: &Pubkey,
) -> Result<Vec<BonusGrant>> {
    require!(
        accounts.len() == user.active_bonus_count as usize,
        LotteryError::BonusGrantsIncomplete
    );

    let mut grants: Vec<BonusGrant> = Vec::with_capacity(accounts.len());
    for (i, ai) in accounts.iter().enumerate() {
        require!(
            !accounts[..i].iter().any(|o| o.key == ai.key),
            LotteryError::AccountListMismatch
        );
        let g: BonusGrant = load_program_account(ai, program_id)?;
        require_keys_eq!(g.user, user.owner, LotteryError::BonusOwnerMismatch);
        require!(g.status == BonusStatus::Active, LotteryError::BonusGrantsIncomplete);
        grants.push(g);
    }
    Ok(grants)
}

/// Writes back grants whose status or remaining changed.
pub(crate) fn store_grants(
    accounts: &[AccountInfo],
    before: &[BonusGrant],
    after: &[BonusGrant],
) -> Result<()> {
    for ((ai, old), new) in accounts.iter().zip(before).zip(after) {
        if old.remaining != new.remaining || old.status != new.status {
            store_program_account(ai, new)?;
        }
    }
    Ok(())
}

/// Scheduled: expires the user's overdue grants and removes what was left on them.
pub fn expire_user_bonuses<'info>(
    ctx: Context<'_, '_, 'info, 'info, ExpireUserBonuses<'info>>,
) -> Result<()> {
    let remaining = ctx.remaining_accounts;
    require!(remaining.len() <= MAX_SWEEP_BATCH, LotteryError::BatchTooLarge);

    let now = Clock::get()?.unix_timestamp;
    let ua = &mut ctx.accounts.user_account;

    // pass 1: read and validate
    let before = load_active_grants(remaining, ua, ctx.program_id)?;
    let mut after = before.clone();
    let (expired, removed) = expire_grants(&mut after, now)?;

    if expired == 0 {
        msg!("no bonus grants due for user {}", ua.owner);
        return Ok(());
    }

    // pass 2: write
    store_grants(remaining, &before, &after)?;

    if removed > 0 {
        let payer = ctx.accounts.cranker.to_account_info();
        let system_program = ctx.accounts.system_program.to_account_info();
        let writer = LedgerWriter {
            payer: &payer,
            system_program: &system_program,
            program_id: ctx.program_id,
        };
        let user_key = ua.key();
        writer.post(
            ua,
            BalanceField::Bonus,
            -signed(removed)?,
            LedgerDraft::new(LedgerKind::Debit, LedgerReason::BonusExpired, user_key),
            &ctx.accounts.ledger_entry.to_account_info(),
            now,
        )?;
    }

    ua.active_bonus_count = ua
        .active_bonus_count
        .checked_sub(expired)
        .ok_or(LotteryError::BalanceUnderflow)?;
    ua.updated_at = now;

    emit!(BonusesExpired {
        user: ua.owner,
        grants_expired: expired,
        amount_removed: removed,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(owner: Pubkey, active: u32) -> UserAccount {
        UserAccount {
            owner,
            bump: 255,
            wallet_balance: 0,
            locked_balance: 0,
            bonus_balance: 10 * active as u64,
            ledger_count: 0,
            bonus_count: active as u64,
            active_bonus_count: active,
            withdraw_count: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn grant(owner: Pubkey, seq: u64) -> BonusGrant {
        BonusGrant {
            user: owner,
            seq,
            bump: 255,
            amount: 10,
            remaining: 10,
            status: BonusStatus::Active,
            expires_at: 1_000 + seq as i64,
            created_at: 0,
        }
    }

    #[test]
    fn grants_stop_at_active_limit() {
        let mut ua = user(Pubkey::new_unique(), MAX_ACTIVE_BONUS_GRANTS - 1);
        assert!(check_grant_capacity(&ua).is_ok());
        ua.active_bonus_count = MAX_ACTIVE_BONUS_GRANTS;
        assert!(check_grant_capacity(&ua).is_err());
    }

    #[test]
    fn full_grant_list_fits_one_sweep() {
        assert!(MAX_ACTIVE_BONUS_GRANTS as usize <= MAX_SWEEP_BATCH);

        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let n = MAX_ACTIVE_BONUS_GRANTS as usize;

        let keys: Vec<Pubkey> = (0..n).map(|_| Pubkey::new_unique()).collect();
        let mut lamports = vec![1_000_000u64; n];
        let mut data: Vec<Vec<u8>> = (0..n)
            .map(|i| {
                let mut buf = Vec::new();
                grant(owner, i as u64).try_serialize(&mut buf).unwrap();
                buf
            })
            .collect();
        let infos: Vec<AccountInfo> = keys
            .iter()
            .zip(lamports.iter_mut())
            .zip(data.iter_mut())
            .map(|((k, l), d)| AccountInfo::new(k, false, true, l, d.as_mut_slice(), &program_id, false, 0))
            .collect();

        let ua = user(owner, MAX_ACTIVE_BONUS_GRANTS);
        let grants = load_active_grants(&infos, &ua, &program_id).unwrap();
        assert_eq!(grants.len(), n);

        // a partial list never passes
        assert!(load_active_grants(&infos[..n - 1], &ua, &program_id).is_err());
    }
}

//! Balance model and the append-only ledger.
//!
//! Balances move only through [`apply_balance_delta`], which returns the ledger
//! entry explaining the move; the caller persists it with [`LedgerWriter`] in the
//! same instruction so both share fate.
use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    events::LedgerEntryAppended,
    state::{FundSource, LedgerEntry, LedgerKind, LedgerReason, UserAccount},
    utils::{create_pda_account, is_uninitialized, store_program_account, LEDGER_SEED},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceField {
    Wallet,
    Locked,
    Bonus,
}

#[derive(Clone, Copy, Debug)]
pub struct LedgerDraft {
    pub kind: LedgerKind,
    pub reason: LedgerReason,
    pub reference: Pubkey,
}

impl LedgerDraft {
    pub fn new(kind: LedgerKind, reason: LedgerReason, reference: Pubkey) -> Self {
        Self { kind, reason, reference }
    }
}

fn check_kind(field: BalanceField, kind: LedgerKind, delta: i64) -> Result<()> {
    let ok = match kind {
        LedgerKind::Debit => delta < 0 && field != BalanceField::Locked,
        LedgerKind::Credit => delta > 0 && field != BalanceField::Locked,
        LedgerKind::Lock => delta > 0 && field == BalanceField::Locked,
        LedgerKind::Unlock => delta < 0 && field == BalanceField::Locked,
    };
    require!(ok, LotteryError::InvalidAmount);
    Ok(())
}

fn shift(balance: u64, delta: i64) -> Result<u64> {
    if delta >= 0 {
        balance
            .checked_add(delta as u64)
            .ok_or_else(|| error!(LotteryError::MathOverflow))
    } else {
        balance
            .checked_sub(delta.unsigned_abs())
            .ok_or_else(|| error!(LotteryError::BalanceUnderflow))
    }
}

/// Adjusts one balance field and returns the entry that explains it.
///
/// The entry takes the user's next ledger sequence. `locked ≤ wallet` must hold
/// afterwards.
pub fn apply_balance_delta(
    user: &mut UserAccount,
    field: BalanceField,
    delta: i64,
    draft: LedgerDraft,
    now: i64,
) -> Result<LedgerEntry> {
    check_kind(field, draft.kind, delta)?;

    let (mut wallet, mut locked, mut bonus) =
        (user.wallet_balance, user.locked_balance, user.bonus_balance);
    match field {
        BalanceField::Wallet => wallet = shift(wallet, delta)?,
        BalanceField::Locked => locked = shift(locked, delta)?,
        BalanceField::Bonus => bonus = shift(bonus, delta)?,
    }
    require!(locked <= wallet, LotteryError::LockedExceedsWallet);

    let seq = user.ledger_count;
    user.wallet_balance = wallet;
    user.locked_balance = locked;
    user.bonus_balance = bonus;
    user.ledger_count = seq.checked_add(1).ok_or(LotteryError::MathOverflow)?;
    user.updated_at = now;

    Ok(LedgerEntry {
        user: user.owner,
        seq,
        bump: 0,
        amount: delta,
        kind: draft.kind,
        source: match field {
            BalanceField::Bonus => FundSource::Bonus,
            _ => FundSource::Wallet,
        },
        reason: draft.reason,
        reference: draft.reference,
        created_at: now,
    })
}

pub fn signed(amount: u64) -> Result<i64> {
    i64::try_from(amount).map_err(|_| error!(LotteryError::MathOverflow))
}

/// Persists ledger entries as PDAs `[LEDGER_SEED, user, seq]`.
pub struct LedgerWriter<'a, 'info> {
    pub payer: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
    pub program_id: &'a Pubkey,
}

impl<'a, 'info> LedgerWriter<'a, 'info> {
    pub fn append(&self, entry_ai: &AccountInfo<'info>, mut entry: LedgerEntry) -> Result<()> {
        let seq_le = entry.seq.to_le_bytes();
        let (expected, bump) = Pubkey::find_program_address(
            &[LEDGER_SEED, entry.user.as_ref(), &seq_le],
            self.program_id,
        );
        require_keys_eq!(expected, *entry_ai.key, LotteryError::PdaMismatch);
        require!(is_uninitialized(entry_ai), LotteryError::AlreadyExists);

        create_pda_account(
            self.payer,
            entry_ai,
            self.system_program,
            &[LEDGER_SEED, entry.user.as_ref(), &seq_le, &[bump]],
            8 + LedgerEntry::INIT_SPACE,
            self.program_id,
        )?;

        entry.bump = bump;
        store_program_account(entry_ai, &entry)?;

        emit!(LedgerEntryAppended {
            user: entry.user,
            seq: entry.seq,
            amount: entry.amount,
            kind: entry.kind,
            source: entry.source,
            reason: entry.reason,
            reference: entry.reference,
            created_at: entry.created_at,
        });
        Ok(())
    }

    /// `apply_balance_delta` followed by `append`.
    pub fn post(
        &self,
        user: &mut UserAccount,
        field: BalanceField,
        delta: i64,
        draft: LedgerDraft,
        entry_ai: &AccountInfo<'info>,
        now: i64,
    ) -> Result<()> {
        let entry = apply_balance_delta(user, field, delta, draft, now)?;
        self.append(entry_ai, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(wallet: u64, locked: u64, bonus: u64) -> UserAccount {
        UserAccount {
            owner: Pubkey::new_unique(),
            bump: 255,
            wallet_balance: wallet,
            locked_balance: locked,
            bonus_balance: bonus,
            ledger_count: 0,
            bonus_count: 0,
            active_bonus_count: 0,
            withdraw_count: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn draft(kind: LedgerKind) -> LedgerDraft {
        LedgerDraft::new(kind, LedgerReason::TicketPurchase, Pubkey::new_unique())
    }

    #[test]
    fn debit_moves_wallet_and_sequences_entries() {
        let mut u = user(100, 0, 0);
        let e0 = apply_balance_delta(&mut u, BalanceField::Wallet, -40, draft(LedgerKind::Debit), 7)
            .unwrap();
        let e1 = apply_balance_delta(&mut u, BalanceField::Wallet, 10, draft(LedgerKind::Credit), 8)
            .unwrap();
        assert_eq!(u.wallet_balance, 70);
        assert_eq!((e0.seq, e1.seq), (0, 1));
        assert_eq!(u.ledger_count, 2);
        assert_eq!(e0.amount, -40);
        assert_eq!(e0.source, FundSource::Wallet);
        assert_eq!(e0.user, u.owner);
    }

    #[test]
    fn bonus_field_records_bonus_source() {
        let mut u = user(0, 0, 50);
        let e = apply_balance_delta(&mut u, BalanceField::Bonus, -50, draft(LedgerKind::Debit), 0)
            .unwrap();
        assert_eq!(e.source, FundSource::Bonus);
        assert_eq!(u.bonus_balance, 0);
    }

    #[test]
    fn rejected_delta_leaves_balances_untouched() {
        let mut u = user(100, 80, 0);
        // wallet would drop below locked
        let r = apply_balance_delta(&mut u, BalanceField::Wallet, -30, draft(LedgerKind::Debit), 0);
        assert!(r.is_err());
        assert_eq!((u.wallet_balance, u.locked_balance, u.ledger_count), (100, 80, 0));

        // underflow
        let r = apply_balance_delta(&mut u, BalanceField::Bonus, -1, draft(LedgerKind::Debit), 0);
        assert!(r.is_err());
        assert_eq!(u.ledger_count, 0);
    }

    #[test]
    fn lock_cannot_exceed_wallet() {
        let mut u = user(100, 0, 0);
        assert!(apply_balance_delta(&mut u, BalanceField::Locked, 60, draft(LedgerKind::Lock), 0).is_ok());
        assert!(apply_balance_delta(&mut u, BalanceField::Locked, 50, draft(LedgerKind::Lock), 0).is_err());
        assert_eq!(u.locked_balance, 60);
        assert_eq!(u.available_balance(), 40);
    }

    #[test]
    fn kind_must_match_field_and_sign() {
        let mut u = user(100, 0, 0);
        assert!(apply_balance_delta(&mut u, BalanceField::Wallet, 10, draft(LedgerKind::Debit), 0).is_err());
        assert!(apply_balance_delta(&mut u, BalanceField::Wallet, 10, draft(LedgerKind::Lock), 0).is_err());
        assert!(apply_balance_delta(&mut u, BalanceField::Locked, -10, draft(LedgerKind::Debit), 0).is_err());
        assert!(apply_balance_delta(&mut u, BalanceField::Wallet, 0, draft(LedgerKind::Credit), 0).is_err());
    }

    #[test]
    fn debits_never_exceed_credits_plus_opening_balance() {
        let mut u = user(100, 0, 0);
        let mut debits: u64 = 0;
        let mut credits: u64 = 0;
        for amount in [30i64, 50, 40, 20, 10] {
            if let Ok(e) =
                apply_balance_delta(&mut u, BalanceField::Wallet, -amount, draft(LedgerKind::Debit), 0)
            {
                debits += e.amount.unsigned_abs();
            }
            if amount == 40 {
                let e = apply_balance_delta(&mut u, BalanceField::Wallet, 15, draft(LedgerKind::Credit), 0)
                    .unwrap();
                credits += e.amount as u64;
            }
        }
        assert!(debits <= credits + 100);
        assert_eq!(u.wallet_balance, 100 + credits - debits);
    }
}

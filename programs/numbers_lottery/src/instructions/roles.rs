use anchor_lang::prelude::*;

use crate::{
    errors::LotteryError,
    events::ManagerChanged,
    state::Config,
    AddManager, RemoveManager, MAX_MANAGERS,
};

pub fn add_manager(ctx: Context<AddManager>, manager: Pubkey) -> Result<()> {
    let cfg: &mut Account<Config> = &mut ctx.accounts.config;
    require_keys_eq!(cfg.admin, ctx.accounts.admin.key(), LotteryError::Unauthorized);

    require!(manager != Pubkey::default(), LotteryError::ManagerNotFound);
    require!(manager != cfg.admin, LotteryError::ManagerAlreadyExists);
    require!(cfg.managers.len() < MAX_MANAGERS, LotteryError::ManagerSetFull);
    require!(!cfg.managers.contains(&manager), LotteryError::ManagerAlreadyExists);

    cfg.managers.push(manager);

    emit!(ManagerChanged {
        admin: cfg.admin,
        manager,
        added: true,
    });
    Ok(())
}

pub fn remove_manager(ctx: Context<RemoveManager>, manager: Pubkey) -> Result<()> {
    let cfg: &mut Account<Config> = &mut ctx.accounts.config;
    require_keys_eq!(cfg.admin, ctx.accounts.admin.key(), LotteryError::Unauthorized);

    let pos = cfg
        .managers
        .iter()
        .position(|x| *x == manager)
        .ok_or(LotteryError::ManagerNotFound)?;

    // Stable removal (keeps relative order).
    cfg.managers.remove(pos);

    emit!(ManagerChanged {
        admin: cfg.admin,
        manager,
        added: false,
    });
    Ok(())
}

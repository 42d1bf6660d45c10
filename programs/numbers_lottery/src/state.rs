use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::LotteryError;

#[account]
#[derive(InitSpace)]
pub struct Config {
    pub admin: Pubkey,
    pub bump: u8,

    /// Operators allowed to run manager-scoped admin instructions.
    #[max_len(8)]
    pub managers: Vec<Pubkey>,

    pub cash_mint: Pubkey,

    // Treasury SPL (custody of every wallet balance)
    pub treasury: Pubkey,
    pub treasury_bump: u8,

    pub paused: bool,

    pub hold_duration_secs: i64,
    pub bonus_cap_bps: u16,
    pub utc_offset_secs: i32,

    /// 0 = no limit.
    pub max_withdraw_per_request: u64,

    pub version: u16,
}

impl Config {
    pub fn is_admin(&self, key: &Pubkey) -> bool {
        self.admin == *key
    }

    /// Admin or allow-listed manager.
    pub fn is_operator(&self, key: &Pubkey) -> bool {
        self.is_admin(key) || self.managers.contains(key)
    }
}

// ----------------------------
// Balances & ledger
// ----------------------------

#[account]
#[derive(InitSpace)]
pub struct UserAccount {
    pub owner: Pubkey,
    pub bump: u8,

    pub wallet_balance: u64,
    pub locked_balance: u64,
    pub bonus_balance: u64,

    /// Sequence of the next ledger entry.
    pub ledger_count: u64,
    pub bonus_count: u64,
    pub active_bonus_count: u32,
    pub withdraw_count: u64,

    pub created_at: i64,
    pub updated_at: i64,
}

impl UserAccount {
    /// The only amount spendable on purchases or new withdrawals.
    pub fn available_balance(&self) -> u64 {
        self.wallet_balance.saturating_sub(self.locked_balance)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum LedgerKind {
    Debit,
    Lock,
    Unlock,
    Credit,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum FundSource {
    Wallet,
    Bonus,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum LedgerReason {
    Deposit,
    TicketPurchase,
    Winnings,
    WithdrawRequested,
    WithdrawPaid,
    WithdrawRejected,
    BonusGranted,
    BonusExpired,
}

/// Immutable once written: no instruction takes a mutable `LedgerEntry`.
#[account]
#[derive(InitSpace)]
pub struct LedgerEntry {
    pub user: Pubkey,
    pub seq: u64,
    pub bump: u8,

    /// Signed change applied to the balance named by `kind`/`source`.
    pub amount: i64,
    pub kind: LedgerKind,
    pub source: FundSource,
    pub reason: LedgerReason,

    /// Ticket, draw, withdraw request or bonus grant this entry explains.
    pub reference: Pubkey,
    pub created_at: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum BonusStatus {
    Active,
    Expired,
    Used,
}

#[account]
#[derive(InitSpace)]
pub struct BonusGrant {
    pub user: Pubkey,
    pub seq: u64,
    pub bump: u8,

    pub amount: u64,
    pub remaining: u64,
    pub status: BonusStatus,
    pub expires_at: i64,
    pub created_at: i64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum WithdrawStatus {
    Pending,
    Approved,
    Rejected,
}

#[account]
#[derive(InitSpace)]
pub struct WithdrawRequest {
    pub user: Pubkey,
    pub seq: u64,
    pub bump: u8,

    pub amount: u64,
    pub status: WithdrawStatus,
    pub created_at: i64,
    pub resolved_at: i64,
}

// ----------------------------
// Draw templates & daily runs
// ----------------------------

/// Per digit-type configuration. `multipliers` are payout factors on the stake
/// for [exact, last N-1, last N-2]; 0 means the tier pays nothing.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default, InitSpace)]
pub struct DigitGame {
    pub enabled: bool,
    pub multipliers: [u32; 3],
}

#[account]
#[derive(InitSpace)]
pub struct DrawTemplate {
    pub template_id: u64,
    pub bump: u8,

    #[max_len(32)]
    pub name: String,
    pub disabled: bool,

    /// Local minute of day at which sales lock.
    pub draw_minute_of_day: u16,

    /// Indexed by `game_index(digits)`: 2D, 3D, 4D.
    pub games: [DigitGame; 3],

    pub created_at: i64,
    pub updated_at: i64,
}

impl DrawTemplate {
    pub fn is_fully_configured(&self) -> bool {
        !self.name.is_empty()
            && self.draw_minute_of_day < MINUTES_PER_DAY
            && self
                .games
                .iter()
                .any(|g| g.enabled && g.multipliers[0] > 0)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum DrawRunStatus {
    Open,
    Locked,
    Running,
    Drawn,
    Settled,
}

impl DrawRunStatus {
    /// Forward-only edges. Settled is terminal.
    pub fn can_advance_to(self, next: DrawRunStatus) -> bool {
        use DrawRunStatus::*;
        matches!(
            (self, next),
            (Open, Locked) | (Locked, Running) | (Locked, Drawn) | (Running, Drawn) | (Drawn, Settled)
        )
    }

    pub fn advance(&mut self, next: DrawRunStatus) -> Result<()> {
        require!(*self != DrawRunStatus::Settled, LotteryError::DrawAlreadySettled);
        require!(self.can_advance_to(next), LotteryError::InvalidStatusTransition);
        *self = next;
        Ok(())
    }
}

#[account]
#[derive(InitSpace)]
pub struct DrawRun {
    pub template: Pubkey,
    pub template_id: u64,
    /// Local calendar date, yyyymmdd.
    pub date: u32,
    pub bump: u8,

    pub status: DrawRunStatus,
    pub draw_at: i64,

    /// Snapshot of the template at creation time.
    pub games: [DigitGame; 3],

    pub results: [u32; 3],
    pub result_declared: bool,
    pub result_digest: [u8; 32],

    pub sales: u64,
    pub ticket_count: u64,
    pub settled_count: u64,
    pub total_payout: u64,

    pub created_at: i64,
    pub locked_at: i64,
    pub drawn_at: i64,
    pub settled_at: i64,
}

// ----------------------------
// KuberGold digit slots
// ----------------------------

#[account]
#[derive(InitSpace)]
pub struct DigitTemplate {
    pub template_id: u64,
    pub bump: u8,

    #[max_len(32)]
    pub name: String,
    pub digits: u8,
    pub ticket_price: u64,
    pub multipliers: [u32; 3],
    pub disabled: bool,

    pub created_at: i64,
}

#[account]
#[derive(InitSpace)]
pub struct SlotRegistry {
    pub admin: Pubkey,
    pub bump: u8,
    pub next_slot_id: u64,
    pub version: u16,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum SlotStatus {
    Open,
    Locked,
    Running,
    Completed,
    Disabled,
}

impl SlotStatus {
    pub fn can_advance_to(self, next: SlotStatus) -> bool {
        use SlotStatus::*;
        matches!(
            (self, next),
            (Open, Locked)
                | (Locked, Open)
                | (Open, Disabled)
                | (Disabled, Open)
                | (Locked, Running)
                | (Running, Completed)
        )
    }

    pub fn advance(&mut self, next: SlotStatus) -> Result<()> {
        require!(*self != SlotStatus::Completed, LotteryError::DrawAlreadySettled);
        require!(self.can_advance_to(next), LotteryError::InvalidStatusTransition);
        *self = next;
        Ok(())
    }

    /// Close time is frozen once a result exists.
    pub fn close_time_editable(self) -> bool {
        !matches!(self, SlotStatus::Running | SlotStatus::Completed)
    }
}

#[account]
#[derive(InitSpace)]
pub struct DigitSlot {
    pub slot_id: u64,
    pub bump: u8,

    pub template: Pubkey,
    #[max_len(32)]
    pub name: String,
    pub digits: u8,
    pub ticket_price: u64,
    pub multipliers: [u32; 3],

    pub open_at: i64,
    pub close_at: i64,
    pub status: SlotStatus,

    pub winning_number: u32,
    pub result_declared: bool,
    pub result_digest: [u8; 32],

    pub sales: u64,
    pub ticket_count: u64,
    pub settled_count: u64,
    pub total_payout: u64,

    pub created_at: i64,
    pub settled_at: i64,
}

impl DigitSlot {
    /// Sales and holds need an Open slot inside its window.
    pub fn check_selling(&self, now: i64) -> Result<()> {
        require!(self.status == SlotStatus::Open, LotteryError::DrawNotOpen);
        require!(now >= self.open_at, LotteryError::SalesNotStarted);
        require!(now < self.close_at, LotteryError::SalesClosed);
        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum SeatStatus {
    Hold,
    Booked,
}

/// Reservation of one number inside a slot. No account = number is free.
#[account]
#[derive(InitSpace)]
pub struct Seat {
    pub slot: Pubkey,
    pub bump: u8,

    #[max_len(6)]
    pub number: String,
    pub status: SeatStatus,
    pub owner: Pubkey,
    pub hold_until: i64,

    /// Receives the rent back when an expired hold is swept.
    pub rent_payer: Pubkey,
    pub booked_at: i64,
}

// ----------------------------
// Jackpot
// ----------------------------

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum JackpotStatus {
    Created,
    Open,
    Guaranteed,
    Locked,
    Settled,
}

impl JackpotStatus {
    fn rank(self) -> u8 {
        self as u8
    }

    pub fn can_advance_to(self, next: JackpotStatus) -> bool {
        match self {
            JackpotStatus::Settled => false,
            JackpotStatus::Locked => next == JackpotStatus::Settled,
            _ => next.rank() > self.rank(),
        }
    }

    pub fn is_selling(self) -> bool {
        matches!(self, JackpotStatus::Open | JackpotStatus::Guaranteed)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub struct PrizeTier {
    pub match_digits: u8,
    pub winners_count: u32,
    pub prize_per_winner: u64,
}

#[account]
#[derive(InitSpace)]
pub struct JackpotDraw {
    pub jackpot_id: u64,
    pub bump: u8,

    #[max_len(32)]
    pub name: String,
    pub digits: u8,
    pub ticket_price: u64,
    pub total_capacity: u64,
    pub guaranteed_sales_pct: u8,

    /// Sorted by `match_digits`, highest first.
    #[max_len(6)]
    pub tiers: Vec<PrizeTier>,
    /// Winners already paid per tier (same order as `tiers`).
    #[max_len(6)]
    pub tier_winners: Vec<u32>,

    pub status: JackpotStatus,
    pub draw_at: i64,

    pub winning_number: u32,
    pub result_declared: bool,
    pub result_digest: [u8; 32],

    pub ticket_count: u64,
    pub sales: u64,
    pub settled_count: u64,
    pub total_payout: u64,

    pub created_at: i64,
    pub updated_at: i64,
    pub locked_at: i64,
    pub settled_at: i64,
}

impl JackpotDraw {
    pub fn guarantee_reached(&self) -> bool {
        let sold = (self.ticket_count as u128) * 100;
        let needed = (self.total_capacity as u128) * (self.guaranteed_sales_pct as u128);
        self.total_capacity > 0 && sold >= needed
    }
}

// ----------------------------
// Tickets
// ----------------------------

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum Product {
    DrawRun,
    Slot,
    Jackpot,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum TicketStatus {
    Pending,
    Booked,
    Won,
    Lost,
}

impl TicketStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, TicketStatus::Won | TicketStatus::Lost)
    }
}

#[account]
#[derive(InitSpace)]
pub struct Ticket {
    pub owner: Pubkey,
    /// DrawRun, DigitSlot or JackpotDraw account.
    pub draw: Pubkey,
    pub product: Product,
    pub index: u64,
    pub bump: u8,

    pub digits: u8,
    #[max_len(6)]
    pub number: String,
    pub amount: u64,

    pub status: TicketStatus,
    pub win_amount: u64,
    /// 1 = exact match; 0 = no prize.
    pub tier: u8,

    pub locked_at: i64,
    pub created_at: i64,
    pub settled_at: i64,
}

/// Index into `DrawTemplate::games` / `DrawRun::games`.
pub fn game_index(digits: u8) -> Result<usize> {
    require!(
        (MIN_DIGITS..=MAX_DIGITS).contains(&digits),
        LotteryError::InvalidDigits
    );
    Ok((digits - MIN_DIGITS) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_run_status_never_regresses() {
        use DrawRunStatus::*;
        let all = [Open, Locked, Running, Drawn, Settled];
        for (i, from) in all.iter().enumerate() {
            for (j, to) in all.iter().enumerate() {
                if j <= i {
                    assert!(!from.can_advance_to(*to), "{:?} -> {:?}", from, to);
                }
            }
        }
        assert!(Open.can_advance_to(Locked));
        assert!(Locked.can_advance_to(Drawn));
        assert!(Drawn.can_advance_to(Settled));
        assert!(!Open.can_advance_to(Settled));
    }

    #[test]
    fn settled_run_rejects_any_advance() {
        let mut s = DrawRunStatus::Settled;
        assert!(s.advance(DrawRunStatus::Open).is_err());
        assert_eq!(s, DrawRunStatus::Settled);

        let mut s = DrawRunStatus::Open;
        s.advance(DrawRunStatus::Locked).unwrap();
        assert!(s.advance(DrawRunStatus::Open).is_err());
        assert_eq!(s, DrawRunStatus::Locked);
    }

    #[test]
    fn jackpot_locked_only_moves_to_settled() {
        use JackpotStatus::*;
        assert!(Locked.can_advance_to(Settled));
        assert!(!Locked.can_advance_to(Open));
        assert!(!Locked.can_advance_to(Guaranteed));
        assert!(!Settled.can_advance_to(Settled));
        assert!(Created.can_advance_to(Open));
        assert!(Open.can_advance_to(Guaranteed));
        assert!(Open.can_advance_to(Locked));
        assert!(!Guaranteed.can_advance_to(Open));
    }

    #[test]
    fn slot_close_time_frozen_after_result() {
        assert!(SlotStatus::Open.close_time_editable());
        assert!(SlotStatus::Locked.close_time_editable());
        assert!(!SlotStatus::Running.close_time_editable());
        assert!(!SlotStatus::Completed.close_time_editable());
    }

    #[test]
    fn available_balance_excludes_locked() {
        let user = UserAccount {
            owner: Pubkey::new_unique(),
            bump: 255,
            wallet_balance: 100,
            locked_balance: 30,
            bonus_balance: 50,
            ledger_count: 0,
            bonus_count: 0,
            active_bonus_count: 0,
            withdraw_count: 0,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(user.available_balance(), 70);
    }

    #[test]
    fn template_needs_an_enabled_paying_game() {
        let mut t = DrawTemplate {
            template_id: 1,
            bump: 255,
            name: "Morning".to_string(),
            disabled: false,
            draw_minute_of_day: 13 * 60,
            games: [DigitGame::default(); 3],
            created_at: 0,
            updated_at: 0,
        };
        assert!(!t.is_fully_configured());
        t.games[0] = DigitGame { enabled: true, multipliers: [90, 9, 0] };
        assert!(t.is_fully_configured());
        t.draw_minute_of_day = MINUTES_PER_DAY;
        assert!(!t.is_fully_configured());
    }

    #[test]
    fn game_index_covers_two_to_four_digits() {
        assert_eq!(game_index(2).unwrap(), 0);
        assert_eq!(game_index(4).unwrap(), 2);
        assert!(game_index(1).is_err());
        assert!(game_index(5).is_err());
    }

    #[test]
    fn guarantee_threshold() {
        let mut j = JackpotDraw {
            jackpot_id: 1,
            bump: 255,
            name: "Mega".to_string(),
            digits: 4,
            ticket_price: 10,
            total_capacity: 1_000,
            guaranteed_sales_pct: 60,
            tiers: vec![],
            tier_winners: vec![],
            status: JackpotStatus::Open,
            draw_at: 0,
            winning_number: 0,
            result_declared: false,
            result_digest: [0u8; 32],
            ticket_count: 599,
            sales: 0,
            settled_count: 0,
            total_payout: 0,
            created_at: 0,
            updated_at: 0,
            locked_at: 0,
            settled_at: 0,
        };
        assert!(!j.guarantee_reached());
        j.ticket_count = 600;
        assert!(j.guarantee_reached());
    }
}

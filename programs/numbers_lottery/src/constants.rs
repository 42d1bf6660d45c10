// Centralized Platform Constants

// Reservation & purchase
// ======================

/// Seconds a seat stays reserved for the holder before anyone else may take it.
pub const DEFAULT_HOLD_DURATION_SECS: i64 = 60;

/// Share of a seat-reserved purchase that bonus credit may fund (basis points).
/// 1000 = 10%.
pub const DEFAULT_BONUS_CAP_BPS: u16 = 1_000;

/// Upper bound for any basis-points setting.
pub const MAX_BPS: u16 = 10_000;

/// Largest number of distinct numbers in one purchase or hold.
/// Bounded by the account list a single transaction can carry.
pub const MAX_NUMBERS_PER_PURCHASE: usize = 10;

/// Largest number of tickets processed by one settlement or preview call.
pub const MAX_SETTLEMENT_BATCH: usize = 8;

/// Largest number of accounts a sweep/crank processes per call.
pub const MAX_SWEEP_BATCH: usize = 24;

/// Most ACTIVE bonus grants one user may hold. Slot purchases and the expiry
/// sweep carry the complete list next to the seats and tickets.
pub const MAX_ACTIVE_BONUS_GRANTS: u32 = 6;

// Calendar
// ========

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_DAY: i64 = 86_400;
pub const MINUTES_PER_DAY: u16 = 1_440;

/// Platform local time (UTC+05:30). Draw dates and draw times are local.
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 19_800;

/// Local hour after which the daily job creates tomorrow's draw runs.
pub const DAILY_RUN_CREATION_HOUR: u8 = 22;

// Products
// ========

/// Digit counts supported by draw runs and slots.
pub const MIN_DIGITS: u8 = 2;
pub const MAX_DIGITS: u8 = 4;

/// Jackpot draws may use longer numbers.
pub const MAX_JACKPOT_DIGITS: u8 = 6;

/// Number of prize tiers for digit draws: exact, last N-1, last N-2.
pub const DIGIT_TIERS: usize = 3;

pub const MAX_JACKPOT_TIERS: usize = 6;

pub const MAX_NAME_LEN: usize = 32;

/// Ticket/seat number storage (jackpot numbers are the longest).
pub const MAX_NUMBER_LEN: usize = 6;

// Access control
// ==============

pub const MAX_MANAGERS: usize = 8;

/// Initial version for account structures.
pub const INITIAL_VERSION: u16 = 1;

/// Starting slot id for a new registry.
pub const INITIAL_SLOT_ID: u64 = 0;

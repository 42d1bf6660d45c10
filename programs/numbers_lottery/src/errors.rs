use anchor_lang::prelude::*;

#[error_code]
pub enum LotteryError {
    // -----------------
    // Authorization
    // -----------------
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Platform paused")]
    Paused,

    // -----------------
    // Input validation
    // -----------------
    #[msg("Invalid amount (must be > 0)")]
    InvalidAmount,
    #[msg("Invalid number for this draw")]
    InvalidNumber,
    #[msg("Duplicate number in request")]
    DuplicateNumber,
    #[msg("No numbers supplied")]
    EmptyNumbers,
    #[msg("Too many numbers in one request")]
    TooManyNumbers,
    #[msg("Unsupported digit count")]
    InvalidDigits,
    #[msg("Invalid time window")]
    InvalidWindow,
    #[msg("Invalid draw time")]
    InvalidDrawTime,
    #[msg("Invalid date")]
    InvalidDate,
    #[msg("Invalid name")]
    InvalidName,
    #[msg("Invalid basis points (must be <= 10000)")]
    InvalidBps,
    #[msg("Invalid percentage (must be 1..=100)")]
    InvalidPercentage,
    #[msg("Invalid prize tiers")]
    InvalidPrizeTiers,
    #[msg("Invalid multipliers")]
    InvalidMultipliers,
    #[msg("Too many accounts in one batch")]
    BatchTooLarge,
    #[msg("Account list does not match request")]
    AccountListMismatch,
    #[msg("Invalid token account")]
    InvalidTokenAccount,

    // -----------------
    // Not found / mismatch
    // -----------------
    #[msg("Account PDA mismatch")]
    PdaMismatch,
    #[msg("Account not owned by program")]
    NotOwnedByProgram,
    #[msg("Seat not found")]
    SeatNotFound,
    #[msg("Ticket does not belong to this draw")]
    TicketDrawMismatch,
    #[msg("Bonus grant does not belong to this user")]
    BonusOwnerMismatch,
    #[msg("Manager not found in allowlist")]
    ManagerNotFound,
    #[msg("Ledger entry account missing")]
    LedgerAccountMissing,

    // -----------------
    // Balance rules
    // -----------------
    #[msg("Insufficient available balance")]
    InsufficientAvailableBalance,
    #[msg("Insufficient bonus balance")]
    InsufficientBonus,
    #[msg("Active bonus grants do not cover bonus balance")]
    BonusGrantsIncomplete,
    #[msg("Too many active bonus grants for this user")]
    TooManyActiveBonusGrants,
    #[msg("Locked balance would exceed wallet balance")]
    LockedExceedsWallet,
    #[msg("Balance underflow")]
    BalanceUnderflow,
    #[msg("Withdraw request already resolved")]
    WithdrawAlreadyResolved,
    #[msg("Withdraw amount above per-request limit")]
    WithdrawAboveLimit,

    // -----------------
    // Inventory rules
    // -----------------
    #[msg("Number already booked")]
    SeatAlreadyBooked,
    #[msg("Number is reserved by another user")]
    NumberUnavailable,
    #[msg("Number held by another user")]
    SeatHeldByOther,
    #[msg("Seat hold expired")]
    HoldExpired,
    #[msg("Seat is not on hold")]
    SeatNotOnHold,

    // -----------------
    // Draw lifecycle
    // -----------------
    #[msg("Draw is not open for sales")]
    DrawNotOpen,
    #[msg("Sales window closed")]
    SalesClosed,
    #[msg("Sales window not open yet")]
    SalesNotStarted,
    #[msg("Invalid status transition")]
    InvalidStatusTransition,
    #[msg("Draw is not locked")]
    DrawNotLocked,
    #[msg("Result not declared")]
    ResultNotDeclared,
    #[msg("Draw already settled")]
    DrawAlreadySettled,
    #[msg("Ticket already settled")]
    TicketAlreadySettled,
    #[msg("Draw is immutable once locked")]
    DrawImmutable,
    #[msg("Close time cannot be changed in this status")]
    CloseTimeFrozen,
    #[msg("Template disabled")]
    TemplateDisabled,
    #[msg("Template not fully configured")]
    TemplateIncomplete,
    #[msg("Digit game not enabled on this draw")]
    GameNotEnabled,
    #[msg("Draw capacity reached")]
    CapacityReached,

    // -----------------
    // Idempotency
    // -----------------
    #[msg("Account already exists")]
    AlreadyExists,
    #[msg("Manager already exists in allowlist")]
    ManagerAlreadyExists,
    #[msg("Manager allowlist is full")]
    ManagerSetFull,

    // -----------------
    // Internal
    // -----------------
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Failed to borrow account data")]
    AccountBorrowFailed,
}

/// Category of a [`LotteryError`], matching the platform error taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    Unauthorized,
    InvalidArgument,
    NotFound,
    FailedPrecondition,
    PermissionDenied,
    AlreadyExists,
    Internal,
}

impl ErrorKind {
    /// Category of an error raised by the framework's account checks.
    pub fn of_framework(code: anchor_lang::error::ErrorCode) -> ErrorKind {
        use anchor_lang::error::ErrorCode::*;
        match code {
            AccountNotSigner => ErrorKind::Unauthenticated,
            AccountNotInitialized | AccountOwnedByWrongProgram | ConstraintSeeds => {
                ErrorKind::NotFound
            }
            AccountDiscriminatorMismatch | ConstraintRaw | ConstraintAddress | ConstraintHasOne => {
                ErrorKind::InvalidArgument
            }
            _ => ErrorKind::Internal,
        }
    }
}

/// What a caller can do about a rejected purchase or hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remediation {
    /// Pick different numbers and retry.
    ChooseOtherNumbers,
    /// Not retryable until the balance is topped up.
    TopUpBalance,
    /// Not retryable at all.
    DrawClosed,
    /// Fix the request.
    FixRequest,
    /// Nothing the caller can change.
    None,
}

impl LotteryError {
    pub fn kind(&self) -> ErrorKind {
        use LotteryError::*;
        match self {
            Unauthorized | Paused => ErrorKind::Unauthorized,
            SeatHeldByOther => ErrorKind::PermissionDenied,

            InvalidAmount | InvalidNumber | DuplicateNumber | EmptyNumbers | TooManyNumbers
            | InvalidDigits | InvalidWindow | InvalidDrawTime | InvalidDate | InvalidName
            | InvalidBps | InvalidPercentage | InvalidPrizeTiers | InvalidMultipliers
            | BatchTooLarge | AccountListMismatch | InvalidTokenAccount => {
                ErrorKind::InvalidArgument
            }

            PdaMismatch | NotOwnedByProgram | SeatNotFound | TicketDrawMismatch
            | BonusOwnerMismatch | ManagerNotFound | LedgerAccountMissing => ErrorKind::NotFound,

            SeatAlreadyBooked | NumberUnavailable | AlreadyExists | ManagerAlreadyExists => {
                ErrorKind::AlreadyExists
            }

            InsufficientAvailableBalance | InsufficientBonus | BonusGrantsIncomplete
            | TooManyActiveBonusGrants | LockedExceedsWallet | BalanceUnderflow
            | WithdrawAlreadyResolved | WithdrawAboveLimit | HoldExpired | SeatNotOnHold
            | DrawNotOpen | SalesClosed
            | SalesNotStarted | InvalidStatusTransition | DrawNotLocked | ResultNotDeclared
            | DrawAlreadySettled | TicketAlreadySettled | DrawImmutable | CloseTimeFrozen
            | TemplateDisabled | TemplateIncomplete | GameNotEnabled | CapacityReached
            | ManagerSetFull => ErrorKind::FailedPrecondition,

            MathOverflow | AccountBorrowFailed => ErrorKind::Internal,
        }
    }

    pub fn remediation(&self) -> Remediation {
        use LotteryError::*;
        match self {
            SeatAlreadyBooked | NumberUnavailable | SeatHeldByOther | HoldExpired | SeatNotOnHold
            | SeatNotFound => Remediation::ChooseOtherNumbers,
            InsufficientAvailableBalance => Remediation::TopUpBalance,
            DrawNotOpen | SalesClosed | DrawAlreadySettled | CapacityReached => {
                Remediation::DrawClosed
            }
            _ => match self.kind() {
                ErrorKind::InvalidArgument => Remediation::FixRequest,
                _ => Remediation::None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_failures_carry_distinct_remediations() {
        assert_eq!(
            LotteryError::SeatHeldByOther.remediation(),
            Remediation::ChooseOtherNumbers
        );
        assert_eq!(
            LotteryError::InsufficientAvailableBalance.remediation(),
            Remediation::TopUpBalance
        );
        assert_eq!(LotteryError::DrawNotOpen.remediation(), Remediation::DrawClosed);
        assert_eq!(LotteryError::InvalidNumber.remediation(), Remediation::FixRequest);
    }

    #[test]
    fn taxonomy_categories() {
        assert_eq!(LotteryError::SeatAlreadyBooked.kind(), ErrorKind::AlreadyExists);
        assert_eq!(LotteryError::SeatHeldByOther.kind(), ErrorKind::PermissionDenied);
        assert_eq!(
            LotteryError::DrawAlreadySettled.kind(),
            ErrorKind::FailedPrecondition
        );
        assert_eq!(LotteryError::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(LotteryError::SeatNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(LotteryError::MathOverflow.kind(), ErrorKind::Internal);
        assert_eq!(LotteryError::InvalidTokenAccount.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn unsigned_calls_are_unauthenticated() {
        use anchor_lang::error::ErrorCode;
        assert_eq!(
            ErrorKind::of_framework(ErrorCode::AccountNotSigner),
            ErrorKind::Unauthenticated
        );
        assert_eq!(
            ErrorKind::of_framework(ErrorCode::ConstraintSeeds),
            ErrorKind::NotFound
        );
    }
}

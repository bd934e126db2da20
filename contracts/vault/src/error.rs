use soroban_sdk::contracterror;

/// Failure kinds returned by every vault entry point.
///
/// The vault never formats messages; callers map these codes to text.
/// `LiquidityUnavailable` is the only kind caused by an external dependency
/// (the yield source) rather than by the caller's input.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VaultError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    /// Admin call from an address other than the owner, or oracle call from
    /// an address other than the configured oracle
    Unauthorized = 3,
    Paused = 4,
    NotPaused = 5,
    NotVerified = 6,
    AlreadyVerified = 7,
    ProofRejected = 8,
    InvalidAmount = 9,
    BelowMinimum = 10,
    ExceedsMaxDeposit = 11,
    ExceedsMaxTvl = 12,
    InsufficientBalance = 13,
    InsufficientShares = 14,
    LiquidityUnavailable = 15,
    TransferFailed = 16,
    InvalidStrategy = 17,
    SameStrategy = 18,
    InvalidConfig = 19,
    MathOverflow = 20,
    /// Shares are outstanding but the vault holds no assets
    DivisionByZero = 21,
    Reentrant = 22,
}

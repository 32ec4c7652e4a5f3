use alloy_sol_types::sol;
use num_enum::TryFromPrimitive;

// Uniswap Universal Router interface definitions
//
// Official Documentation:
// - Technical Reference: https://docs.uniswap.org/contracts/universal-router/technical-reference
// - Contract Source: https://github.com/Uniswap/universal-router/blob/main/contracts/interfaces/IUniversalRouter.sol
//
// Both execute overloads are accepted. A payload is always re-encoded with
// the overload (and therefore the selector) it was decoded with.
sol! {
    interface IUniversalRouter {
        /// @notice Executes encoded commands along with provided inputs. Reverts if deadline has expired.
        function execute(bytes calldata commands, bytes[] calldata inputs, uint256 deadline) external payable;

        /// @notice Executes encoded commands along with provided inputs (no deadline check)
        function execute(bytes calldata commands, bytes[] calldata inputs) external payable;
    }
}

// Argument tuples for the settlement commands and actions that carry a
// recipient. The recipient is always the second field.
//
// Source: https://github.com/Uniswap/universal-router/blob/main/contracts/base/Dispatcher.sol
// Source: https://github.com/Uniswap/v4-periphery/blob/main/src/libraries/CalldataDecoder.sol
sol! {
    /// Parameters for SWEEP command
    struct SweepParams {
        address token;
        address recipient;
        uint256 amountMinimum;
    }

    /// Parameters for PAY_PORTION command
    struct PayPortionParams {
        address token;
        address recipient;
        uint256 bips;
    }

    /// Input of V4_SWAP: a nested plan of V4 router actions
    struct V4SwapParams {
        bytes actions;
        bytes[] params;
    }

    /// Parameters for the TAKE action
    struct TakeParams {
        address currency;
        address recipient;
        uint256 amount;
    }

    /// Parameters for the TAKE_PORTION action
    struct TakePortionParams {
        address currency;
        address recipient;
        uint256 bips;
    }
}

/// Command flag telling the router to continue when the command reverts.
pub const FLAG_ALLOW_REVERT: u8 = 0x80;

/// Mask selecting the command type out of a command byte.
pub const COMMAND_TYPE_MASK: u8 = 0x3f;

// Command IDs for Universal Router
//
// Source: https://github.com/Uniswap/universal-router/blob/main/contracts/libraries/Commands.sol
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum Command {
    V3SwapExactIn = 0x00,
    V3SwapExactOut = 0x01,
    Permit2TransferFrom = 0x02,
    Permit2PermitBatch = 0x03,
    Sweep = 0x04,
    Transfer = 0x05,
    PayPortion = 0x06,

    V2SwapExactIn = 0x08,
    V2SwapExactOut = 0x09,
    Permit2Permit = 0x0a,
    WrapEth = 0x0b,
    UnwrapWeth = 0x0c,
    Permit2TransferFromBatch = 0x0d,
    BalanceCheckErc20 = 0x0e,

    V4Swap = 0x10,
    V3PositionManagerPermit = 0x11,
    V3PositionManagerCall = 0x12,
    V4InitializePool = 0x13,
    V4PositionManagerCall = 0x14,

    ExecuteSubPlan = 0x21,
}

impl Command {
    /// Decodes a raw command byte.
    ///
    /// With `honor_revert_flag` the allow-revert flag and the reserved bits are
    /// masked off first, the way the router dispatches. Without it the byte
    /// must match a command value exactly.
    pub fn from_byte(raw: u8, honor_revert_flag: bool) -> Option<Self> {
        let byte = if honor_revert_flag {
            raw & COMMAND_TYPE_MASK
        } else {
            raw
        };
        Self::try_from(byte).ok()
    }
}

// Action IDs for the V4 router, nested inside V4_SWAP.
//
// This is a separate opcode space from `Command`: TakePortion and V4Swap
// share the value 0x10 and nothing else.
//
// Source: https://github.com/Uniswap/v4-periphery/blob/main/src/libraries/Actions.sol
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum Action {
    IncreaseLiquidity = 0x00,
    DecreaseLiquidity = 0x01,
    MintPosition = 0x02,
    BurnPosition = 0x03,
    IncreaseLiquidityFromDeltas = 0x04,
    MintPositionFromDeltas = 0x05,

    SwapExactInSingle = 0x06,
    SwapExactIn = 0x07,
    SwapExactOutSingle = 0x08,
    SwapExactOut = 0x09,
    Donate = 0x0a,

    Settle = 0x0b,
    SettleAll = 0x0c,
    SettlePair = 0x0d,
    Take = 0x0e,
    TakeAll = 0x0f,
    TakePortion = 0x10,
    TakePair = 0x11,
    CloseCurrency = 0x12,
    ClearOrTake = 0x13,
    Sweep = 0x14,
    Wrap = 0x15,
    Unwrap = 0x16,

    Mint6909 = 0x17,
    Burn6909 = 0x18,
}

impl Action {
    pub fn from_byte(raw: u8) -> Option<Self> {
        Self::try_from(raw).ok()
    }
}

//! Fee and unit arithmetic

use ethers::types::U256;

/// EIP-1559 max fee heuristic: `2 * baseFee + maxPriorityFeePerGas`.
///
/// Doubling the base fee buffers against base-fee growth across the
/// blocks between estimation and inclusion.
pub fn eip1559_max_fee(base_fee: U256, max_priority_fee: U256) -> U256 {
    base_fee * 2 + max_priority_fee
}

pub fn gwei_to_wei(gwei: u64) -> U256 {
    U256::from(gwei) * U256::exp10(9)
}

/// TUS display units to wei (18-decimal fixed point), exact for integers.
pub fn tus_to_wei(tus: u64) -> U256 {
    U256::from(tus) * U256::exp10(18)
}

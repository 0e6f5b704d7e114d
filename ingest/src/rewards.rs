//! Block reward computation.
//!
//! A pure function: no I/O, no side effects, exact integer arithmetic. The
//! miner of a block earns the era base reward plus the gas fees its
//! transactions paid, minus the burnt portion of the base fee.

use tally_types::{Amount, RewardSchedule};

/// Compute the miner reward for a block.
///
/// `fees_sum` is the sum of `fees_amount` over the block's applied
/// transactions; `base_fee_per_gas` is absent on blocks predating the
/// fee-burn era, in which case nothing is burnt.
pub fn block_reward(
    schedule: &RewardSchedule,
    height: u64,
    gas_used: u64,
    base_fee_per_gas: Option<&Amount>,
    fees_sum: &Amount,
) -> Amount {
    let base = schedule.base_reward_at(height);
    let burnt = base_fee_per_gas
        .map(|fee| fee * gas_used)
        .unwrap_or_else(Amount::zero);
    base + fees_sum.clone() - burnt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn reward_is_base_plus_fees_minus_burnt() {
        let schedule = RewardSchedule::mainnet();
        // Middle era: base 3 coins. Fees 10, burnt 4 (gas 2 × base fee 2).
        let reward = block_reward(&schedule, 5_000_000, 2, Some(&amt("2")), &amt("10"));
        assert_eq!(reward, Amount::from_units(3) + amt("10") - amt("4"));
        assert_eq!(reward.to_string(), "3000000000000000006");
    }

    #[test]
    fn missing_base_fee_burns_nothing() {
        let schedule = RewardSchedule::mainnet();
        let reward = block_reward(&schedule, 100, 1_000_000, None, &amt("7"));
        assert_eq!(reward, Amount::from_units(5) + amt("7"));
    }

    #[test]
    fn era_boundary_switches_base_reward() {
        let schedule = RewardSchedule::mainnet();
        let zero = Amount::zero();
        let below = block_reward(&schedule, 4_369_999, 0, None, &zero);
        let at = block_reward(&schedule, 4_370_000, 0, None, &zero);
        assert_eq!(below, Amount::from_units(5));
        assert_eq!(at, Amount::from_units(3));
    }

    #[test]
    fn empty_block_earns_exactly_the_base_reward() {
        let schedule = RewardSchedule::mainnet();
        let reward = block_reward(&schedule, 8_000_000, 0, Some(&amt("1000000000")), &Amount::zero());
        assert_eq!(reward, Amount::from_units(2));
    }
}

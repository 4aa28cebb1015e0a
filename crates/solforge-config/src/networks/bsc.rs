use super::{NetworkProfile, DEPLOYER_SECRET};

/// 20 gwei, the fixed price used on both BNB Smart Chain networks.
const BSC_GAS_PRICE_WEI: u64 = 20_000_000_000;

/// BNB Smart Chain test network (chain 97)
pub fn bsc_testnet_profile() -> NetworkProfile {
    NetworkProfile::new("bsctestnet", "https://data-seed-prebsc-1-s1.binance.org:8545")
        .with_chain_id(97)
        .with_gas_price(BSC_GAS_PRICE_WEI)
        .with_account(DEPLOYER_SECRET)
}

/// BNB Smart Chain main network (chain 56)
pub fn bsc_mainnet_profile() -> NetworkProfile {
    NetworkProfile::new("mainnet", "https://bsc-dataseed.binance.org/")
        .with_chain_id(56)
        .with_gas_price(BSC_GAS_PRICE_WEI)
        .with_account(DEPLOYER_SECRET)
}

//! Property-based tests for dropmint-core
//!
//! Uses proptest to verify commitment invariants across randomized waves and whitelists

use alloy_primitives::{keccak256, Address};
use dropmint_core::token_gate::limit;
use dropmint_core::{
    check_entitlement, encode_sale_wave_config, get_sale_config_proof, get_sale_config_root,
    verify_proof, SaleType, SaleWaveConfig, WhitelistEntry, WhitelistTree, EMPTY_ROOT,
};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate an address
fn address_strategy() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from)
}

/// Generate a whitelist with unique addresses (0-20 entries)
fn whitelist_strategy() -> impl Strategy<Value = Vec<WhitelistEntry>> {
    prop::collection::hash_map(address_strategy(), 0u64..1000, 0..20).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(address, limit)| WhitelistEntry::new(address, limit))
            .collect()
    })
}

/// Generate a decimal mint charge with up to 18 decimals
fn mint_charge_strategy() -> impl Strategy<Value = String> {
    (0u64..100, prop::string::string_regex("[0-9]{0,18}").unwrap()).prop_map(
        |(whole, fraction)| {
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, fraction)
            }
        },
    )
}

/// Generate a sale wave
fn wave_strategy() -> impl Strategy<Value = SaleWaveConfig> {
    (
        "[a-f0-9]{8}",
        any::<bool>(),
        0u64..2_000_000_000,
        0u64..2_000_000_000,
        mint_charge_strategy(),
        0u64..100,
        0u64..10_000,
        prop_oneof![Just(SaleType::Private), Just(SaleType::Public)],
        whitelist_strategy(),
        prop_oneof![Just(Address::ZERO), address_strategy()],
    )
        .prop_map(
            |(
                identifier,
                enabled,
                start_time,
                end_time,
                mint_charge,
                max_mint_per_wallet,
                max_mint_in_sale,
                sale_type,
                whitelist,
                token_gated_address,
            )| SaleWaveConfig {
                identifier,
                enabled,
                start_time,
                end_time,
                mint_charge,
                max_mint_per_wallet,
                max_mint_in_sale,
                sale_type,
                whitelist,
                token_gated_address,
            },
        )
}

/// Generate a project's waves with unique identifiers
fn waves_strategy() -> impl Strategy<Value = Vec<SaleWaveConfig>> {
    prop::collection::vec(wave_strategy(), 1..8).prop_map(|mut waves| {
        for (index, wave) in waves.iter_mut().enumerate() {
            wave.identifier = format!("{}-{}", wave.identifier, index);
        }
        waves
    })
}

// ============================================================================
// Encoding Properties
// ============================================================================

proptest! {
    /// Property: encoding is a pure function of the wave
    #[test]
    fn prop_encoding_deterministic(wave in wave_strategy()) {
        let first = encode_sale_wave_config(&wave).expect("Valid wave");
        let second = encode_sale_wave_config(&wave.clone()).expect("Valid wave");
        prop_assert_eq!(first, second);
    }

    /// Property: public waves encode the same whatever whitelist they carry
    #[test]
    fn prop_public_wave_ignores_whitelist(
        wave in wave_strategy(),
        other_list in whitelist_strategy()
    ) {
        let public = SaleWaveConfig { sale_type: SaleType::Public, ..wave };
        let swapped = SaleWaveConfig { whitelist: other_list, ..public.clone() };
        prop_assert_eq!(
            encode_sale_wave_config(&public).expect("Valid wave"),
            encode_sale_wave_config(&swapped).expect("Valid wave")
        );
    }
}

// ============================================================================
// Tree Properties
// ============================================================================

proptest! {
    /// Property: root does not depend on wave order
    #[test]
    fn prop_root_stable_under_reordering(
        waves in waves_strategy(),
        rotation in 0usize..8
    ) {
        let mut reordered = waves.clone();
        let len = reordered.len();
        reordered.rotate_left(rotation % len);
        reordered.reverse();

        prop_assert_eq!(
            get_sale_config_root(&waves).expect("Valid waves"),
            get_sale_config_root(&reordered).expect("Valid waves")
        );
    }

    /// Property: every wave's proof verifies against the project root
    #[test]
    fn prop_sale_config_proofs_verify(waves in waves_strategy()) {
        let root = get_sale_config_root(&waves).expect("Valid waves");
        prop_assert_ne!(root, EMPTY_ROOT);

        for wave in &waves {
            let proof = get_sale_config_proof(&waves, &wave.identifier).expect("Known wave");
            let leaf = keccak256(encode_sale_wave_config(wave).expect("Valid wave"));
            prop_assert!(verify_proof(leaf, &proof, root));
        }
    }

    /// Property: every whitelist entry's proof verifies, inflated limits do not
    #[test]
    fn prop_whitelist_proofs_verify(list in whitelist_strategy()) {
        let tree = WhitelistTree::build(&list);
        for entry in &list {
            let proof = tree.proof(entry);
            prop_assert!(tree.verify(entry, &proof));

            let inflated = WhitelistEntry::new(entry.address, entry.limit + 1);
            prop_assert!(!tree.verify(&inflated, &proof));
        }
    }
}

// ============================================================================
// Token Gate Properties
// ============================================================================

proptest! {
    /// Property: the limit never decreases as holdings grow
    #[test]
    fn prop_limit_monotonic(base in 0u64..1_000_000) {
        prop_assert!(limit(base + 1) >= limit(base));
        prop_assert!(limit(base) >= base);
    }

    /// Property: entitlement is exactly the limit comparison
    #[test]
    fn prop_entitlement_matches_limit(
        already in 0u64..200,
        requested in 1u64..50,
        base in 0u64..200
    ) {
        let allowed = check_entitlement(already, requested, base).is_allowed();
        prop_assert_eq!(allowed, already + requested <= limit(base));
    }
}

use std::collections::BTreeSet;

use super::types::{AssuranceLevel, MethodTag};

/// ACR URNs for the assurance tiers
mod acr {
    pub const SINGLE_FACTOR: &str = "urn:passkey-authn:acr:single-factor";
    pub const MULTI_FACTOR: &str = "urn:passkey-authn:acr:multi-factor";
    pub const HARDWARE_KEY: &str = "urn:passkey-authn:acr:hardware-key";
    pub const HARDWARE_KEY_MFA: &str = "urn:passkey-authn:acr:hardware-key-mfa";
}

/// Maps the set of methods used in a login to an assurance level
///
/// The mapping is a fixed table held by the policy value, so callers pass a
/// policy in rather than consulting a process-wide global. `Default` is the
/// documented table.
#[derive(Debug, Clone)]
pub struct AssurancePolicy {
    table: Vec<(BTreeSet<MethodTag>, AssuranceLevel)>,
    fallback: AssuranceLevel,
}

impl Default for AssurancePolicy {
    fn default() -> Self {
        use MethodTag::*;

        let entry = |methods: &[MethodTag], acr: &str, aal: u8| {
            (
                methods.iter().copied().collect::<BTreeSet<_>>(),
                AssuranceLevel {
                    acr: acr.to_string(),
                    aal,
                },
            )
        };

        Self {
            table: vec![
                entry(&[Password], acr::SINGLE_FACTOR, 1),
                entry(&[EmailCode], acr::SINGLE_FACTOR, 1),
                entry(&[SmsCode], acr::SINGLE_FACTOR, 1),
                entry(&[Totp], acr::MULTI_FACTOR, 2),
                entry(&[Password, Totp], acr::MULTI_FACTOR, 2),
                entry(&[Password, EmailCode], acr::MULTI_FACTOR, 2),
                entry(&[Password, SmsCode], acr::MULTI_FACTOR, 2),
                entry(&[Passkey], acr::HARDWARE_KEY, 3),
                entry(&[Password, Passkey], acr::HARDWARE_KEY, 3),
                entry(&[Passkey, Totp], acr::HARDWARE_KEY_MFA, 4),
            ],
            fallback: AssuranceLevel {
                acr: acr::SINGLE_FACTOR.to_string(),
                aal: 1,
            },
        }
    }
}

impl AssurancePolicy {
    /// Resolves the assurance level for a set of authentication methods
    ///
    /// Total over every input: the empty set and any combination without a
    /// table entry fail closed to the weakest tier instead of erroring.
    pub fn evaluate(&self, methods: &BTreeSet<MethodTag>) -> AssuranceLevel {
        if let Some((_, level)) = self.table.iter().find(|(set, _)| set == methods) {
            return level.clone();
        }

        if !methods.is_empty() {
            tracing::debug!(
                "No assurance mapping for methods {:?}, failing closed",
                methods
            );
        }
        self.fallback.clone()
    }
}

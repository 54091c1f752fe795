//! Confirmation state of multisig transactions.
//!
//! Everything here is recomputed from the latest gateway data, nothing is stored.

use crate::{
    details::{MultisigExecutionInfo, SafeInfo, TransactionDetails, TxStatus},
    execution,
    keys::{KeyInfo, KeyRegistry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfirmationState {
    AwaitingConfirmations,
    AwaitingYourConfirmation,
    AwaitingExecution,
    Rejected,
    Success,
    Failed,
    Canceled,
}

impl ConfirmationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConfirmationState::Success | ConfirmationState::Failed | ConfirmationState::Canceled
        )
    }
}

pub fn classify(
    details: &TransactionDetails,
    keys: &(impl KeyRegistry + ?Sized),
) -> ConfirmationState {
    match details.tx_status {
        TxStatus::Success => return ConfirmationState::Success,
        TxStatus::Failed => return ConfirmationState::Failed,
        TxStatus::Cancelled => return ConfirmationState::Canceled,
        TxStatus::Unknown => return ConfirmationState::AwaitingConfirmations,
        _ => {}
    }

    let Some(info) = details.multisig_info() else {
        return match details.tx_status {
            TxStatus::AwaitingExecution => ConfirmationState::AwaitingExecution,
            _ => ConfirmationState::AwaitingConfirmations,
        };
    };

    if !details.is_rejection() && info.is_rejected() {
        return ConfirmationState::Rejected;
    }

    if !info.needs_more_signatures() {
        return ConfirmationState::AwaitingExecution;
    }

    if signer_keys(info, keys).is_empty() {
        ConfirmationState::AwaitingConfirmations
    } else {
        ConfirmationState::AwaitingYourConfirmation
    }
}

/// Keys of signers that have not confirmed yet.
pub fn signer_keys(info: &MultisigExecutionInfo, keys: &(impl KeyRegistry + ?Sized)) -> Vec<KeyInfo> {
    let remaining: Vec<_> =
        info.signers.iter().copied().filter(|signer| !info.has_confirmed(*signer)).collect();
    keys.keys_for_addresses(&remaining)
}

/// Keys of signers that have not rejected yet.
pub fn rejector_keys(
    info: &MultisigExecutionInfo,
    keys: &(impl KeyRegistry + ?Sized),
) -> Vec<KeyInfo> {
    let remaining: Vec<_> =
        info.signers.iter().copied().filter(|signer| !info.has_rejected(*signer)).collect();
    keys.keys_for_addresses(&remaining)
}

/// Whether the user holds any signer key of the transaction.
pub fn can_sign(info: &MultisigExecutionInfo, keys: &(impl KeyRegistry + ?Sized)) -> bool {
    !keys.keys_for_addresses(&info.signers).is_empty()
}

pub fn needs_your_confirmation(
    details: &TransactionDetails,
    keys: &(impl KeyRegistry + ?Sized),
) -> bool {
    let Some(info) = details.multisig_info() else {
        return false;
    };

    details.tx_status.is_awaiting_confirmations()
        && info.needs_more_signatures()
        && !signer_keys(info, keys).is_empty()
}

pub fn needs_your_execution(
    details: &TransactionDetails,
    safe: &SafeInfo,
    keys: &(impl KeyRegistry + ?Sized),
) -> bool {
    let Some(info) = details.multisig_info() else {
        return false;
    };

    details.tx_status == TxStatus::AwaitingExecution
        && info.ecdsa_confirmations().count() as u64 >= info.confirmations_required
        && !execution::execution_keys(safe, keys).is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Hidden,
    Disabled,
    Enabled,
}

impl Action {
    fn new(shown: bool, enabled: bool) -> Self {
        match (shown, enabled) {
            (false, _) => Action::Hidden,
            (true, false) => Action::Disabled,
            (true, true) => Action::Enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Action::Enabled)
    }
}

/// What the user may do with a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionActions {
    pub confirm: Action,
    pub reject: Action,
    pub execute: Action,
}

impl TransactionActions {
    pub const NONE: TransactionActions = TransactionActions {
        confirm: Action::Hidden,
        reject: Action::Hidden,
        execute: Action::Hidden,
    };
}

pub fn available_actions(
    details: &TransactionDetails,
    safe: &SafeInfo,
    keys: &(impl KeyRegistry + ?Sized),
) -> TransactionActions {
    let Some(info) = details.multisig_info() else {
        return TransactionActions::NONE;
    };

    if !can_sign(info, keys) {
        return TransactionActions::NONE;
    }

    let status = details.tx_status;
    let awaiting_confirmations = status.is_awaiting_confirmations();

    // Rejections can not be rejected themselves.
    let shows_reject = !details.is_rejection()
        && ((status == TxStatus::AwaitingExecution && !info.is_rejected())
            || awaiting_confirmations);
    let shows_confirm = awaiting_confirmations;
    let shows_execute = safe.nonce == info.nonce && needs_your_execution(details, safe, keys);

    TransactionActions {
        confirm: Action::new(shows_confirm, needs_your_confirmation(details, keys)),
        reject: Action::new(shows_reject, !info.is_rejected()),
        execute: Action::new(shows_execute, true),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        details::{DetailedExecutionInfo, TxInfo},
        execution::test::{confirmed_by, key, safe, OWNER_A, OWNER_B, OWNER_C},
        keys::{KeyType, MockKeyRegistry, StaticKeyRegistry},
    };

    fn holding(addresses: &[alloy_primitives::Address]) -> StaticKeyRegistry {
        StaticKeyRegistry::new(
            addresses.iter().map(|address| key(*address, KeyType::DeviceImported)).collect(),
        )
    }

    fn with_rejectors(mut details: TransactionDetails) -> TransactionDetails {
        let Some(DetailedExecutionInfo::Multisig(info)) = details.detailed_execution_info.as_mut()
        else {
            unreachable!()
        };
        info.rejectors = vec![OWNER_C];
        details
    }

    fn as_rejection(mut details: TransactionDetails) -> TransactionDetails {
        details.tx_info = TxInfo::Custom { to: Some(details.safe_address), is_cancellation: true };
        details
    }

    #[test]
    fn awaiting_your_confirmation() {
        let details = confirmed_by(&[OWNER_B]);
        assert_eq!(classify(&details, &holding(&[OWNER_A])), ConfirmationState::AwaitingYourConfirmation);
    }

    #[test]
    fn awaiting_others() {
        let details = confirmed_by(&[OWNER_B]);
        assert_eq!(classify(&details, &holding(&[])), ConfirmationState::AwaitingConfirmations);
        assert_eq!(classify(&details, &holding(&[OWNER_B])), ConfirmationState::AwaitingConfirmations);
    }

    #[test]
    fn awaiting_execution() {
        let mut details = confirmed_by(&[OWNER_A, OWNER_B]);
        details.tx_status = TxStatus::AwaitingExecution;
        assert_eq!(classify(&details, &holding(&[OWNER_C])), ConfirmationState::AwaitingExecution);
    }

    #[test]
    fn rejection_takes_precedence() {
        let mut details = with_rejectors(confirmed_by(&[OWNER_A, OWNER_B]));
        details.tx_status = TxStatus::AwaitingExecution;
        assert_eq!(classify(&details, &holding(&[OWNER_A])), ConfirmationState::Rejected);

        // The rejection itself is counted like any other transaction.
        let rejection = as_rejection(details);
        assert_eq!(classify(&rejection, &holding(&[OWNER_A])), ConfirmationState::AwaitingExecution);
    }

    #[test]
    fn terminal_states_are_reported() {
        let mut details = with_rejectors(confirmed_by(&[OWNER_A]));
        let keys = MockKeyRegistry::new();

        for (status, state) in [
            (TxStatus::Success, ConfirmationState::Success),
            (TxStatus::Failed, ConfirmationState::Failed),
            (TxStatus::Cancelled, ConfirmationState::Canceled),
        ] {
            details.tx_status = status;
            assert_eq!(classify(&details, &keys), state);
            assert!(state.is_terminal());
        }
    }

    #[test]
    fn unknown_status_offers_nothing() {
        let mut details = confirmed_by(&[OWNER_B]);
        details.tx_status = TxStatus::Unknown;
        let keys = holding(&[OWNER_A, OWNER_C]);

        assert_eq!(classify(&details, &keys), ConfirmationState::AwaitingConfirmations);
        assert!(!needs_your_confirmation(&details, &keys));
        assert!(!needs_your_execution(&details, &safe(5), &keys));
        assert_eq!(available_actions(&details, &safe(5), &keys), TransactionActions::NONE);
    }

    #[test]
    fn remaining_signer_and_rejector_keys() {
        let details = with_rejectors(confirmed_by(&[OWNER_A]));
        let info = details.multisig_info().unwrap();
        let keys = holding(&[OWNER_A, OWNER_B, OWNER_C]);

        let signers: Vec<_> = signer_keys(info, &keys).into_iter().map(|k| k.address).collect();
        assert_eq!(signers, vec![OWNER_B, OWNER_C]);

        let rejectors: Vec<_> = rejector_keys(info, &keys).into_iter().map(|k| k.address).collect();
        assert_eq!(rejectors, vec![OWNER_A, OWNER_B]);
        assert!(info.has_rejected(OWNER_C));
    }

    #[test]
    fn actions_while_collecting_confirmations() {
        let details = confirmed_by(&[OWNER_B]);
        let actions = available_actions(&details, &safe(5), &holding(&[OWNER_A]));

        assert_eq!(actions.confirm, Action::Enabled);
        assert_eq!(actions.reject, Action::Enabled);
        assert_eq!(actions.execute, Action::Hidden);
    }

    #[test]
    fn confirmed_signer_cannot_confirm_again() {
        let details = confirmed_by(&[OWNER_A]);
        let actions = available_actions(&details, &safe(5), &holding(&[OWNER_A]));

        assert_eq!(actions.confirm, Action::Disabled);
        assert!(actions.reject.is_enabled());
    }

    #[test]
    fn actions_when_ready_to_execute() {
        let mut details = confirmed_by(&[OWNER_A, OWNER_B]);
        details.tx_status = TxStatus::AwaitingExecution;
        let keys = holding(&[OWNER_A]);

        let actions = available_actions(&details, &safe(5), &keys);
        assert_eq!(actions.confirm, Action::Hidden);
        assert_eq!(actions.reject, Action::Enabled);
        assert_eq!(actions.execute, Action::Enabled);

        // Not next in line.
        assert_eq!(available_actions(&details, &safe(4), &keys).execute, Action::Hidden);

        // Already being rejected.
        let rejected = with_rejectors(details);
        assert_eq!(available_actions(&rejected, &safe(5), &keys).reject, Action::Hidden);
    }

    #[test]
    fn rejections_cannot_be_rejected() {
        let details = as_rejection(confirmed_by(&[OWNER_B]));
        let actions = available_actions(&details, &safe(5), &holding(&[OWNER_A]));

        assert_eq!(actions.reject, Action::Hidden);
        assert_eq!(actions.confirm, Action::Enabled);
    }

    #[test]
    fn strangers_see_no_actions() {
        let details = confirmed_by(&[OWNER_B]);
        let mut keys = MockKeyRegistry::new();
        keys.expect_keys_for_addresses().returning(|_| Vec::new());

        assert_eq!(available_actions(&details, &safe(5), &keys), TransactionActions::NONE);
        assert!(!needs_your_confirmation(&details, &keys));
    }
}

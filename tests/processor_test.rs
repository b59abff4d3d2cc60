// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Processor public API integration tests.

use atm_engine::{
    Account, AccountRecord, AccountStore, AmountRejection, AtmConfig, EntryKind, MemoryStore,
    Operation, StoreError, TransactionError, TransactionProcessor,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn atm_with_reference_account() -> TransactionProcessor {
    let processor = TransactionProcessor::new();
    processor
        .register_account("12345", dec!(1000.00), dec!(500.00))
        .unwrap();
    processor
}

fn ledger_len(processor: &TransactionProcessor, account_id: &str) -> usize {
    processor.get_account(account_id).unwrap().ledger_len()
}

// === Reference Scenario ===

#[test]
fn reference_scenario() {
    let processor = atm_with_reference_account();

    // 1. Withdrawal
    assert_eq!(processor.withdrawal("12345", dec!(100.00)), Ok(dec!(900.00)));
    assert_eq!(ledger_len(&processor, "12345"), 1);

    // 2. Deposit
    assert_eq!(processor.deposit("12345", dec!(200.00)), Ok(dec!(1100.00)));
    assert_eq!(ledger_len(&processor, "12345"), 2);

    // 3. Inquiry does not add to the ledger
    assert_eq!(processor.balance_inquiry("12345"), Ok(dec!(1100.00)));
    assert_eq!(ledger_len(&processor, "12345"), 2);

    // 4. Insufficient funds
    assert_eq!(
        processor.withdrawal("12345", dec!(5000.00)),
        Err(TransactionError::InsufficientFunds {
            available: dec!(1100.00),
            requested: dec!(5000.00),
        })
    );
    assert_eq!(processor.balance_inquiry("12345"), Ok(dec!(1100.00)));

    // 5. Over the per-withdrawal limit
    assert_eq!(
        processor.withdrawal("12345", dec!(600.00)),
        Err(TransactionError::ExceededWithdrawLimit {
            limit: dec!(500.00),
            requested: dec!(600.00),
        })
    );
    assert_eq!(processor.balance_inquiry("12345"), Ok(dec!(1100.00)));
    assert_eq!(ledger_len(&processor, "12345"), 2);

    // 6. Unknown account
    assert_eq!(
        processor.withdrawal("99999", dec!(10.00)),
        Err(TransactionError::AccountNotFound("99999".into()))
    );
}

#[test]
fn ledger_records_each_mutation() {
    let processor = atm_with_reference_account();
    processor.withdrawal("12345", dec!(100.00)).unwrap();
    processor.deposit("12345", dec!(200.00)).unwrap();
    processor.balance_inquiry("12345").unwrap();

    let ledger = processor.ledger("12345").unwrap();
    assert_eq!(ledger.len(), 2);

    assert_eq!(ledger[0].kind(), EntryKind::Withdraw);
    assert_eq!(ledger[0].amount(), dec!(100.00));
    assert_eq!(ledger[0].balance_after(), dec!(900.00));

    assert_eq!(ledger[1].kind(), EntryKind::Deposit);
    assert_eq!(ledger[1].amount(), dec!(200.00));
    assert_eq!(ledger[1].balance_after(), dec!(1100.00));

    assert!(ledger[0].id() < ledger[1].id());
    assert!(ledger[0].created_at() <= ledger[1].created_at());
}

// === Registration ===

#[test]
fn duplicate_registration_returns_error() {
    let processor = atm_with_reference_account();

    let result = processor.register_account("12345", dec!(1.00), dec!(1.00));
    assert_eq!(result, Err(TransactionError::DuplicateAccount("12345".into())));

    // Original account untouched
    assert_eq!(processor.balance_inquiry("12345"), Ok(dec!(1000.00)));
    assert_eq!(processor.len(), 1);
}

#[test]
fn register_rejects_negative_opening_balance() {
    let processor = TransactionProcessor::new();
    let result = processor.register_account("1", dec!(-10.00), dec!(100.00));
    assert_eq!(
        result,
        Err(TransactionError::InvalidAmount {
            requested: dec!(-10.00),
            reason: AmountRejection::Negative,
        })
    );
    assert!(processor.is_empty());
}

#[test]
fn register_prebuilt_account_with_holder() {
    let processor = TransactionProcessor::new();
    let account = Account::new("54321", dec!(50.00), dec!(100.00))
        .unwrap()
        .with_holder("Test User");
    processor.register(account).unwrap();

    let account = processor.get_account("54321").unwrap();
    assert_eq!(account.holder(), Some("Test User"));
}

// === Validation Order ===

#[test]
fn non_positive_withdrawal_is_invalid_even_when_over_balance_and_limit() {
    let processor = TransactionProcessor::new();
    processor.register_account("1", dec!(10.00), dec!(5.00)).unwrap();

    for amount in [Decimal::ZERO, dec!(-1000.00)] {
        let result = processor.withdrawal("1", amount);
        assert!(matches!(
            result,
            Err(TransactionError::InvalidAmount {
                reason: AmountRejection::NotPositive,
                ..
            })
        ));
    }
    assert_eq!(ledger_len(&processor, "1"), 0);
}

#[test]
fn balance_checked_before_limit() {
    let processor = TransactionProcessor::new();
    processor.register_account("54321", dec!(50.00), dec!(100.00)).unwrap();

    // Exceeds both balance and limit
    let result = processor.withdrawal("54321", dec!(200.00));
    assert_eq!(
        result,
        Err(TransactionError::InsufficientFunds {
            available: dec!(50.00),
            requested: dec!(200.00),
        })
    );
}

#[test]
fn withdraw_entire_balance() {
    let processor = TransactionProcessor::new();
    processor.register_account("1", dec!(80.00), dec!(100.00)).unwrap();

    assert_eq!(processor.withdrawal("1", dec!(80.00)), Ok(Decimal::ZERO));
    assert!(matches!(
        processor.withdrawal("1", dec!(0.01)),
        Err(TransactionError::InsufficientFunds { .. })
    ));
}

#[test]
fn invalid_deposit_leaves_account_unchanged() {
    let processor = atm_with_reference_account();

    assert!(matches!(
        processor.deposit("12345", dec!(-50.00)),
        Err(TransactionError::InvalidAmount { .. })
    ));
    assert!(matches!(
        processor.deposit("12345", dec!(0.001)),
        Err(TransactionError::InvalidAmount {
            reason: AmountRejection::TooPrecise,
            ..
        })
    ));
    assert_eq!(processor.balance_inquiry("12345"), Ok(dec!(1000.00)));
    assert_eq!(ledger_len(&processor, "12345"), 0);
}

#[test]
fn oversized_deposit_is_rejected_without_mutation() {
    let processor = atm_with_reference_account();

    assert_eq!(
        processor.deposit("12345", Decimal::MAX),
        Err(TransactionError::InvalidAmount {
            requested: Decimal::MAX,
            reason: AmountRejection::TooLarge,
        })
    );
    assert_eq!(processor.balance_inquiry("12345"), Ok(dec!(1000.00)));
    assert_eq!(ledger_len(&processor, "12345"), 0);
}

#[test]
fn deposit_overflowing_balance_is_rejected_without_mutation() {
    let full = Decimal::from_i128_with_scale(Decimal::MAX.mantissa(), 2);
    let processor = TransactionProcessor::new();
    processor.register_account("1", full, dec!(100.00)).unwrap();

    assert_eq!(
        processor.deposit("1", dec!(1.00)),
        Err(TransactionError::InvalidAmount {
            requested: dec!(1.00),
            reason: AmountRejection::TooLarge,
        })
    );
    assert_eq!(processor.balance_inquiry("1"), Ok(full));
    assert_eq!(ledger_len(&processor, "1"), 0);
}

#[test]
fn register_rejects_balance_without_room_for_cents() {
    let processor = TransactionProcessor::new();
    let huge = Decimal::from_i128_with_scale(10i128.pow(27), 0);

    assert_eq!(
        processor.register_account("1", huge, dec!(100.00)),
        Err(TransactionError::InvalidAmount {
            requested: huge,
            reason: AmountRejection::TooLarge,
        })
    );
    assert!(processor.is_empty());
}

#[test]
fn deposit_has_no_limit() {
    let processor = atm_with_reference_account();
    assert_eq!(processor.deposit("12345", dec!(10000.00)), Ok(dec!(11000.00)));
}

#[test]
fn note_denomination_config() {
    let processor = TransactionProcessor::with_config(AtmConfig::with_note_denomination(dec!(10.00)));
    processor.register_account("12345", dec!(1000.00), dec!(500.00)).unwrap();

    assert_eq!(
        processor.withdrawal("12345", dec!(35.00)),
        Err(TransactionError::InvalidAmount {
            requested: dec!(35.00),
            reason: AmountRejection::NotMultipleOf(dec!(10.00)),
        })
    );
    assert_eq!(processor.withdrawal("12345", dec!(40.00)), Ok(dec!(960.00)));
    // Deposits are not bound to notes
    assert_eq!(processor.deposit("12345", dec!(0.35)), Ok(dec!(960.35)));
}

// === Unknown Accounts ===

#[test]
fn unknown_account_fails_every_operation() {
    let processor = atm_with_reference_account();
    let missing = TransactionError::AccountNotFound("nope".into());

    for operation in Operation::ALL {
        assert_eq!(
            processor.execute(operation, "nope", dec!(10.00)),
            Err(missing.clone())
        );
    }
    assert_eq!(processor.ledger("nope"), Err(missing));
    assert_eq!(processor.len(), 1);
}

#[test]
fn accounts_are_independent() {
    let processor = TransactionProcessor::new();
    processor.register_account("a", dec!(100.00), dec!(100.00)).unwrap();
    processor.register_account("b", dec!(200.00), dec!(100.00)).unwrap();

    processor.withdrawal("a", dec!(30.00)).unwrap();

    assert_eq!(processor.balance_inquiry("a"), Ok(dec!(70.00)));
    assert_eq!(processor.balance_inquiry("b"), Ok(dec!(200.00)));
    assert_eq!(ledger_len(&processor, "b"), 0);
    assert_eq!(processor.accounts().count(), 2);
}

// === Account Store ===

#[test]
fn save_and_load_round_trip() {
    let store = MemoryStore::new();
    let processor = atm_with_reference_account();
    processor.withdrawal("12345", dec!(100.00)).unwrap();
    processor.save_account(&store, "12345").unwrap();

    let restored = TransactionProcessor::new();
    restored.load_account(&store, "12345").unwrap();

    assert_eq!(restored.balance_inquiry("12345"), Ok(dec!(900.00)));
    assert_eq!(restored.ledger("12345").unwrap(), processor.ledger("12345").unwrap());
}

#[test]
fn load_missing_account_returns_not_found() {
    let store = MemoryStore::new();
    let processor = TransactionProcessor::new();
    assert_eq!(
        processor.load_account(&store, "12345"),
        Err(TransactionError::AccountNotFound("12345".into()))
    );
}

#[test]
fn load_twice_returns_duplicate() {
    let store = MemoryStore::new();
    atm_with_reference_account().save_all(&store).unwrap();

    let processor = TransactionProcessor::new();
    processor.load_account(&store, "12345").unwrap();
    assert_eq!(
        processor.load_account(&store, "12345"),
        Err(TransactionError::DuplicateAccount("12345".into()))
    );
}

#[test]
fn save_all_writes_every_account() {
    let store = MemoryStore::new();
    let processor = TransactionProcessor::new();
    processor.register_account("a", dec!(1.00), dec!(1.00)).unwrap();
    processor.register_account("b", dec!(2.00), dec!(1.00)).unwrap();

    assert_eq!(processor.save_all(&store), Ok(2));
    assert_eq!(store.len(), 2);
}

/// Store whose backend is always down.
struct OfflineStore;

impl AccountStore for OfflineStore {
    fn load(&self, _: &atm_engine::AccountId) -> Result<Option<AccountRecord>, StoreError> {
        Err(StoreError::new("offline"))
    }

    fn save(&self, _: &AccountRecord) -> Result<(), StoreError> {
        Err(StoreError::new("offline"))
    }
}

#[test]
fn store_failures_surface_as_store_errors() {
    let processor = atm_with_reference_account();

    assert_eq!(
        processor.save_account(&OfflineStore, "12345"),
        Err(TransactionError::Store(StoreError::new("offline")))
    );
    assert_eq!(
        processor.load_account(&OfflineStore, "other"),
        Err(TransactionError::Store(StoreError::new("offline")))
    );
}

#[test]
fn store_is_usable_as_trait_object() {
    let store: Box<dyn AccountStore> = Box::new(MemoryStore::new());
    let processor = atm_with_reference_account();
    processor.save_account(store.as_ref(), "12345").unwrap();
    assert!(store.load(&"12345".into()).unwrap().is_some());
}

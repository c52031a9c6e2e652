//! Ledger behavior tests against a real SQLite database.

mod common;

use rust_decimal_macros::dec;

use amora_core::audit::{events, AuditLogRepositoryTrait};
use amora_core::errors::Error;
use amora_core::gifts::{GiftRepositoryTrait, GiftTransactionRepositoryTrait, RecordGiftSend};
use amora_core::kyc::{KycDecision, KycDocType, KycRepositoryTrait, NewKycSubmission};
use amora_core::money::split_gift;
use amora_core::payments::{
    CoinPackageRepositoryTrait, NewPayment, PaymentProvider, PaymentRepositoryTrait,
    PaymentStatus, SettleTopUp, SettlementOutcome,
};
use amora_core::subscriptions::{
    ActivationOutcome, NewSubscriptionPurchase, PlanCode, SubscriptionRepositoryTrait,
};
use amora_core::users::UserRepositoryTrait;
use amora_core::wallets::WalletRepositoryTrait;
use amora_core::withdrawals::{
    NewWithdrawal, WithdrawalMethod, WithdrawalRepositoryTrait, WithdrawalStatus,
};

use common::{rose_gift, seed_user, set_wallet, setup, topup_package};

#[tokio::test]
async fn webhook_settlement_credits_exactly_once() {
    let store = setup().await;
    let alice = seed_user(&store, "alice").await;
    let package = store.packages.create(topup_package()).await.unwrap();
    store.wallets.get_or_create(&alice.id).await.unwrap();

    let payment = store
        .payments
        .create_initiated(NewPayment {
            user_id: alice.id.clone(),
            package_id: package.id.clone(),
            provider: PaymentProvider::Chapa,
            tx_ref: "coin-alice-abc123".to_string(),
            price_total_etb: package.price_total_etb,
            vat_etb: package.vat_etb,
        })
        .await
        .unwrap();

    let settle = SettleTopUp {
        tx_ref: "coin-alice-abc123".to_string(),
        provider_ref: Some("CH-REF-1".to_string()),
        provider_fee: None,
    };

    let first = store.payments.settle_success(settle.clone()).await.unwrap();
    match first {
        SettlementOutcome::Credited {
            wallet,
            coins_credited,
            payment: settled,
        } => {
            assert_eq!(coins_credited, 100);
            assert_eq!(wallet.coin_balance, 100);
            assert_eq!(settled.status, PaymentStatus::Success);
            // gw fee is the residual of the grossed price.
            assert_eq!(settled.gw_fee_etb, Some(dec!(5.62)));
        }
        other => panic!("expected Credited, got {other:?}"),
    }

    // Replay: no extra coins, still one receipt.
    let second = store.payments.settle_success(settle).await.unwrap();
    assert!(matches!(second, SettlementOutcome::AlreadySettled { .. }));

    let wallet = store.wallets.get_by_user(&alice.id).unwrap().unwrap();
    assert_eq!(wallet.coin_balance, 100);

    let receipt = store.payments.get_receipt(&payment.id).unwrap().unwrap();
    assert_eq!(receipt.provider_ref, "CH-REF-1");

    let audits = store
        .audit
        .list_for_user_event(&alice.id, events::PAYMENT_SUCCESS, 10)
        .unwrap();
    assert_eq!(audits.len(), 1);
}

#[tokio::test]
async fn settlement_flags_gateway_fee_mismatch() {
    let store = setup().await;
    let alice = seed_user(&store, "alice2").await;
    let package = store.packages.create(topup_package()).await.unwrap();
    store.wallets.get_or_create(&alice.id).await.unwrap();

    store
        .payments
        .create_initiated(NewPayment {
            user_id: alice.id.clone(),
            package_id: package.id.clone(),
            provider: PaymentProvider::Chapa,
            tx_ref: "coin-alice2-xyz".to_string(),
            price_total_etb: package.price_total_etb,
            vat_etb: package.vat_etb,
        })
        .await
        .unwrap();

    let outcome = store
        .payments
        .settle_success(SettleTopUp {
            tx_ref: "coin-alice2-xyz".to_string(),
            provider_ref: None,
            provider_fee: Some(dec!(6.00)),
        })
        .await
        .unwrap();

    match outcome {
        SettlementOutcome::Credited { payment, .. } => {
            // The provider's reported fee wins over the residual.
            assert_eq!(payment.gw_fee_etb, Some(dec!(6.00)));
        }
        other => panic!("expected Credited, got {other:?}"),
    }

    let mismatches = store
        .audit
        .list_for_user_event(&alice.id, events::GW_FEE_MISMATCH, 10)
        .unwrap();
    assert_eq!(mismatches.len(), 1);
}

#[tokio::test]
async fn gift_send_with_exactly_enough_coins_succeeds_once() {
    let store = setup().await;
    let alice = seed_user(&store, "gift_alice").await;
    let bob = seed_user(&store, "gift_bob").await;
    let gift = store.gifts.create(rose_gift()).await.unwrap();

    store.wallets.get_or_create(&alice.id).await.unwrap();
    store.wallets.get_or_create(&bob.id).await.unwrap();
    set_wallet(&store, &alice.id, 100, dec!(0.00), 1);

    let send = RecordGiftSend {
        sender_id: alice.id.clone(),
        recipient_id: bob.id.clone(),
        gift_id: gift.id.clone(),
        gift_name: gift.name.clone(),
        quantity: 1,
        total_coins: 100,
        total_value: dec!(100.00),
        split: split_gift(dec!(100.00), dec!(0.25), dec!(0.15)),
        message: None,
    };

    let outcome = store.gift_transactions.record_send(send.clone()).await.unwrap();
    assert_eq!(outcome.sender_wallet.coin_balance, 0);
    assert_eq!(outcome.recipient_wallet.balance_etb, dec!(75.00));

    let tx = &outcome.transaction;
    assert_eq!(tx.commission_gross + tx.creator_payout, tx.value_etb);
    assert_eq!(tx.commission_net + tx.vat_on_commission, tx.commission_gross);

    // Second identical send: the conditional debit finds no coins.
    let err = store.gift_transactions.record_send(send).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientCoins));

    // Failed attempt rolled back: balances untouched, one transaction.
    let alice_wallet = store.wallets.get_by_user(&alice.id).unwrap().unwrap();
    let bob_wallet = store.wallets.get_by_user(&bob.id).unwrap().unwrap();
    assert_eq!(alice_wallet.coin_balance, 0);
    assert_eq!(bob_wallet.balance_etb, dec!(75.00));
    assert_eq!(
        store
            .gift_transactions
            .recent_for_user(&bob.id, 10)
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn withdrawal_lifecycle_to_paid() {
    let store = setup().await;
    let bob = seed_user(&store, "wd_bob").await;
    store.wallets.get_or_create(&bob.id).await.unwrap();
    set_wallet(&store, &bob.id, 0, dec!(1200.00), 2);

    let withdrawal = store
        .withdrawals
        .create_pending(
            &bob.id,
            NewWithdrawal {
                method: WithdrawalMethod::Chapa,
                destination: "acc_987".to_string(),
                amount_etb: dec!(600.00),
            },
        )
        .await
        .unwrap();
    assert_eq!(withdrawal.status, WithdrawalStatus::Pending);

    // Hold placed, balance untouched.
    let wallet = store.wallets.get_by_user(&bob.id).unwrap().unwrap();
    assert_eq!(wallet.hold_etb, dec!(600.00));
    assert_eq!(wallet.balance_etb, dec!(1200.00));

    let approved = store.withdrawals.approve(&withdrawal.id).await.unwrap();
    assert_eq!(approved.status, WithdrawalStatus::Approved);
    assert!(approved.approved_at.is_some());

    let (paid, wallet) = store
        .withdrawals
        .settle_paid(&withdrawal.id, "STUB-REF")
        .await
        .unwrap();
    assert_eq!(paid.status, WithdrawalStatus::Paid);
    assert_eq!(paid.provider_ref.as_deref(), Some("STUB-REF"));
    assert_eq!(wallet.balance_etb, dec!(600.00));
    assert_eq!(wallet.hold_etb, dec!(0.00));
}

#[tokio::test]
async fn withdrawal_reject_releases_hold_and_stays_terminal() {
    let store = setup().await;
    let carol = seed_user(&store, "wd_carol").await;
    store.wallets.get_or_create(&carol.id).await.unwrap();
    set_wallet(&store, &carol.id, 0, dec!(800.00), 2);

    let withdrawal = store
        .withdrawals
        .create_pending(
            &carol.id,
            NewWithdrawal {
                method: WithdrawalMethod::Telebirr,
                destination: "msisdn_911".to_string(),
                amount_etb: dec!(500.00),
            },
        )
        .await
        .unwrap();

    let wallet = store.wallets.get_by_user(&carol.id).unwrap().unwrap();
    assert_eq!(wallet.hold_etb, dec!(500.00));

    let (rejected, wallet) = store
        .withdrawals
        .reject(&withdrawal.id, "Bad account")
        .await
        .unwrap();
    assert_eq!(rejected.status, WithdrawalStatus::Rejected);
    assert_eq!(rejected.failure_reason.as_deref(), Some("Bad account"));
    assert_eq!(wallet.hold_etb, dec!(0.00));
    assert_eq!(wallet.balance_etb, dec!(800.00));

    // The state machine is monotonic: a rejected request cannot be
    // approved afterwards.
    let err = store.withdrawals.approve(&withdrawal.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn withdrawal_hold_re_check_fails_when_funds_short() {
    let store = setup().await;
    let dave = seed_user(&store, "wd_dave").await;
    store.wallets.get_or_create(&dave.id).await.unwrap();
    set_wallet(&store, &dave.id, 0, dec!(1000.00), 2);

    store
        .withdrawals
        .create_pending(
            &dave.id,
            NewWithdrawal {
                method: WithdrawalMethod::Chapa,
                destination: "acc_1".to_string(),
                amount_etb: dec!(700.00),
            },
        )
        .await
        .unwrap();

    // Only 300 available now; a second 700 request must fail and leave
    // the hold as-is.
    let err = store
        .withdrawals
        .create_pending(
            &dave.id,
            NewWithdrawal {
                method: WithdrawalMethod::Chapa,
                destination: "acc_1".to_string(),
                amount_etb: dec!(700.00),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientAvailable));

    let wallet = store.wallets.get_by_user(&dave.id).unwrap().unwrap();
    assert_eq!(wallet.hold_etb, dec!(700.00));

    // Hold equals the sum of non-terminal requests.
    let open: Vec<_> = store
        .withdrawals
        .list_for_user(&dave.id)
        .unwrap()
        .into_iter()
        .filter(|w| !w.status.is_terminal())
        .collect();
    let open_total: rust_decimal::Decimal = open.iter().map(|w| w.amount_etb).sum();
    assert_eq!(open_total, wallet.hold_etb);
}

#[tokio::test]
async fn kyc_single_pending_and_verification_raises_level() {
    let store = setup().await;
    let erin = seed_user(&store, "kyc_erin").await;
    store.wallets.get_or_create(&erin.id).await.unwrap();

    let first = store
        .kyc
        .create_pending(NewKycSubmission {
            user_id: erin.id.clone(),
            doc_type: KycDocType::Nid,
            document_path: "kyc/documents/a".to_string(),
            selfie_path: "kyc/selfies/a".to_string(),
        })
        .await
        .unwrap();

    // A second submission while one is pending returns the existing row.
    let second = store
        .kyc
        .create_pending(NewKycSubmission {
            user_id: erin.id.clone(),
            doc_type: KycDocType::Passport,
            document_path: "kyc/documents/b".to_string(),
            selfie_path: "kyc/selfies/b".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    store
        .kyc
        .review(&first.id, KycDecision::Verified, "admin-1", None)
        .await
        .unwrap();

    let wallet = store.wallets.get_by_user(&erin.id).unwrap().unwrap();
    assert_eq!(wallet.kyc_level, 2);

    // Reviewing twice is rejected.
    let err = store
        .kyc
        .review(&first.id, KycDecision::Rejected, "admin-1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn perk_expiry_sweep_is_idempotent() {
    let store = setup().await;
    let frank = seed_user(&store, "sub_frank").await;

    let outcome = store
        .subscriptions
        .activate_direct(NewSubscriptionPurchase {
            user_id: frank.id.clone(),
            plan: PlanCode::Boost,
            amount_etb: dec!(199.00),
            duration_days: 30,
            tx_ref: "sub-boost-frank-1".to_string(),
        })
        .await
        .unwrap();
    let expires_at = match outcome {
        ActivationOutcome::Activated { expires_at, .. } => expires_at,
        other => panic!("expected Activated, got {other:?}"),
    };

    let user = store.users.get_by_id(&frank.id).unwrap().unwrap();
    assert!(user.has_boost);
    assert!(user.boost_expiry.is_some());

    // Sweep before expiry: perk stays.
    let cleared = store
        .subscriptions
        .clear_expired_perks(chrono::Utc::now())
        .await
        .unwrap();
    assert_eq!(cleared, 0);

    // Sweep after expiry: perk cleared, and the sweep stays idempotent.
    let later = expires_at + chrono::Duration::days(1);
    assert_eq!(store.subscriptions.clear_expired_perks(later).await.unwrap(), 1);
    assert_eq!(store.subscriptions.clear_expired_perks(later).await.unwrap(), 0);

    let user = store.users.get_by_id(&frank.id).unwrap().unwrap();
    assert!(!user.has_boost);
}

#[tokio::test]
async fn webhook_activates_subscription_idempotently() {
    let store = setup().await;
    let grace = seed_user(&store, "sub_grace").await;

    store
        .subscriptions
        .create_initiated(NewSubscriptionPurchase {
            user_id: grace.id.clone(),
            plan: PlanCode::AdFree,
            amount_etb: dec!(99.00),
            duration_days: 30,
            tx_ref: "sub-adfree-grace-1".to_string(),
        })
        .await
        .unwrap();

    let first = store
        .subscriptions
        .activate_by_tx_ref("sub-adfree-grace-1")
        .await
        .unwrap();
    assert!(matches!(first, ActivationOutcome::Activated { .. }));

    let replay = store
        .subscriptions
        .activate_by_tx_ref("sub-adfree-grace-1")
        .await
        .unwrap();
    assert!(matches!(replay, ActivationOutcome::AlreadyCompleted { .. }));

    let user = store.users.get_by_id(&grace.id).unwrap().unwrap();
    assert!(user.ad_free);
}

//! `#[reflect]` generated entries driving real handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use callback_handler::prelude::*;

struct Account {
    balance: AtomicI64,
}

#[reflect(rename_all = "camelCase")]
impl Account {
    fn current_balance(&self, _args: Args) -> CallResult {
        Ok(json!(self.balance.load(Ordering::SeqCst)))
    }

    fn deposit(&self, args: Args) -> CallResult {
        let amount = args
            .first()
            .and_then(Value::as_i64)
            .ok_or("deposit needs an integer amount")?;
        Ok(json!(self.balance.fetch_add(amount, Ordering::SeqCst) + amount))
    }

    fn open_fee(_args: Args) -> CallResult {
        Ok(json!(5))
    }

    #[reflect(skip)]
    fn open(balance: i64) -> Arc<Self> {
        Arc::new(Self {
            balance: AtomicI64::new(balance),
        })
    }
}

struct AuditLog;

#[reflect(name = "Audit")]
impl AuditLog {
    fn record(args: Args) -> CallResult {
        Ok(json!({ "recorded": args.len() }))
    }
}

fn registry() -> Arc<TypeRegistry> {
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<Account>();
    registry.register::<AuditLog>();
    registry
}

#[test]
fn test_generated_type_info() {
    let info = Account::type_info();
    assert_eq!(info.name(), "Account");

    let mut names: Vec<_> = info.method_names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["currentBalance", "deposit", "openFee"]);
    assert!(info.method("openFee").is_some_and(|m| m.is_static()));
    assert!(info.method("deposit").is_some_and(|m| !m.is_static()));
    assert!(!info.has_method("open"));

    assert_eq!(AuditLog::type_info().name(), "Audit");
}

#[test]
fn test_bound_method_through_derive() -> anyhow::Result<()> {
    let account = Account::open(100);
    let handler = CallbackHandler::with_reflection(
        Callback::bound(&account, "deposit"),
        Metadata::new().with_priority(Priority::HIGH),
        registry(),
    )?;

    assert_eq!(handler.invoke(vec![json!(10)])?, json!(110));
    assert_eq!(account.balance.load(Ordering::SeqCst), 110);
    assert_eq!(handler.priority(), Priority::HIGH);

    drop(account);
    assert!(matches!(
        handler.invoke(vec![json!(10)]),
        Err(CallbackError::TargetExpired)
    ));
    Ok(())
}

#[test]
fn test_target_error_from_derived_method() -> anyhow::Result<()> {
    let account = Account::open(0);
    let handler = CallbackHandler::with_reflection(
        Callback::bound(&account, "deposit"),
        Metadata::new(),
        registry(),
    )?;

    let err = handler.invoke(vec![]).expect_err("missing amount");
    assert!(err.is_target_error());
    assert_eq!(err.to_string(), "deposit needs an integer amount");
    Ok(())
}

#[test]
fn test_static_references_through_derive() -> anyhow::Result<()> {
    let registry = registry();

    let fee = CallbackHandler::with_reflection(
        Callback::static_method("Account", "openFee"),
        Metadata::new(),
        Arc::<TypeRegistry>::clone(&registry),
    )?;
    assert_eq!(fee.invoke(vec![])?, json!(5));

    let audit = CallbackHandler::with_reflection(
        Callback::reference("Audit::record"),
        Metadata::new(),
        Arc::<TypeRegistry>::clone(&registry),
    )?;
    assert_eq!(
        audit.invoke(vec![json!(1), json!(2), json!(3), json!(4)])?,
        json!({ "recorded": 4 })
    );

    let deposit = CallbackHandler::with_reflection(
        Callback::reference("Account::deposit"),
        Metadata::new(),
        Arc::<TypeRegistry>::clone(&registry),
    )?;
    assert!(matches!(
        deposit.invoke(vec![json!(1)]),
        Err(CallbackError::InvalidStaticReference(
            StaticReferenceError::NotStatic { .. }
        ))
    ));

    let skipped = CallbackHandler::with_reflection(
        Callback::reference("Account::open"),
        Metadata::new(),
        registry,
    );
    assert!(matches!(
        skipped,
        Err(CallbackError::InvalidCallback { .. })
    ));
    Ok(())
}

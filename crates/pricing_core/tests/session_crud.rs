use pricing_core::repo::Column;
use pricing_core::{
    Chain, CurrentPrice, Entity, Fields, Item, Query, RepoError, SessionConfig,
    SessionController, Store, StoreProduct, StoreType, Unit,
};
use rusqlite::types::Value;
use rust_decimal::Decimal;

fn session() -> SessionController {
    SessionController::connect(SessionConfig::in_memory().with_echo(true)).unwrap()
}

fn acme_fields() -> Fields<Chain> {
    Fields::new()
        .set(Chain::FULL_ID, 100)
        .set(Chain::SUBCHAIN_ID, 0)
        .set(Chain::NAME, "Acme")
}

fn listing(internal_id: Option<i64>) -> StoreProduct {
    StoreProduct {
        id: None,
        item_id: None,
        store_id: None,
        internal_id,
        name: None,
        quantity: None,
        unit_quantity: None,
    }
}

#[test]
fn get_or_create_is_idempotent() {
    let mut session = session();

    let first = session.get_or_create(acme_fields()).unwrap();
    let second = session.get_or_create(acme_fields()).unwrap();

    assert!(first.id.is_some());
    assert_eq!(first.id, second.id);
    assert_eq!(Query::<Chain>::new().count(&session).unwrap(), 1);
    assert!(!session.is_dirty());
}

#[test]
fn get_returns_none_when_absent() {
    let session = session();
    let found = session.get(&acme_fields()).unwrap();
    assert!(found.is_none());
}

#[test]
fn get_rejects_columns_of_other_tables() {
    let session = session();
    let fields = Fields::<Chain>::new().set(Column::new("city"), "Haifa");

    match session.get(&fields).unwrap_err() {
        RepoError::UnknownColumn { table, column } => {
            assert_eq!(table, "chains");
            assert_eq!(column, "city");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn get_or_create_uses_column_defaults_for_omitted_fields() {
    let mut session = session();
    let chain = session
        .get_or_create(Fields::new().set(Chain::FULL_ID, 7))
        .unwrap();
    assert_eq!(chain.subchain_id, 0);
    assert_eq!(chain.name, None);
}

#[test]
fn get_or_create_reports_failed_commit() {
    let mut session = session();
    let fields = Fields::<Item>::new()
        .set(Item::CODE, "SKU1")
        .set(Item::UNIT, "furlong");

    match session.get_or_create(fields).unwrap_err() {
        RepoError::CommitFailed { table } => assert_eq!(table, "items"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!session.is_dirty());
    assert_eq!(Query::<Item>::new().count(&session).unwrap(), 0);
}

#[test]
fn duplicate_composite_key_fails_commit_and_session_recovers() {
    let mut session = session();
    session.add(&Chain::new(100, 0, "Acme"));
    assert!(session.commit());

    session.add(&Chain::new(100, 0, "Acme again"));
    assert_eq!(session.pending_writes(), 1);
    assert!(!session.commit());
    assert!(!session.is_dirty());

    let chains = Query::<Chain>::new().all(&session).unwrap();
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].name.as_deref(), Some("Acme"));

    session.add(&Chain::new(100, 1, "Acme North"));
    assert!(session.commit());
    assert_eq!(Query::<Chain>::new().count(&session).unwrap(), 2);
}

#[test]
fn failed_commit_discards_the_whole_batch() {
    let mut session = session();
    session.add(&Chain::new(1, 0, "First"));
    session.add(&Chain::new(2, 0, "Second"));
    session.add(&Chain::new(1, 0, "Clash"));

    assert!(!session.commit());
    assert_eq!(Query::<Chain>::new().count(&session).unwrap(), 0);
}

#[test]
fn staged_writes_are_invisible_until_commit() {
    let mut session = session();
    session.add(&Chain::new(100, 0, "Acme"));

    assert!(session.is_dirty());
    assert!(!session.exists(Chain::FULL_ID, 100).unwrap());

    assert!(session.commit());
    assert!(session.exists(Chain::FULL_ID, 100).unwrap());
}

#[test]
fn rollback_discards_staged_writes() {
    let mut session = session();
    session.bulk_insert(&[Chain::new(1, 0, "A"), Chain::new(2, 0, "B")]);

    assert_eq!(session.rollback(), 2);
    assert!(!session.is_dirty());
    assert!(session.commit());
    assert_eq!(Query::<Chain>::new().count(&session).unwrap(), 0);
}

#[test]
fn commit_without_staged_writes_succeeds() {
    let mut session = session();
    assert!(session.commit());
}

#[test]
fn exists_agrees_with_a_full_scan() {
    let mut session = session();
    let chain = session.get_or_create(acme_fields()).unwrap();
    let chain_id = chain.id.unwrap();

    let mut stores = Vec::new();
    for (store_id, city) in [(1, Some("Haifa")), (2, Some("Eilat")), (3, None)] {
        let mut store = Store::new(store_id, chain_id, format!("Store {store_id}"), StoreType::Physical);
        store.city = city.map(str::to_string);
        stores.push(store);
    }
    session.bulk_insert(&stores);
    assert!(session.commit());

    let all = Query::<Store>::new().all(&session).unwrap();
    for city in ["Haifa", "Eilat", "Tel Aviv"] {
        let scanned = all.iter().any(|store| store.city.as_deref() == Some(city));
        assert_eq!(session.exists(Store::CITY, city).unwrap(), scanned, "{city}");
    }
    assert!(session.exists(Store::CITY, None::<String>).unwrap());
}

#[test]
fn exists_where_list_requires_all_pairs_on_one_row() {
    let mut session = session();
    session.bulk_insert(&[Chain::new(100, 0, "Acme"), Chain::new(200, 1, "Bolt")]);
    assert!(session.commit());

    let columns = [Chain::FULL_ID, Chain::SUBCHAIN_ID];
    assert!(session
        .exists_where_list(&columns, vec![Value::Integer(100), Value::Integer(0)])
        .unwrap());
    assert!(!session
        .exists_where_list(&columns, vec![Value::Integer(100), Value::Integer(1)])
        .unwrap());

    match session
        .exists_where_list(&columns, vec![Value::Integer(100)])
        .unwrap_err()
    {
        RepoError::ArgumentMismatch { columns, values } => {
            assert_eq!((columns, values), (2, 1));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn key_reports_declared_primary_key() {
    let session = session();
    assert_eq!(session.key::<Chain>(), ["id"]);
    assert_eq!(session.key::<CurrentPrice>(), ["price"]);
    assert_eq!(
        session.key::<pricing_core::PromotionItem>(),
        ["promotion_id", "item_id"]
    );

    let price = CurrentPrice::new(3, Decimal::new(1250, 2));
    assert_eq!(
        session.instance_key(&price),
        vec![Value::Text("12.5".to_string())]
    );
}

#[test]
fn exists_in_db_matches_on_key_values() {
    let mut session = session();
    session.add(&CurrentPrice {
        store_product_id: None,
        price: Decimal::new(1250, 2),
    });
    assert!(session.commit());

    let same_amount = CurrentPrice {
        store_product_id: None,
        price: Decimal::new(125, 1),
    };
    assert_eq!(session.exists_in_db(&same_amount).unwrap().len(), 1);

    let other_amount = CurrentPrice {
        store_product_id: None,
        price: Decimal::new(13, 0),
    };
    assert!(session.exists_in_db(&other_amount).unwrap().is_empty());

    let unsaved = Chain::new(1, 0, "Unsaved");
    assert!(session.exists_in_db(&unsaved).unwrap().is_empty());
}

#[test]
fn bulk_update_applies_keyed_partial_updates() {
    let mut session = session();
    session.bulk_insert(&[
        Item::new("A", Decimal::ONE, Unit::Kg),
        Item::new("B", Decimal::ONE, Unit::Gr),
    ]);
    assert!(session.commit());

    let items = Query::<Item>::new().all(&session).unwrap();
    let updates = items
        .iter()
        .map(|item| {
            Fields::new()
                .set(Item::ID, item.id)
                .set(Item::CODE, format!("{}-renamed", item.code.as_deref().unwrap()))
        })
        .collect::<Vec<_>>();
    session.bulk_update(&updates).unwrap();
    assert!(session.commit());

    let renamed = Query::<Item>::new().all(&session).unwrap();
    let codes = renamed
        .iter()
        .map(|item| item.code.clone().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(codes, ["A-renamed", "B-renamed"]);
    assert_eq!(renamed[0].unit, Unit::Kg);
    assert_eq!(renamed[1].unit, Unit::Gr);
}

#[test]
fn bulk_update_without_key_stages_nothing() {
    let mut session = session();
    let updates = vec![
        Fields::<Item>::new().set(Item::ID, 1).set(Item::CODE, "X"),
        Fields::<Item>::new().set(Item::CODE, "Y"),
    ];

    match session.bulk_update(&updates).unwrap_err() {
        RepoError::MissingKey { table, column } => {
            assert_eq!(table, "items");
            assert_eq!(column, "id");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.pending_writes(), 0);
}

#[test]
fn update_evaluates_expressions_per_row() {
    let mut session = session();
    session.bulk_insert(&[listing(Some(1)), listing(Some(5)), listing(None)]);
    assert!(session.commit());

    let query = Query::<StoreProduct>::new().filter(!StoreProduct::INTERNAL_ID.is_null());
    session
        .update(
            &query,
            &[StoreProduct::INTERNAL_ID.set_expr(StoreProduct::INTERNAL_ID.plus(1))],
        )
        .unwrap();
    assert!(session.commit());

    let internal_ids = Query::<StoreProduct>::new()
        .all(&session)
        .unwrap()
        .into_iter()
        .map(|product| product.internal_id)
        .collect::<Vec<_>>();
    assert_eq!(internal_ids, [Some(2), Some(6), None]);
}

#[test]
fn update_rejects_foreign_columns() {
    let mut session = session();
    let err = session
        .update(
            &Query::<Chain>::new(),
            &[Column::<Chain>::new("price").set(1)],
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::UnknownColumn { .. }));
    assert!(!session.is_dirty());
}

#[test]
fn drop_table_removes_the_table_until_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:///{}", dir.path().join("shopping.db").display());

    let mut session = SessionController::connect(SessionConfig::new(url.clone())).unwrap();
    session.add(&Chain::new(100, 0, "Acme"));
    assert!(session.commit());

    session.drop_table::<Chain>().unwrap();
    assert!(Query::<Chain>::new().all(&session).is_err());
    drop(session);

    let session = SessionController::connect(SessionConfig::new(url)).unwrap();
    assert_eq!(Query::<Chain>::new().count(&session).unwrap(), 0);
}

#[test]
fn connect_rejects_unsupported_backends() {
    let config = SessionConfig::new("mysql://localhost/shopping");
    assert!(SessionController::connect(config).is_err());
}

#[test]
fn values_round_trip_through_storage() {
    let mut session = session();
    let item = session
        .get_or_create(
            Fields::new()
                .set(Item::CODE, "7290000000001")
                .set(Item::QUANTITY, Decimal::new(1500, 3))
                .set(Item::UNIT, Unit::Meter),
        )
        .unwrap();

    let loaded = Query::<Item>::new()
        .filter(Item::ID.eq(item.id))
        .first(&session)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.quantity, Some(Decimal::new(15, 1)));
    assert_eq!(loaded.unit, Unit::Meter);
    assert_eq!(loaded.values()[3], Value::Text("m".to_string()));
}

//! Demo entry point for `pricing_core`.
//!
//! Usage: `pricing [DATABASE_URL] [--echo]`
//!
//! Opens a session, records one chain, store, item, listing and price, and
//! prints what was stored. Re-running against the same file reuses the
//! existing rows.

use chrono::Local;
use pricing_core::repo::IntoValue;
use pricing_core::{
    default_log_level, init_logging, Chain, CurrentPrice, Fields, Item, PriceHistory, Query,
    SessionConfig, SessionController, Store, StoreProduct, StoreType, Unit,
};
use rust_decimal::Decimal;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut config = SessionConfig::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--echo" => config.echo = true,
            url => config.database_url = url.to_string(),
        }
    }

    if let Err(err) = init_logging(default_log_level(), None) {
        eprintln!("logging disabled: {err}");
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=demo module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: SessionConfig) -> Result<(), Box<dyn Error>> {
    let mut session = SessionController::connect(config)?;

    let chain = session.get_or_create(
        Fields::new()
            .set(Chain::FULL_ID, 100)
            .set(Chain::SUBCHAIN_ID, 0)
            .set(Chain::NAME, "Acme"),
    )?;
    let chain_id = chain.id.ok_or("chain was stored without an id")?;

    let store = session.get_or_create(
        Fields::new()
            .set(Store::STORE_ID, 1)
            .set(Store::CHAIN_ID, chain_id)
            .set(Store::NAME, "Acme Downtown")
            .set(Store::TYPE, StoreType::Physical),
    )?;
    let store_id = store.id.ok_or("store was stored without an id")?;

    let item = session.get_or_create(
        Fields::new()
            .set(Item::CODE, "SKU1")
            .set(Item::QUANTITY, Decimal::ONE)
            .set(Item::UNIT, Unit::to_unit(Some("קג"))),
    )?;
    let item_id = item.id.ok_or("item was stored without an id")?;

    let product = session.get_or_create(
        Fields::new()
            .set(StoreProduct::ITEM_ID, item_id)
            .set(StoreProduct::STORE_ID, store_id),
    )?;
    let product_id = product.id.ok_or("listing was stored without an id")?;

    let today = Local::now().date_naive();
    let price = Decimal::new(1290, 2);
    if !session.exists_where_list(
        &[PriceHistory::STORE_PRODUCT_ID, PriceHistory::START_DATE],
        vec![product_id.into_value(), today.into_value()],
    )? {
        session.add(&PriceHistory::new(product_id, today, today));
    }
    if !session.exists(CurrentPrice::PRICE, price)? {
        session.add(&CurrentPrice::new(product_id, price));
    }
    println!("commit={}", session.commit());

    let again = session.get_or_create(
        Fields::new()
            .set(Store::STORE_ID, 1)
            .set(Store::CHAIN_ID, chain_id),
    )?;
    println!("store={} reused={}", again.describe(&chain), again == store);

    println!("item={item} unit={}", item.unit.as_str());
    for stored in session.related(&Chain::STORES, &chain)? {
        println!("chain_store id={:?} name={:?}", stored.id, stored.name);
    }
    for loaded in session.load(&Query::new().filter(Item::ID.eq(item_id)), &Item::STORE_PRODUCTS)? {
        let listings = loaded.children.unwrap_or_default();
        println!("item={} listings={}", loaded.parent, listings.len());
    }
    for history in session.related(&StoreProduct::PRICE_HISTORY, &product)? {
        println!(
            "price_history start={} end={} covers_today={}",
            history.start_date,
            history.end_date,
            history.covers(today)
        );
    }
    for current in session.related(&StoreProduct::CURRENT_PRICES, &product)? {
        println!("current_price={}", current.price);
    }

    Ok(())
}

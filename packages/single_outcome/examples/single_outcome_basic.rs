//! Chains a few asynchronous lookups and shows that failures keep their type along the way.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use single_outcome::{Single, SingleHooks, Subscription};

#[derive(Clone, Debug, thiserror::Error)]
enum CatalogError {
    #[error("no product named {0:?}")]
    UnknownProduct(String),

    #[error("product {0} is out of stock")]
    OutOfStock(u32),
}

fn find_product_id(name: &'static str) -> Single<u32, CatalogError> {
    Single::create(move |deliver| {
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));

            match name {
                "crab plushie" => deliver.succeed(7),
                "gear" => deliver.succeed(8),
                other => deliver.fail(CatalogError::UnknownProduct(other.to_string())),
            }
        });

        Subscription::new()
    })
}

fn stock_level(product_id: u32) -> Single<u32, CatalogError> {
    Single::create(move |deliver| {
        if product_id == 8 {
            deliver.fail(CatalogError::OutOfStock(product_id));
        } else {
            deliver.succeed(product_id * 3);
        }

        Subscription::new()
    })
}

fn main() {
    for name in ["crab plushie", "gear", "teapot"] {
        let (tx, rx) = mpsc::channel();
        let failure_tx = tx.clone();

        find_product_id(name)
            .bind(stock_level)
            .tap(SingleHooks::new().after_error(move |error| {
                println!("[audit] lookup of {name:?} failed: {error}");
            }))
            .subscribe_with(
                move |stock| drop(tx.send(format!("{name}: {stock} in stock"))),
                move |error| drop(failure_tx.send(format!("{name}: {error}"))),
            );

        match rx.recv() {
            Ok(line) => println!("{line}"),
            Err(_) => println!("{name}: no outcome"),
        }
    }
}

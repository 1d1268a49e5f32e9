//! # Resource Model Demo
//!
//! Declares a `Car` model type backed by the in-memory store actor, then walks through the
//! instance lifecycle:
//! 1.  Saving an invalid instance (rejected before any store call).
//! 2.  Fixing it and saving (create), then editing and saving again (update).
//! 3.  Loading by id, loading everything, and filtering.

use resource_model::memory::StoreActor;
use resource_model::tracing::setup_tracing;
use resource_model::{model_type, Attribute, ModelClass, ModelError, ValidationOutcome, Value};
use std::time::Duration;
use tracing::{info, warn, Instrument};

model_type! {
    struct Car { id, name, color }
}

fn car_class(store: resource_model::memory::StoreClient) -> ModelClass {
    let schema = Car::schema()
        .attribute(Attribute::new("name").with_validator(|name: &Value| {
            match name.as_str().map(str::trim) {
                Some(name) if !name.is_empty() => ValidationOutcome::Valid,
                _ => ValidationOutcome::invalid("Name is required"),
            }
        }))
        .attribute(Attribute::new("color").with_async_validator(|color: Value| async move {
            // Stands in for a remote lookup.
            tokio::time::sleep(Duration::from_millis(20)).await;
            match color.as_str() {
                None | Some("red" | "blue" | "black") => Ok(()),
                Some(other) => Err(format!("Unknown color: {other}")),
            }
        }))
        .base_url("/cars")
        .build();
    ModelClass::extend(schema, store)
}

#[tokio::main]
async fn main() -> Result<(), ModelError> {
    setup_tracing();

    let (actor, store) = StoreActor::new(32, "id");
    let store_task = tokio::spawn(actor.run());
    let cars = car_class(store);

    info!("Starting demo");

    let mut car = Car::from(cars.new_instance(Default::default()));
    car.set_color("green");

    match car.save().instrument(tracing::info_span!("invalid_save")).await {
        Err(e) => warn!(error = %e, errors = ?e.errors(), "Save rejected"),
        Ok(_) => info!("Unexpectedly saved"),
    }

    car.set_name("Super Car!");
    car.set_color("red");
    car.save().await?;
    info!(id = %car.get_id(), url = %car.url(), "Car created");

    car.set_color("black");
    car.save().await?;
    info!(changed = car.changed().len(), "Car updated");

    let mut other = Car::from(cars.new_instance(Default::default()));
    other.set_name("Roadster");
    other.set_color("red");
    other.save().await?;

    let found = cars.find(1).await?;
    info!(name = %found.get("name"), color = %found.get("color"), "Found car");

    let all = cars.all().await?;
    info!(count = all.len(), "All cars");

    let mut criteria = resource_model::Values::new();
    criteria.insert("color".into(), "red".into());
    let red = cars.filter(criteria).await?;
    info!(count = red.len(), "Red cars");

    found.destroy().await?;
    info!(count = cars.all().await?.len(), "Cars after delete");

    drop(cars);
    drop(car);
    drop(other);
    drop(found);
    drop(all);
    drop(red);
    let _ = store_task.await;

    info!("Demo completed");
    Ok(())
}

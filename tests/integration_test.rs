use resource_model::memory::StoreActor;
use resource_model::{
    model_type, Attribute, ModelClass, ModelError, ModelSchema, RemoteStore, TransportError,
    ValidationOutcome, Value, Values,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

model_type! {
    pub struct User { id, email, name }
}

fn users(store: resource_model::memory::StoreClient) -> ModelClass {
    let schema = User::schema()
        .attribute(Attribute::new("email").with_async_validator(|email: Value| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            match email.as_str() {
                Some(email) if email.contains('@') => ValidationOutcome::Valid,
                _ => ValidationOutcome::invalid("Invalid email"),
            }
        }))
        .attribute(Attribute::new("name").with_setter(|value, super_set| match value {
            Value::String(name) => super_set(json!(name.trim())),
            other => super_set(other),
        }))
        .base_url("/users")
        .build();
    ModelClass::extend(schema, store)
}

/// Full end-to-end flow against the in-memory store actor.
#[tokio::test]
async fn test_full_model_lifecycle() {
    let (actor, store) = StoreActor::new(16, "id");
    tokio::spawn(actor.run());
    let users = users(store);

    // Invalid instances never reach the store.
    let mut alice = User::from(users.new_instance(Values::new()));
    alice.set_name("  Alice ");
    alice.set_email("alice");
    let err = alice.save().await.unwrap_err();
    assert_eq!(
        err.errors().and_then(|errors| errors.get("email")),
        Some(&json!("Invalid email"))
    );
    assert!(users.all().await.unwrap().is_empty());

    // Create.
    alice.set_email("alice@example.com");
    alice.save().await.expect("Failed to create user");
    assert_eq!(alice.id(), Some(&json!(1)));
    assert_eq!(alice.get_id(), json!(1));
    assert_eq!(alice.get_name(), json!("Alice"));
    assert!(alice.is_pristine());
    assert_eq!(alice.url(), "/users/1");

    // Update.
    alice.set_name("Alice Liddell");
    alice.save().await.expect("Failed to update user");

    let mut bob = User::from(users.new_instance(Values::new()));
    bob.set_name("Bob");
    bob.set_email("bob@example.com");
    bob.save().await.expect("Failed to create user");
    assert_eq!(bob.id(), Some(&json!(2)));

    // Read back.
    let found = users.find(1).await.expect("Failed to find user");
    assert_eq!(found.get("name"), json!("Alice Liddell"));
    assert!(found.is_pristine());

    let all = users.all().await.unwrap();
    let names: Vec<Value> = all.iter().map(|user| user.get("name")).collect();
    assert_eq!(names, [json!("Alice Liddell"), json!("Bob")]);

    let mut criteria = Values::new();
    criteria.insert("email".into(), json!("bob@example.com"));
    let matching = users.filter(criteria).await.unwrap();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].get("name"), json!("Bob"));

    // Delete.
    found.destroy().await.expect("Failed to delete user");
    let err = users.find(1).await.unwrap_err();
    assert!(matches!(
        err,
        ModelError::Transport(TransportError::NotFound(_))
    ));
    assert_eq!(users.all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fetch_refreshes_local_edits() {
    let (actor, store) = StoreActor::new(16, "id");
    tokio::spawn(actor.run());
    store
        .insert(json!({"id": 5, "email": "eve@example.com", "name": "Eve"}).as_object().cloned().unwrap())
        .await
        .unwrap();
    let users = users(store);

    let mut eve = users.new_instance(json!({"id": 5}).as_object().cloned().unwrap());
    eve.set_attribute("name", "Mallory");
    eve.fetch().await.unwrap();

    assert_eq!(eve.get("name"), json!("Eve"));
    assert!(eve.is_pristine());
    assert_eq!(eve.previous_values(), eve.values());
}

#[tokio::test]
async fn test_clearing_a_field_reaches_the_store() {
    let (actor, store) = StoreActor::new(16, "id");
    tokio::spawn(actor.run());
    let users = users(store.clone());

    let mut carol = User::from(users.new_instance(Values::new()));
    carol.set_name("Carol");
    carol.set_email("carol@example.com");
    carol.save().await.unwrap();

    carol.set_name(Value::Null);
    carol.save().await.unwrap();
    assert_eq!(carol.get("name"), Value::Null);
    assert!(carol.is_set("name"));

    let stored = store.list(&Values::new()).await.unwrap();
    assert_eq!(
        stored,
        json!([{"id": 1, "email": "carol@example.com", "name": null}])
    );

    let reloaded = users.find(1).await.unwrap();
    assert_eq!(
        Value::Object(reloaded.to_transfer_object()),
        json!({"id": 1, "email": "carol@example.com", "name": null})
    );
}

#[tokio::test]
async fn test_seeded_ids_are_not_reused() {
    let (actor, store) = StoreActor::new(16, "id");
    tokio::spawn(actor.run());
    store
        .insert(json!({"id": 2, "email": "seed@example.com", "name": "Seeded"}).as_object().cloned().unwrap())
        .await
        .unwrap();
    let users = users(store);

    for name in ["A", "B"] {
        let mut user = User::from(users.new_instance(Values::new()));
        user.set_name(name);
        user.set_email(format!("{name}@example.com"));
        user.save().await.unwrap();
    }

    let all = users.all().await.unwrap();
    let ids: Vec<Value> = all.iter().map(|user| user.get("id")).collect();
    assert_eq!(ids, [json!(2), json!(1), json!(3)]);
    assert_eq!(users.find(2).await.unwrap().get("name"), json!("Seeded"));
}

/// Several model types can share one store client.
#[tokio::test]
async fn test_shared_store_across_types() {
    let (actor, store) = StoreActor::new(16, "id");
    tokio::spawn(actor.run());
    let shared: Arc<dyn resource_model::RemoteStore> = Arc::new(store);

    let notes = ModelClass::extend_shared(
        ModelSchema::builder().attributes(["id", "text"]).build(),
        Arc::clone(&shared),
    );
    let tags = ModelClass::extend_shared(
        ModelSchema::builder().attributes(["id", "label"]).build(),
        shared,
    );

    let mut note = notes.new_instance(Values::new());
    note.set("text", "hello");
    note.save().await.unwrap();
    let mut tag = tags.new_instance(Values::new());
    tag.set("label", "greeting");
    tag.save().await.unwrap();

    assert_eq!(note.id(), Some(&json!(1)));
    assert_eq!(tag.id(), Some(&json!(2)));
}

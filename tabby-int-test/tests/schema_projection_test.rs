use tabby::common::Value;
use tabby::doc;
use tabby::errors::ErrorKind;
use tabby_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn values_are_cast_to_declared_types() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<tabby_int_test::test_util::Cat>()?;
            let kitty = cats.new_record(doc! {
                "name": 42,
                "age": "8",
                "favoriteFoods": "treats",
            })?;

            let cat = kitty.entity();
            assert_eq!(cat.name.as_deref(), Some("42"));
            assert_eq!(cat.age, Some(8.0));
            assert_eq!(cat.favorite_foods, vec!["treats".to_string()]);
            assert_eq!(cat.owner, None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn uncastable_value_names_the_field() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<tabby_int_test::test_util::Cat>()?;
            let err = cats
                .new_record(doc! { "name": "Dooby", "age": "very old" })
                .err()
                .unwrap();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            assert!(err.message().contains("age"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn set_fields_uses_the_same_allow_list() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<tabby_int_test::test_util::Cat>()?;
            let mut kitty = cats.new_record(doc! { "name": "Dooby", "age": 8 })?;
            kitty.set_fields(doc! { "age": "9", "breed": "tabby", "_id": 5 })?;

            assert_eq!(kitty.entity().age, Some(9.0));
            assert_eq!(kitty.get("breed")?, Value::Null);
            assert!(kitty.id().is_none());

            let err = kitty.set("age", "nine").err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::ValidationError);
            assert_eq!(kitty.entity().age, Some(9.0));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn dynamic_model_keeps_documents() {
    run_test(
        create_test_context,
        |ctx| {
            use tabby::schema::{FieldType, Schema};

            let schema = Schema::builder()
                .field("name", FieldType::String)
                .field("vaccinated", FieldType::Boolean)
                .field("home", FieldType::Document)
                .build()?;
            let shelters = ctx.connection().model_with_schema("Shelter", schema)?;
            assert_eq!(shelters.collection_name(), "shelters");

            let mut record = shelters.new_record(doc! {
                "name": "Paws",
                "vaccinated": "yes",
                "home": { "city": "Springfield" },
                "capacity": 20,
            })?;
            let id = record.persist()?;

            let stored = shelters.find_by_id(&id)?.unwrap();
            let document = stored.entity();
            assert_eq!(document.get("vaccinated")?, Value::Bool(true));
            assert_eq!(document.get("home.city")?, Value::from("Springfield"));
            assert!(!document.contains_key("capacity"));
            Ok(())
        },
        cleanup,
    )
}

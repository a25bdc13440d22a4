use tabby::common::Value;
use tabby::doc;
use tabby::errors::{ErrorKind, TabbyResult};
use tabby::filter::Projection;
use tabby::model::Model;
use tabby_int_test::test_util::{cleanup, create_test_context, dooby, momo, run_test, Cat};

fn adopt_both(cats: &Model<Cat>) -> TabbyResult<()> {
    cats.create(dooby())?;
    cats.create(momo())?;
    Ok(())
}

#[test]
fn find_with_empty_criteria_returns_all_in_insertion_order() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            adopt_both(&cats)?;

            let all = cats.find(doc! {}).exec()?;
            let names: Vec<_> = all
                .iter()
                .map(|r| r.entity().name.clone().unwrap_or_default())
                .collect();
            assert_eq!(names, vec!["Dooby", "Momo"]);
            assert!(all.iter().all(|r| r.id().is_some() && !r.is_partial()));
            assert_eq!(cats.count(doc! {})?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn unmatched_criteria_is_empty_not_an_error() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            adopt_both(&cats)?;

            assert!(cats.find(doc! { "name": "Garfield" }).exec()?.is_empty());
            assert!(cats.find_one(doc! { "name": "Garfield" }).exec()?.is_none());
            assert!(cats.find_one(doc! { "name": "Garfield" }).exec_lean()?.is_none());
            assert_eq!(cats.count(doc! { "name": "Garfield" })?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn persisted_cat_is_found_by_unique_field() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            let mut ariels_kitty = cats.new_record(dooby())?;
            ariels_kitty.persist()?;

            let found = cats.find_one(doc! { "name": "Dooby" }).exec()?.unwrap();
            assert_eq!(found.id(), ariels_kitty.id());
            assert_eq!(found.entity(), ariels_kitty.entity());
            assert_eq!(found.entity().age, Some(8.0));
            assert_eq!(
                found.entity().favorite_foods,
                vec!["treats".to_string(), "catnip".to_string()]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn criteria_are_cast_and_match_array_elements() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            adopt_both(&cats)?;

            let by_age = cats.find(doc! { "age": "8" }).exec()?;
            assert_eq!(by_age.len(), 1);
            assert_eq!(by_age[0].entity().name.as_deref(), Some("Dooby"));

            let catnip_lovers = cats.find(doc! { "favoriteFoods": "catnip" }).exec()?;
            assert_eq!(catnip_lovers.len(), 1);

            let by_owner_and_age = cats
                .find(doc! { "owner": "Jessica", "age": 7 })
                .exec()?;
            assert_eq!(by_owner_and_age.len(), 1);
            assert_eq!(by_owner_and_age[0].entity().name.as_deref(), Some("Momo"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn find_by_id_reads_one_record() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            let momo = cats.create(momo())?;
            let id = momo.id().unwrap();

            let found = cats.find_by_id(&id)?.unwrap();
            assert_eq!(found.entity().owner.as_deref(), Some("Jessica"));

            let by_id_criteria = cats.find_one(id).exec()?.unwrap();
            assert_eq!(by_id_criteria.id(), Some(id));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn projection_returns_partial_records() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            adopt_both(&cats)?;

            let mut names_only = cats
                .find(doc! { "name": "Dooby" })
                .project(doc! { "name": 1, "_id": 0 })
                .exec()?;
            assert_eq!(names_only.len(), 1);
            let dooby = &mut names_only[0];
            assert!(dooby.is_partial());
            assert!(dooby.id().is_none());
            assert_eq!(dooby.entity().name.as_deref(), Some("Dooby"));
            assert_eq!(dooby.entity().owner, None);

            let err = dooby.persist().err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

            let shown = dooby.to_document()?;
            assert_eq!(shown.fields(), vec!["name"]);
            assert!(!shown.contains_key("owner"));
            assert!(!shown.contains_key("favoriteFoods"));
            assert_eq!(dooby.to_string(), "{\n  \"name\": \"Dooby\"\n}");

            let lean = cats
                .find(doc! {})
                .project(Projection::exclude(&["favoriteFoods"]))
                .exec_lean()?;
            assert_eq!(lean.len(), 2);
            assert!(lean.iter().all(|d| d.id().is_some()));
            assert!(lean.iter().all(|d| !d.contains_key("favoriteFoods")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn records_print_fields_in_schema_order() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            let momo = cats.create(momo())?;
            let shown = momo.to_string();

            let position = |key: &str| shown.find(&format!("\"{}\"", key));
            let order: Vec<_> = ["_id", "name", "owner", "age", "favoriteFoods"]
                .iter()
                .map(|key| position(key))
                .collect();
            assert!(order.iter().all(|p| p.is_some()));
            assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(position("breed").is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn skip_and_limit_page_results() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            for i in 0..5 {
                cats.create(doc! { "name": (format!("kitten-{}", i)), "age": i })?;
            }

            let page = cats.find(doc! {}).skip(1).limit(2).exec()?;
            let names: Vec<_> = page
                .iter()
                .map(|r| r.get("name"))
                .collect::<TabbyResult<Vec<_>>>()?;
            assert_eq!(names, vec![Value::from("kitten-1"), Value::from("kitten-2")]);

            assert!(cats.find(doc! {}).skip(10).exec()?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn invalid_queries_fail_when_executed() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            adopt_both(&cats)?;

            let operator = cats.find(doc! { "age": { "$gt": 3 } }).exec().err().unwrap();
            assert_eq!(operator.kind(), &ErrorKind::FilterError);

            let mixed = cats
                .find(doc! {})
                .project(doc! { "name": 1, "owner": 0 })
                .exec()
                .err()
                .unwrap();
            assert_eq!(mixed.kind(), &ErrorKind::FilterError);

            let bad_cast = cats.find_one(doc! { "age": "old" }).exec().err().unwrap();
            assert_eq!(bad_cast.kind(), &ErrorKind::ValidationError);
            Ok(())
        },
        cleanup,
    )
}

use fake::faker::name::en::FirstName;
use fake::Fake;
use rand::Rng;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tabby::doc;
use tabby::errors::TabbyResult;
use tabby_int_test::test_util::{cleanup, create_test_context, dooby, momo, run_test, Cat};

#[test]
fn walkthrough_saves_run_concurrently() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;

            let (dooby_saved, momo_saved) = thread::scope(|scope| {
                let first = scope.spawn(|| cats.create(dooby()));
                let second = scope.spawn(|| cats.create(momo()));
                (first.join(), second.join())
            });
            let dooby_id = dooby_saved.unwrap()?.id();
            let momo_id = momo_saved.unwrap()?.id();
            assert_ne!(dooby_id, momo_id);

            assert_eq!(cats.count(doc! {})?, 2);
            assert!(cats.find_one(doc! { "name": "Dooby" }).exec()?.is_some());
            assert!(cats.find_one(doc! { "name": "Momo" }).exec()?.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn many_threads_create_cats() {
    run_test(
        create_test_context,
        |ctx| {
            let connection = ctx.connection();
            let num_threads = 8;
            let cats_per_thread = 25;
            let barrier = Arc::new(Barrier::new(num_threads));

            let handles: Vec<_> = (0..num_threads)
                .map(|_| {
                    let connection = connection.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || -> TabbyResult<Vec<String>> {
                        let cats = connection.model::<Cat>()?;
                        let mut rng = rand::rng();
                        let mut names = Vec::with_capacity(cats_per_thread);
                        barrier.wait();
                        for _ in 0..cats_per_thread {
                            let name: String = FirstName().fake();
                            let age: i32 = rng.random_range(1..20);
                            cats.create(doc! {
                                "name": (name.clone()),
                                "owner": "Shelter",
                                "age": age,
                            })?;
                            names.push(name);
                        }
                        Ok(names)
                    })
                })
                .collect();

            let mut expected = 0;
            for handle in handles {
                let names = handle.join().expect("worker panicked")?;
                expected += names.len();
            }

            let cats = connection.model::<Cat>()?;
            let all = cats.find(doc! { "owner": "Shelter" }).exec()?;
            assert_eq!(all.len(), expected);
            let ids: HashSet<_> = all.iter().filter_map(|r| r.id()).collect();
            assert_eq!(ids.len(), expected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn concurrent_updates_of_distinct_records() {
    run_test(
        create_test_context,
        |ctx| {
            let cats = ctx.connection().model::<Cat>()?;
            let mut ids = Vec::new();
            for i in 0..10 {
                ids.push(cats.create(doc! { "name": (format!("cat-{}", i)), "age": 1 })?.id());
            }

            thread::scope(|scope| -> TabbyResult<()> {
                let workers: Vec<_> = ids
                    .iter()
                    .flatten()
                    .map(|id| {
                        let cats = &cats;
                        scope.spawn(move || -> TabbyResult<()> {
                            let mut record = cats.find_by_id(id)?.expect("cat exists");
                            record.set("age", 2)?;
                            record.persist()?;
                            Ok(())
                        })
                    })
                    .collect();
                for worker in workers {
                    worker.join().expect("worker panicked")?;
                }
                Ok(())
            })?;

            assert_eq!(cats.count(doc! { "age": 2 })?, 10);
            assert_eq!(cats.count(doc! { "age": 1 })?, 0);
            Ok(())
        },
        cleanup,
    )
}

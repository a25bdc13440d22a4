use std::thread;
use tabby::connection::{ConnectOptions, Connection};
use tabby::doc;
use tabby::errors::TabbyResult;
use tabby::model::{Model, Record};
use tabby_int_test::test_util::{dooby, init_logger, momo, Cat};

#[cfg(feature = "fjall")]
fn open_connection() -> TabbyResult<Connection> {
    use tabby_fjall_adapter::FjallModule;

    Connection::builder()
        .load_module(FjallModule::default())
        .options(ConnectOptions::new().use_modern_client(true))
        .connect("fjall://localhost/adopt-a-cat")
}

#[cfg(not(feature = "fjall"))]
fn open_connection() -> TabbyResult<Connection> {
    tabby::connect(
        "memory://localhost/adopt-a-cat",
        ConnectOptions::new().use_modern_client(true),
    )
}

fn save(cats: &Model<Cat>, input: tabby::collection::Document) -> TabbyResult<Record<Cat>> {
    let mut kitty = cats.new_record(input)?;
    kitty.persist()?;
    Ok(kitty)
}

fn rename_dooby(cats: &Model<Cat>) -> TabbyResult<Option<Record<Cat>>> {
    let Some(mut the_cat) = cats.find_one(doc! { "name": "Dooby" }).exec()? else {
        return Ok(None);
    };
    the_cat.set_fields(doc! { "name": "Beans" })?;
    the_cat.persist()?;
    Ok(Some(the_cat))
}

fn main() {
    init_logger();

    let connection = match open_connection() {
        Ok(connection) => connection,
        Err(err) => {
            println!("Connection ERROR!");
            println!("{}", err);
            return;
        }
    };

    let cats = match connection.model::<Cat>() {
        Ok(cats) => cats,
        Err(err) => {
            println!("Cat model ERROR!");
            println!("{}", err);
            return;
        }
    };

    // the two saves do not depend on each other
    thread::scope(|scope| {
        scope.spawn(|| match save(&cats, dooby()) {
            Ok(_) => println!("Dooby save successful!"),
            Err(err) => {
                println!("Dooby Error!");
                println!("{}", err);
            }
        });
        scope.spawn(|| match save(&cats, momo()) {
            Ok(_) => println!("Momo save successful!"),
            Err(err) => {
                println!("Momo Error!");
                println!("{}", err);
            }
        });
    });

    match cats
        .find(doc! { "name": "Dooby" })
        .project(doc! { "name": 1, "_id": 0 })
        .exec()
    {
        Ok(all_cats) => {
            println!("find all cats SUCCESS!");
            for cat in all_cats {
                println!("{}", cat);
            }
        }
        Err(err) => {
            println!("find cats ERROR!");
            println!("{}", err);
        }
    }

    match cats.find_one(doc! { "name": "Momo" }).exec() {
        Ok(the_momo) => {
            println!("One of the MOMOs");
            match the_momo {
                Some(the_momo) => println!("{}", the_momo),
                None => println!("null"),
            }
        }
        Err(err) => {
            println!("one MOMO ERROR!");
            println!("{}", err);
        }
    }

    match rename_dooby(&cats) {
        Ok(Some(the_cat)) => {
            println!("Update SUCCESS!");
            println!("{}", the_cat);
        }
        Ok(None) => {
            println!("Update ERROR!");
            println!("no cat named Dooby");
        }
        Err(err) => {
            println!("Update ERROR!");
            println!("{}", err);
        }
    }

    if let Err(err) = connection.close() {
        println!("Close ERROR!");
        println!("{}", err);
    }
}

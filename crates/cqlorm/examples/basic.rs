//! Basic usage example for cqlorm
//!
//! Run with: cargo run --example basic -p cqlorm

use cqlorm::{Condition, CqlError, Entity, Flavor, NamingPolicy, ParameterMode, StatementFactory};

#[derive(Debug, Clone, Entity)]
#[cql(table = "users")]
struct User {
    #[cql(id)]
    id: i64,
    user_name: String,
    #[cql(column = "mail")]
    email: Option<String>,
}

fn main() -> Result<(), CqlError> {
    let cql = StatementFactory::new(NamingPolicy::LowerUnderscore, ParameterMode::Positional);

    let user = User {
        id: 1,
        user_name: "alice".to_string(),
        email: Some("alice@example.com".to_string()),
    };

    // INSERT from the entity's insert-eligible properties
    let insert = cql.insert_entity(&user, &[]).if_not_exists().pair()?;
    println!("{}  {:?}", insert.text, insert.parameters);

    // SELECT by primary key
    let by_id = cql.select_entity::<User>(&[]).where_ids([1]).pair()?;
    println!("{}  {:?}", by_id.text, by_id.parameters);

    // UPDATE keyed on the id fields
    let update = cql.update_entity(&user, &["email"]).using_ttl(3600).pair()?;
    println!("{}  {:?}", update.text, update.parameters);

    // Named parameters: BETWEEN gets distinct names for both bounds
    let named = cql.with_flavor(Flavor::new(NamingPolicy::LowerUnderscore, ParameterMode::Named));
    let range = named
        .select(["userName"])
        .from_table("users")
        .where_cond(Condition::between("id", 10, 20))
        .limit(100)
        .pair()?;
    println!("{}  {:?}", range.text, range.parameters);

    // Statements can be rendered only once
    let mut delete = cql.delete_from_entity::<User>();
    delete.where_ids([1]);
    println!("{}", delete.text()?);
    if let Err(err) = delete.text() {
        println!("second render: {err}");
    }

    println!(
        "open builders: {}, pooled buffers: {}",
        cql.pool().open_builders(),
        cql.pool().pooled()
    );

    Ok(())
}

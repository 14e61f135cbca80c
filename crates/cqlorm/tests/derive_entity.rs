#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use cqlorm::{
    Condition, CqlError, Entity, NamingPolicy, ParameterMode, SchemaCache, StatementFactory, Value,
};
use uuid::Uuid;

#[derive(Debug, Clone, Entity)]
struct Address {
    street: String,
    zip_code: String,
}

#[derive(Debug, Clone, Entity)]
#[cql(table = "customers")]
struct Customer {
    #[cql(id)]
    customer_id: Uuid,
    first_name: String,
    #[cql(column = "mail")]
    email: Option<String>,
    #[cql(non_updatable)]
    signup_source: String,
    #[cql(read_only)]
    created_at: DateTime<Utc>,
    #[cql(transient)]
    session_token: String,
    #[cql(nested)]
    home_address: Address,
}

#[derive(Debug, Clone, Entity)]
struct SensorReading {
    #[cql(id)]
    sensor_id: String,
    #[cql(id)]
    bucket_day: String,
    celsius: f64,
}

#[derive(Debug, Clone, Entity)]
struct TreeNode {
    #[cql(id)]
    id: i64,
    #[cql(nested)]
    parent: Option<Box<TreeNode>>,
}

fn customer() -> Customer {
    Customer {
        customer_id: Uuid::nil(),
        first_name: "Ann".to_string(),
        email: None,
        signup_source: "web".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        session_token: "secret".to_string(),
        home_address: Address {
            street: "Main".to_string(),
            zip_code: "12345".to_string(),
        },
    }
}

fn snake(mode: ParameterMode) -> StatementFactory {
    StatementFactory::new(NamingPolicy::LowerUnderscore, mode)
}

#[test]
fn derived_metadata() {
    let meta = Customer::meta();
    assert_eq!(meta.name, "Customer");
    assert!(meta.type_name.ends_with("::Customer"));
    assert_eq!(meta.table, Some("customers"));

    let names: Vec<_> = meta.fields.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        vec![
            "customerId",
            "firstName",
            "email",
            "signupSource",
            "createdAt",
            "sessionToken",
            "homeAddress"
        ]
    );
    assert!(meta.field("customerId").is_some_and(|f| f.id));
    assert_eq!(meta.field("email").and_then(|f| f.column), Some("mail"));
    assert!(meta.field("homeAddress").is_some_and(|f| f.nested.is_some()));
    assert!(std::ptr::eq(Customer::meta(), meta));
}

#[test]
fn to_props_skips_transient_and_nested() {
    let props = customer().to_props();
    let names: Vec<_> = props.names().collect();
    assert_eq!(
        names,
        vec!["customerId", "firstName", "email", "signupSource", "createdAt"]
    );
    assert_eq!(props.get("email"), Some(&Value::Null));
    assert_eq!(props.get("customerId"), Some(&Value::Uuid(Uuid::nil())));
}

#[test]
fn nested_columns_use_nested_table() {
    let cache = SchemaCache::new();
    let map = cache
        .columns(Customer::meta(), NamingPolicy::LowerUnderscore)
        .unwrap();
    assert_eq!(map.get("homeAddress.zipCode"), Some("address.zip_code"));
    assert_eq!(map.get("email"), Some("mail"));
    assert_eq!(map.get("sessionToken"), None);

    let text = snake(ParameterMode::Literal)
        .select(["firstName"])
        .from_type::<Customer>()
        .where_cond(Condition::eq("homeAddress.zipCode", "12345"))
        .allow_filtering()
        .text()
        .unwrap();
    assert_eq!(
        text,
        r#"SELECT first_name AS "firstName" FROM customers WHERE address.zip_code = '12345' ALLOW FILTERING"#
    );
}

#[test]
fn entity_statements() {
    let cql = snake(ParameterMode::Positional);

    let text = cql.select_entity::<Customer>(&[]).text().unwrap();
    assert_eq!(
        text,
        r#"SELECT customer_id AS "customerId", first_name AS "firstName", mail AS "email", signup_source AS "signupSource", created_at AS "createdAt" FROM customers"#
    );

    let pair = cql.insert_entity(&customer(), &[]).pair().unwrap();
    assert_eq!(
        pair.text,
        "INSERT INTO customers (customer_id, first_name, mail, signup_source) VALUES (?,?,?,?)"
    );
    assert_eq!(pair.parameters.len(), 4);

    let pair = cql.update_entity(&customer(), &["email"]).pair().unwrap();
    assert_eq!(
        pair.text,
        "UPDATE customers SET first_name = ? WHERE customer_id = ?"
    );
    assert_eq!(
        pair.parameters,
        vec![Value::from("Ann"), Value::Uuid(Uuid::nil())]
    );
}

#[test]
fn composite_key_prefix() {
    let cql = StatementFactory::new(NamingPolicy::UpperUnderscore, ParameterMode::Named);
    let text = cql
        .select_entity::<SensorReading>(&[])
        .where_ids(["s-1"])
        .text()
        .unwrap();
    assert_eq!(
        text,
        r#"SELECT SENSOR_ID AS "sensorId", BUCKET_DAY AS "bucketDay", CELSIUS AS "celsius" FROM SENSOR_READING WHERE SENSOR_ID = :sensorId"#
    );

    let text = cql
        .delete_from_entity::<SensorReading>()
        .where_ids(["s-1", "2024-01-01"])
        .text()
        .unwrap();
    assert_eq!(
        text,
        "DELETE FROM SENSOR_READING WHERE (SENSOR_ID = :sensorId) AND (BUCKET_DAY = :bucketDay)"
    );
}

#[test]
fn self_referencing_entity_is_cyclic() {
    let cache = SchemaCache::new();
    let err = cache
        .columns(TreeNode::meta(), NamingPolicy::LowerCamel)
        .unwrap_err();
    assert!(err.is_cyclic_reference());

    let err = snake(ParameterMode::Positional)
        .select_entity::<TreeNode>(&[])
        .pair()
        .unwrap_err();
    assert!(matches!(err, CqlError::CyclicReference(chain) if chain.contains("TreeNode")));
}

#[test]
fn select_entity_nested_expands_dotted_columns() {
    let cql = snake(ParameterMode::Positional);

    let text = cql
        .select_entity_nested::<Customer>(&["createdAt", "homeAddress.street"])
        .text()
        .unwrap();
    assert_eq!(
        text,
        r#"SELECT customer_id AS "customerId", first_name AS "firstName", mail AS "email", signup_source AS "signupSource", address.zip_code AS "homeAddress.zipCode" FROM customers"#
    );

    let err = cql.select_entity_nested::<TreeNode>(&[]).pair().unwrap_err();
    assert!(err.is_cyclic_reference());
}

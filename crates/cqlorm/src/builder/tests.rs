use super::*;
use crate::condition::SubQuery;
use crate::entity::FieldMeta;
use crate::factory::StatementFactory;
use crate::flavor::ParameterMode;
use crate::naming::NamingPolicy;

struct Account {
    id: i64,
    first_name: String,
    email: String,
    created_at: i64,
}

static ACCOUNT_FIELDS: [FieldMeta; 4] = [
    FieldMeta::new("id").id(),
    FieldMeta::new("firstName"),
    FieldMeta::new("email").column("mail"),
    FieldMeta::new("createdAt").read_only(),
];
static ACCOUNT: EntityMeta =
    EntityMeta::new("builder::tests::Account", "UserAccount", &ACCOUNT_FIELDS);

impl Entity for Account {
    fn meta() -> &'static EntityMeta {
        &ACCOUNT
    }

    fn to_props(&self) -> PropBag {
        PropBag::new()
            .with("id", self.id)
            .with("firstName", self.first_name.as_str())
            .with("email", self.email.as_str())
            .with("createdAt", self.created_at)
    }
}

struct Reading;

static READING_FIELDS: [FieldMeta; 3] = [
    FieldMeta::new("sensorId").id(),
    FieldMeta::new("day").id(),
    FieldMeta::new("celsius"),
];
static READING: EntityMeta = EntityMeta::new("builder::tests::Reading", "Reading", &READING_FIELDS);

impl Entity for Reading {
    fn meta() -> &'static EntityMeta {
        &READING
    }

    fn to_props(&self) -> PropBag {
        PropBag::new()
    }
}

fn ann() -> Account {
    Account {
        id: 7,
        first_name: "Ann".to_string(),
        email: "ann@example.com".to_string(),
        created_at: 1_700_000_000,
    }
}

fn snake(mode: ParameterMode) -> StatementFactory {
    StatementFactory::new(NamingPolicy::LowerUnderscore, mode)
}

// ==================== INSERT ====================

#[test]
fn test_insert_columns_positional() {
    let pair = snake(ParameterMode::Positional)
        .insert(["firstName", "lastName"])
        .into_table("account")
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "INSERT INTO account (first_name, last_name) VALUES (?,?)"
    );
    assert!(pair.parameters.is_empty());
}

#[test]
fn test_insert_props_clause_order() {
    let props = PropBag::new().with("firstName", "Ann").with("age", 30);
    let pair = snake(ParameterMode::Positional)
        .insert_props(props)
        .into_table("account")
        .using_timestamp(1000)
        .if_not_exists()
        .using_ttl(60)
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "INSERT INTO account (first_name, age) VALUES (?,?) IF NOT EXISTS USING TTL 60 AND TIMESTAMP 1000"
    );
    assert_eq!(pair.parameters, vec![Value::from("Ann"), Value::Int(30)]);
}

#[test]
fn test_insert_props_named_and_literal() {
    let props = PropBag::new().with("firstName", "O'Brien").with("age", 30);
    let named = snake(ParameterMode::Named)
        .insert_props(props.clone())
        .into_table("account")
        .pair()
        .unwrap();
    assert_eq!(
        named.text,
        "INSERT INTO account (first_name, age) VALUES (:firstName,:age)"
    );
    assert_eq!(named.parameters.len(), 2);

    let literal = snake(ParameterMode::Literal)
        .insert_props(props)
        .into_table("account")
        .pair()
        .unwrap();
    assert_eq!(
        literal.text,
        "INSERT INTO account (first_name, age) VALUES ('O''Brien',30)"
    );
    assert!(literal.parameters.is_empty());
}

#[test]
fn test_insert_expr_value_is_inlined() {
    let props = PropBag::new()
        .with("id", 1)
        .with("createdAt", Value::expr("toTimestamp(now())"));
    let pair = snake(ParameterMode::Positional)
        .insert_props(props)
        .into_table("event")
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "INSERT INTO event (id, created_at) VALUES (?,toTimestamp(now()))"
    );
    assert_eq!(pair.parameters, vec![Value::Int(1)]);
}

#[test]
fn test_insert_multi_row() {
    let rows = vec![
        PropBag::new().with("a", 1).with("b", 2),
        PropBag::new().with("a", 3).with("b", 4),
    ];
    let pair = snake(ParameterMode::Positional)
        .insert_props_list(rows.clone())
        .into_table("t")
        .pair()
        .unwrap();
    assert_eq!(pair.text, "INSERT INTO t (a, b) VALUES (?,?), (?,?)");
    assert_eq!(pair.parameters.len(), 4);

    let err = snake(ParameterMode::Named)
        .insert_props_list(rows)
        .into_table("t")
        .pair()
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn test_insert_multi_row_missing_value() {
    let rows = vec![
        PropBag::new().with("a", 1).with("b", 2),
        PropBag::new().with("a", 3),
    ];
    let err = snake(ParameterMode::Literal)
        .insert_props_list(rows)
        .into_table("t")
        .pair()
        .unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn test_insert_requires_table_and_columns() {
    let cql = snake(ParameterMode::Positional);
    assert!(cql.insert(["a"]).pair().unwrap_err().is_missing_spec());
    assert!(
        cql.insert(Vec::<String>::new())
            .into_table("t")
            .pair()
            .unwrap_err()
            .is_missing_spec()
    );
}

#[test]
fn test_insert_column_only_named() {
    let text = snake(ParameterMode::Named)
        .insert(["acc.firstName", "age"])
        .into_table("account")
        .text()
        .unwrap();
    assert_eq!(
        text,
        "INSERT INTO account (acc.first_name, age) VALUES (:firstName,:age)"
    );
}

// ==================== SELECT ====================

#[test]
fn test_select_alias_positional_and_literal() {
    let pair = snake(ParameterMode::Positional)
        .select(["firstName"])
        .from_table("account")
        .where_cond(Condition::eq("id", 1))
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        r#"SELECT first_name AS "firstName" FROM account WHERE id = ?"#
    );
    assert_eq!(pair.parameters, vec![Value::Int(1)]);

    let pair = snake(ParameterMode::Literal)
        .select(["firstName"])
        .from_table("account")
        .where_cond(Condition::eq("id", 1))
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        r#"SELECT first_name AS "firstName" FROM account WHERE id = 1"#
    );
    assert!(pair.parameters.is_empty());
}

#[test]
fn test_named_repeated_column_shares_name() {
    let pair = snake(ParameterMode::Named)
        .select(["*"])
        .from_table("account")
        .where_cond(Condition::and([
            Condition::gt("age", 18),
            Condition::lt("age", 65),
        ]))
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "SELECT * FROM account WHERE (age > :age) AND (age < :age)"
    );
    assert_eq!(pair.parameters, vec![Value::Int(18), Value::Int(65)]);
}

#[test]
fn test_select_no_alias_when_names_agree() {
    let text = StatementFactory::new(NamingPolicy::LowerCamel, ParameterMode::Positional)
        .select(["firstName", "*"])
        .from_table("account")
        .text()
        .unwrap();
    assert_eq!(text, "SELECT firstName, * FROM account");

    let text = snake(ParameterMode::Positional)
        .select(["id", "age"])
        .from_table("account")
        .text()
        .unwrap();
    assert_eq!(text, "SELECT id, age FROM account");
}

#[test]
fn test_select_between_named() {
    let cql = snake(ParameterMode::Named);
    let pair = cql
        .select(["*"])
        .from_table("account")
        .where_cond(Condition::between("age", 18, 65))
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "SELECT * FROM account WHERE age BETWEEN :minAge AND :maxAge"
    );
    assert_eq!(pair.parameters, vec![Value::Int(18), Value::Int(65)]);

    let parsed = cql.parse(&pair.text).unwrap();
    assert_eq!(parsed.ordered_names(), vec!["minAge", "maxAge"]);
}

#[test]
fn test_select_in_named() {
    let pair = snake(ParameterMode::Named)
        .select(["*"])
        .from_table("account")
        .where_cond(Condition::in_list("id", [1, 2]))
        .pair()
        .unwrap();
    assert_eq!(pair.text, "SELECT * FROM account WHERE id IN (:id1,:id2)");
    assert_eq!(pair.parameters.len(), 2);
}

#[test]
fn test_select_modifiers_clause_order() {
    let text = snake(ParameterMode::Literal)
        .select_with("DISTINCT", ["partitionKey"])
        .from_table("events")
        .allow_filtering()
        .limit(10)
        .order_by_dir(["createdAt"], Direction::Desc)
        .where_cond(Condition::gt("retryCount", 2))
        .text()
        .unwrap();
    assert_eq!(
        text,
        r#"SELECT DISTINCT partition_key AS "partitionKey" FROM events WHERE retry_count > 2 ORDER BY created_at DESC LIMIT 10 ALLOW FILTERING"#
    );
}

#[test]
fn test_select_order_by_variants() {
    let text = snake(ParameterMode::Positional)
        .select(["*"])
        .from_table("events")
        .order_by(["bucketDay"])
        .order_by_map([("createdAt", Direction::Desc), ("seqNo", Direction::Asc)])
        .order_by_raw("eventType DESC")
        .text()
        .unwrap();
    assert_eq!(
        text,
        "SELECT * FROM events ORDER BY bucket_day, created_at DESC, seq_no ASC, event_type DESC"
    );
}

#[test]
fn test_select_aliased_and_fragment() {
    let cql = snake(ParameterMode::Positional);
    let text = cql
        .select_aliased([("firstName", "name"), ("id", "key")])
        .from_table("account")
        .text()
        .unwrap();
    assert_eq!(
        text,
        r#"SELECT first_name AS "name", id AS "key" FROM account"#
    );

    let text = cql
        .select(["count(*) AS total"])
        .from_table("account")
        .text()
        .unwrap();
    assert_eq!(text, "SELECT count(*) AS total FROM account");
}

#[test]
fn test_select_requires_from() {
    let err = snake(ParameterMode::Positional)
        .select(["a"])
        .pair()
        .unwrap_err();
    assert!(err.is_missing_spec());
}

#[test]
fn test_where_raw_resolves_identifiers() {
    let text = StatementFactory::new(NamingPolicy::UpperUnderscore, ParameterMode::Positional)
        .select(["*"])
        .from_table("ACCOUNT")
        .where_raw("lastLogin < toTimestamp(now()) AND status = 'activeUser'")
        .text()
        .unwrap();
    assert_eq!(
        text,
        "SELECT * FROM ACCOUNT WHERE LAST_LOGIN < toTimestamp(now()) AND STATUS = 'activeUser'"
    );
}

// ==================== Conditions ====================

#[test]
fn test_junction_flattening() {
    let cql = snake(ParameterMode::Literal);
    let text = cql
        .select(["*"])
        .from_table("t")
        .where_cond(Condition::and([
            Condition::eq("a", 1),
            Condition::eq("b", 2),
            Condition::eq("c", 3),
        ]))
        .text()
        .unwrap();
    assert_eq!(text, "SELECT * FROM t WHERE (a = 1) AND (b = 2) AND (c = 3)");

    let text = cql
        .select(["*"])
        .from_table("t")
        .where_cond(Condition::and([Condition::eq("a", 1)]))
        .text()
        .unwrap();
    assert_eq!(text, "SELECT * FROM t WHERE a = 1");
}

#[test]
fn test_nested_junction_keeps_no_outer_wrap() {
    let text = snake(ParameterMode::Literal)
        .select(["*"])
        .from_table("t")
        .where_cond(Condition::or([
            Condition::and([Condition::eq("a", 1), Condition::eq("b", 2)]),
            Condition::eq("c", 3),
        ]))
        .text()
        .unwrap();
    assert_eq!(text, "SELECT * FROM t WHERE ((a = 1) AND (b = 2)) OR (c = 3)");
}

#[test]
fn test_empty_junction() {
    let mut builder = snake(ParameterMode::Positional).select(["*"]);
    builder
        .from_table("t")
        .where_cond(Condition::or(Vec::new()));
    let err = builder.pair().unwrap_err();
    assert_eq!(err, CqlError::EmptyCondition("OR"));
    assert!(builder.is_closed());
}

#[test]
fn test_not_and_raw_conditions() {
    let text = snake(ParameterMode::Literal)
        .select(["*"])
        .from_table("account")
        .where_cond(Condition::and([
            Condition::not(Condition::gt("loginCount", 21)),
            Condition::raw("firstName = 'x'"),
        ]))
        .text()
        .unwrap();
    assert_eq!(
        text,
        "SELECT * FROM account WHERE (NOT (login_count > 21)) AND (firstName = 'x')"
    );
}

#[test]
fn test_collection_operators() {
    let text = snake(ParameterMode::Literal)
        .select(["*"])
        .from_table("account")
        .where_cond(Condition::and([
            Condition::contains("tagSet", "vip"),
            Condition::contains_key("attrMap", "tier"),
        ]))
        .allow_filtering()
        .text()
        .unwrap();
    assert_eq!(
        text,
        "SELECT * FROM account WHERE (tag_set CONTAINS 'vip') AND (attr_map CONTAINS KEY 'tier') ALLOW FILTERING"
    );
}

#[test]
fn test_subquery_same_flavor() {
    let cql = snake(ParameterMode::Positional);
    let sub = cql
        .subquery(["id"])
        .from_table("account")
        .where_cond(Condition::eq("firstName", "Ann"));
    let pair = cql
        .select(["*"])
        .from_table("orders")
        .where_cond(Condition::in_subquery("accountId", sub))
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "SELECT * FROM orders WHERE account_id IN (SELECT id FROM account WHERE first_name = ?)"
    );
    assert_eq!(pair.parameters, vec![Value::from("Ann")]);
}

#[test]
fn test_subquery_flavor_mismatch() {
    let outer = snake(ParameterMode::Positional);
    let other = snake(ParameterMode::Named);
    let sub = other.subquery(["id"]).from_table("account");
    let err = outer
        .select(["*"])
        .from_table("orders")
        .where_cond(Condition::in_subquery("accountId", sub))
        .pair()
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn test_subquery_text_and_missing_target() {
    let cql = snake(ParameterMode::Positional);
    let text = cql
        .select(["*"])
        .from_table("orders")
        .where_cond(Condition::not_in_subquery(
            "accountId",
            SubQuery::text("SELECT id FROM banned"),
        ))
        .text()
        .unwrap();
    assert_eq!(
        text,
        "SELECT * FROM orders WHERE account_id NOT IN (SELECT id FROM banned)"
    );

    let err = cql
        .select(["*"])
        .from_table("orders")
        .where_cond(Condition::in_subquery("accountId", cql.subquery(["id"])))
        .pair()
        .unwrap_err();
    assert!(err.is_missing_spec());
}

#[test]
fn test_subquery_uses_entity_columns() {
    let cql = snake(ParameterMode::Literal);
    let sub = cql
        .subquery(["id"])
        .from_type::<Account>()
        .where_cond(Condition::eq("email", "a@b.c"));
    let text = cql
        .select(["*"])
        .from_table("orders")
        .where_cond(Condition::in_subquery("accountId", sub))
        .text()
        .unwrap();
    assert_eq!(
        text,
        "SELECT * FROM orders WHERE account_id IN (SELECT id FROM user_account WHERE mail = 'a@b.c')"
    );
}

// ==================== UPDATE ====================

#[test]
fn test_update_clause_order() {
    let pair = snake(ParameterMode::Positional)
        .update("account")
        .if_exists()
        .where_cond(Condition::eq("id", 7))
        .set_value("firstName", "Ann")
        .set_expr("visitCount = visitCount + 1")
        .using_ttl(30)
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "UPDATE account USING TTL 30 SET first_name = ?, visit_count = visit_count + 1 WHERE id = ? IF EXISTS"
    );
    assert_eq!(pair.parameters, vec![Value::from("Ann"), Value::Int(7)]);
}

#[test]
fn test_update_column_only_and_if_cond() {
    let pair = snake(ParameterMode::Named)
        .update("account")
        .set(["firstName", "lastName"])
        .where_cond(Condition::eq("id", 7))
        .if_cond(Condition::eq("version", 3))
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "UPDATE account SET first_name = :firstName, last_name = :lastName WHERE id = :id IF version = :version"
    );
    assert_eq!(pair.parameters, vec![Value::Int(7), Value::Int(3)]);
}

#[test]
fn test_update_set_props_literal() {
    let text = snake(ParameterMode::Literal)
        .update("account")
        .set_props(PropBag::new().with("nickName", Value::Null).with("active", true))
        .where_cond(Condition::eq("id", 1))
        .text()
        .unwrap();
    assert_eq!(
        text,
        "UPDATE account SET nick_name = null, active = true WHERE id = 1"
    );
}

#[test]
fn test_update_requires_set() {
    let err = snake(ParameterMode::Positional)
        .update("account")
        .where_cond(Condition::eq("id", 1))
        .pair()
        .unwrap_err();
    assert!(err.is_missing_spec());
}

// ==================== DELETE ====================

#[test]
fn test_delete_clause_order() {
    let pair = snake(ParameterMode::Positional)
        .delete_from("account")
        .if_cond(Condition::eq("firstName", "Ann"))
        .where_cond(Condition::eq("id", 7))
        .using_timestamp(99)
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "DELETE FROM account USING TIMESTAMP 99 WHERE id = ? IF first_name = ?"
    );
    assert_eq!(pair.parameters, vec![Value::Int(7), Value::from("Ann")]);
}

#[test]
fn test_delete_columns() {
    let text = snake(ParameterMode::Literal)
        .delete(["firstName", "email"])
        .from_table("account")
        .where_cond(Condition::eq("id", 1))
        .if_raw("lastLogin = null")
        .text()
        .unwrap();
    assert_eq!(
        text,
        "DELETE first_name, email FROM account WHERE id = 1 IF last_login = null"
    );
}

// ==================== Entities ====================

#[test]
fn test_select_entity() {
    let cql = snake(ParameterMode::Positional);
    let pair = cql
        .select_entity::<Account>(&["createdAt"])
        .where_ids([7])
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        r#"SELECT id, first_name AS "firstName", mail AS "email" FROM user_account WHERE id = ?"#
    );
    assert_eq!(pair.parameters, vec![Value::Int(7)]);

    let text = StatementFactory::new(NamingPolicy::LowerCamel, ParameterMode::Positional)
        .select_entity::<Account>(&[])
        .text()
        .unwrap();
    assert_eq!(text, "SELECT id, firstName, mail, createdAt FROM userAccount");
}

#[test]
fn test_insert_entity_skips_read_only_and_excluded() {
    let pair = snake(ParameterMode::Positional)
        .insert_entity(&ann(), &["email"])
        .pair()
        .unwrap();
    assert_eq!(pair.text, "INSERT INTO user_account (id, first_name) VALUES (?,?)");
    assert_eq!(pair.parameters, vec![Value::Int(7), Value::from("Ann")]);

    let text = snake(ParameterMode::Positional)
        .insert_entity(&ann(), &[])
        .into_table("account_archive")
        .text()
        .unwrap();
    assert_eq!(
        text,
        "INSERT INTO account_archive (id, first_name, mail) VALUES (?,?,?)"
    );
}

#[test]
fn test_insert_entities() {
    let mut other = ann();
    other.id = 8;
    let pair = snake(ParameterMode::Literal)
        .insert_entities(&[ann(), other], &["email"])
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "INSERT INTO user_account (id, first_name) VALUES (7,'Ann'), (8,'Ann')"
    );
}

#[test]
fn test_update_entity() {
    let pair = StatementFactory::new(NamingPolicy::UpperUnderscore, ParameterMode::Named)
        .update_entity(&ann(), &[])
        .pair()
        .unwrap();
    assert_eq!(
        pair.text,
        "UPDATE USER_ACCOUNT SET FIRST_NAME = :firstName, mail = :email WHERE ID = :id"
    );
    assert_eq!(
        pair.parameters,
        vec![
            Value::from("Ann"),
            Value::from("ann@example.com"),
            Value::Int(7)
        ]
    );
}

#[test]
fn test_delete_entity_by_key_prefix() {
    let cql = snake(ParameterMode::Positional);
    let text = cql
        .delete_from_entity::<Reading>()
        .where_ids([Value::from("s-1"), Value::from("2024-01-01")])
        .text()
        .unwrap();
    assert_eq!(
        text,
        "DELETE FROM reading WHERE (sensor_id = ?) AND (day = ?)"
    );

    let text = cql
        .delete_from_entity::<Reading>()
        .where_ids(["s-1"])
        .text()
        .unwrap();
    assert_eq!(text, "DELETE FROM reading WHERE sensor_id = ?");

    let err = cql
        .delete_from_entity::<Reading>()
        .where_ids([1, 2, 3])
        .pair()
        .unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn test_where_ids_needs_entity() {
    let err = snake(ParameterMode::Positional)
        .delete_from("account")
        .where_ids([1])
        .pair()
        .unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn test_from_type_resolves_conditions() {
    let text = snake(ParameterMode::Literal)
        .select(["email"])
        .from_type::<Account>()
        .where_cond(Condition::eq("email", "x"))
        .text()
        .unwrap();
    assert_eq!(
        text,
        r#"SELECT mail AS "email" FROM user_account WHERE mail = 'x'"#
    );
}

// ==================== Lifecycle ====================

#[test]
fn test_second_render_is_closed() {
    let mut builder = snake(ParameterMode::Positional).select(["*"]);
    builder.from_table("t");
    assert!(builder.text().is_ok());
    assert!(builder.is_closed());
    assert!(builder.text().unwrap_err().is_closed_builder());
    assert!(builder.pair().unwrap_err().is_closed_builder());
}

#[test]
fn test_clause_after_close_is_ignored() {
    let mut builder = snake(ParameterMode::Positional).select(["*"]);
    builder.from_table("t");
    builder.pair().unwrap();
    builder.limit(3);
    assert!(builder.pair().unwrap_err().is_closed_builder());
}

#[test]
fn test_invalid_clause_for_operation() {
    let cql = snake(ParameterMode::Positional);
    let err = cql
        .insert(["a"])
        .into_table("t")
        .limit(1)
        .pair()
        .unwrap_err();
    assert!(err.is_usage());

    let err = cql.select(["a"]).from_table("t").set(["b"]).pair().unwrap_err();
    assert!(err.is_usage());

    let err = cql.delete_from("t").using_ttl(10).pair().unwrap_err();
    assert!(err.is_usage());

    let err = cql.insert(["a"]).into_table("t").if_exists().pair().unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn test_first_error_wins() {
    let err = snake(ParameterMode::Positional)
        .insert(["a"])
        .from_table("t")
        .where_cond(Condition::eq("a", 1))
        .pair()
        .unwrap_err();
    assert_eq!(err, CqlError::usage("FROM is not valid for INSERT"));
}

#[test]
fn test_repeated_clauses_are_usage_errors() {
    let cql = snake(ParameterMode::Positional);
    let err = cql
        .select(["*"])
        .from_table("t")
        .where_cond(Condition::eq("a", 1))
        .where_raw("b = 2")
        .pair()
        .unwrap_err();
    assert!(err.is_usage());

    let err = cql
        .update("t")
        .set(["a"])
        .if_exists()
        .if_cond(Condition::eq("a", 1))
        .pair()
        .unwrap_err();
    assert!(err.is_usage());

    let err = cql.insert(["a"]).into_table("t").into_table("u").pair().unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn test_buffers_return_to_pool() {
    let cql = snake(ParameterMode::Positional);
    {
        let mut a = cql.select(["*"]);
        let _b = cql.select(["*"]);
        assert_eq!(cql.pool().open_builders(), 2);
        a.from_table("t").pair().unwrap();
        assert_eq!(cql.pool().open_builders(), 1);
    }
    assert_eq!(cql.pool().open_builders(), 0);
    assert_eq!(cql.pool().pooled(), 2);

    // error path
    let err = cql.select(["*"]).pair().unwrap_err();
    assert!(err.is_missing_spec());
    assert_eq!(cql.pool().open_builders(), 0);
}

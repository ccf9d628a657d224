use std::sync::Arc;

use polydispatch::{
    register_type, Callable, DispatchTable, Dispatcher, Predicate, TypeRegistry, Value,
};

fn is_even(inv: &polydispatch::Invocation<'_>) -> polydispatch::DispatchResult<Value> {
    Ok(Value::Bool(
        inv.arg(0).as_number().is_some_and(|n| n % 2.0 == 0.0),
    ))
}

#[test]
fn dynamic_type_registered_through_shared_registry() {
    // Unique name: the shared registry is process-wide.
    register_type(&[Value::from("e2e_even"), Value::function(is_even)]).unwrap();
    assert!(TypeRegistry::global().contains("e2e_even"));

    let f = Dispatcher::new(
        DispatchTable::new()
            .with_signature(["e2e_even"], Callable::constant("even"))
            .with_signature(["int"], Callable::constant("odd")),
    );

    assert_eq!(f.call(&[Value::from(4)]).unwrap(), Value::from("even"));
    assert_eq!(f.call(&[Value::from(3)]).unwrap(), Value::from("odd"));
}

#[test]
fn register_type_rejects_wrong_shapes() {
    let err = register_type(&[Value::from("only-a-name")]).unwrap_err();
    assert!(err.is_resolution());
    assert!(err.to_string().contains("registerType"));

    let err = register_type(&[Value::from(1), Value::function(is_even)]).unwrap_err();
    assert!(err.is_resolution());
}

#[test]
fn registration_is_visible_to_existing_dispatchers() {
    let registry = Arc::new(TypeRegistry::with_builtins());
    let f = Dispatcher::builder(
        DispatchTable::new()
            .with_signature(["even"], Callable::constant("even"))
            .with_catch_all(Callable::constant("other")),
    )
    .registry(Arc::clone(&registry))
    .build();

    assert_eq!(f.call(&[Value::from(2)]).unwrap(), Value::from("other"));

    registry
        .registrar()
        .unwrap()
        .call(&[Value::from("even"), Value::function(is_even)])
        .unwrap();

    assert_eq!(f.call(&[Value::from(2)]).unwrap(), Value::from("even"));
    assert_eq!(f.call(&[Value::from(3)]).unwrap(), Value::from("other"));
}

#[test]
fn last_registration_wins() {
    let registry = Arc::new(TypeRegistry::with_builtins());
    registry.register("small", Predicate::single(|v| v.as_number().is_some_and(|n| n < 10.0)));
    registry.register("small", Predicate::single(|v| v.as_number().is_some_and(|n| n < 2.0)));

    let f = Dispatcher::builder(
        DispatchTable::new()
            .with_signature(["small"], Callable::constant("small"))
            .with_catch_all(Callable::constant("large")),
    )
    .registry(registry)
    .build();

    assert_eq!(f.call(&[Value::from(5)]).unwrap(), Value::from("large"));
    assert_eq!(f.call(&[Value::from(1)]).unwrap(), Value::from("small"));
}

#[test]
fn builtins_can_be_overridden_per_registry() {
    let registry = Arc::new(TypeRegistry::with_builtins());
    // Accept numeric strings as ints in this registry only.
    registry.register(
        "int",
        Predicate::single(|v| v.is_integer() || v.as_str().is_some_and(|s| s.parse::<i64>().is_ok())),
    );

    let table = DispatchTable::new().with_signature(["int"], Callable::constant("int"));
    let custom = Dispatcher::builder(table.clone()).registry(registry).build();
    let standard = Dispatcher::builder(table)
        .registry(Arc::new(TypeRegistry::with_builtins()))
        .build();

    assert_eq!(custom.call(&[Value::from("42")]).unwrap(), Value::from("int"));
    assert!(standard.call(&[Value::from("42")]).is_err());
}

#[test]
fn variadic_predicate_via_callable() {
    let registry = Arc::new(TypeRegistry::with_builtins());
    // Consumes every remaining numeric argument.
    let numbers = Value::function(|inv| {
        let index = inv.arg(1).as_number().unwrap_or(0.0);
        let args = inv.arg(2).as_array().unwrap_or(&[]);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let start = index as usize;
        let count = args[start..].iter().take_while(|v| v.is_number()).count();
        #[allow(clippy::cast_precision_loss)]
        Ok(Value::from(count as f64))
    });
    registry
        .registrar()
        .unwrap()
        .call(&[Value::from("numbers"), numbers])
        .unwrap();

    let sum = Dispatcher::builder(DispatchTable::new().with_signature(
        ["string", "numbers"],
        Callable::new(|inv| {
            let total: f64 = inv.args[1..].iter().filter_map(Value::as_number).sum();
            Ok(Value::from(total))
        }),
    ))
    .registry(registry)
    .build();

    assert_eq!(
        sum.call(&[Value::from("sum"), Value::from(1), Value::from(2), Value::from(3)])
            .unwrap(),
        Value::from(6)
    );
    assert!(sum
        .call(&[Value::from("sum"), Value::from(1), Value::from("x")])
        .is_err());
}

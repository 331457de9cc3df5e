#![no_main]

use ferrous_inject::{
    implements, interface, Constructor, DiError, Injectable, Injector, InjectorOptions,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

pub trait Port: Send + Sync {
    fn id(&self) -> u8;
}

interface!(dyn Port);

// Leaf that never fails
struct Plain;
impl Port for Plain {
    fn id(&self) -> u8 {
        0
    }
}
impl Injectable for Plain {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Plain))]
    }
}

// Depends on the interface, so binding it to dyn Port closes a cycle
struct Looping(Arc<dyn Port>);
impl Port for Looping {
    fn id(&self) -> u8 {
        1
    }
}
impl Injectable for Looping {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Looping(args.next::<dyn Port>()?))).param::<dyn Port>().inject()]
    }
}

// Two marked constructors
struct Ambiguous;
impl Port for Ambiguous {
    fn id(&self) -> u8 {
        2
    }
}
impl Injectable for Ambiguous {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Ambiguous)).inject(), Constructor::new(|_| Ok(Ambiguous)).inject()]
    }
}

// Build function fails
struct Failing;
impl Port for Failing {
    fn id(&self) -> u8 {
        3
    }
}
impl Injectable for Failing {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Err("refused".into()))]
    }
}

implements!(Plain => dyn Port);
implements!(Looping => dyn Port);
implements!(Ambiguous => dyn Port);
implements!(Failing => dyn Port);

struct Consumer(Arc<dyn Port>);
impl Injectable for Consumer {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Consumer(args.next::<dyn Port>()?))).param::<dyn Port>().inject()]
    }
}

fn bind(injector: &Injector, choice: u8) {
    let singleton = choice & 0x10 != 0;
    match (choice % 5, singleton) {
        (0, false) => injector.bind::<dyn Port, Plain>(),
        (0, true) => injector.bind_singleton::<dyn Port, Plain>(),
        (1, false) => injector.bind::<dyn Port, Looping>(),
        (1, true) => injector.bind_singleton::<dyn Port, Looping>(),
        (2, false) => injector.bind::<dyn Port, Ambiguous>(),
        (2, true) => injector.bind_singleton::<dyn Port, Ambiguous>(),
        (3, false) => injector.bind::<dyn Port, Failing>(),
        (3, true) => injector.bind_singleton::<dyn Port, Failing>(),
        (_, false) => injector.bind::<Consumer, Consumer>(),
        (_, true) => injector.bind_singleton::<Consumer, Consumer>(),
    };
}

fuzz_target!(|data: &[u8]| {
    let Some((&depth, choices)) = data.split_first() else {
        return;
    };

    let options = InjectorOptions::default()
        .with_max_depth(usize::from(depth % 8) + 1)
        .with_require_marked_root(depth & 0x80 != 0);
    let injector = Injector::with_options(options);

    for &choice in choices.iter().take(32) {
        bind(&injector, choice);

        let report = injector.validate();
        let resolved = injector.resolve::<Consumer>();

        // Structural problems found by validation must also stop resolution
        if report.errors.iter().any(|e| matches!(e, DiError::CyclicDependency(_))) {
            assert!(resolved.is_err());
        }

        match resolved {
            // A cyclic implementation can never be built
            Ok(consumer) => assert_ne!(consumer.0.id(), 1),
            Err(DiError::ConstructionFailed { .. })
            | Err(DiError::CyclicDependency(_))
            | Err(DiError::DepthExceeded(_))
            | Err(DiError::TooManyConstructors(..))
            | Err(DiError::BindingNotFound(_))
            | Err(DiError::ConstructorNotFound(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }

        match injector.get_provider::<dyn Port>() {
            Ok(Some(provider)) => {
                let _ = provider.get();
            }
            Ok(None) => assert!(injector.binding_descriptors().iter().all(|d| !d.is_interface())),
            Err(_) => {}
        }
    }
});
